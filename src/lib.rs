#![cfg_attr(test, recursion_limit = "256")]

pub mod assembler;
pub mod config;
pub mod nat_instance;
pub mod security_group;
pub mod template;
pub mod writer;
