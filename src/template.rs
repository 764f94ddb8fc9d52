//! The slice of the CloudFormation template format the NAT builders emit.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::nat_instance::{InstanceProfileProperties, InstanceProperties, RoleProperties};
use crate::security_group::SecurityGroupProperties;

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("Logical ID cannot be empty")]
    EmptyLogicalId,

    #[error("Logical ID `{0}` has to be alphanumeric")]
    NonAlphanumericLogicalId(String),
}

/// Intrinsic functions, left unresolved for the deployment tool.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Intrinsic {
    Ref(String),

    #[serde(rename = "Fn::Sub")]
    Sub(String),

    /// Index and list, e.g. `{"Fn::Select": ["0", ["eu-west-1a"]]}`.
    #[serde(rename = "Fn::Select")]
    Select(String, Vec<String>),

    #[serde(rename = "Fn::Base64")]
    Base64(Box<Intrinsic>),
}

impl Intrinsic {
    pub fn reference(logical_id: impl fmt::Display) -> Self {
        return Intrinsic::Ref(logical_id.to_string());
    }

    pub fn sub(template: impl Into<String>) -> Self {
        return Intrinsic::Sub(template.into());
    }

    pub fn select(index: usize, values: &[String]) -> Self {
        return Intrinsic::Select(index.to_string(), values.to_vec());
    }

    pub fn base64(value: Intrinsic) -> Self {
        return Intrinsic::Base64(Box::new(value));
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    #[serde(rename = "AWS::EC2::SecurityGroup")]
    SecurityGroup,

    #[serde(rename = "AWS::EC2::Instance")]
    Instance,

    #[serde(rename = "AWS::IAM::Role")]
    Role,

    #[serde(rename = "AWS::IAM::InstanceProfile")]
    InstanceProfile,
}

/// CloudFormation logical IDs are non-empty and alphanumeric.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    pub fn new(id: impl Into<String>) -> Result<Self, Error> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::EmptyLogicalId);
        }
        if !id.chars().all(|character| character.is_ascii_alphanumeric()) {
            return Err(Error::NonAlphanumericLogicalId(id));
        }

        return Ok(Self(id));
    }

    /// IDs fixed in the source, such as `NatSecurityGroup`.
    pub(crate) fn from_static(id: &'static str) -> Self {
        debug_assert!(Self::new(id).is_ok(), "invalid logical ID `{}`", id);
        Self(String::from(id))
    }

    /// Derives a sibling ID, e.g. `NatInstance` -> `NatInstanceRole`.
    pub fn with_suffix(&self, suffix: &str) -> Result<Self, Error> {
        return Self::new(format!("{}{}", self.0, suffix));
    }

    pub fn as_str(&self) -> &str {
        return &self.0;
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for LogicalId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: Intrinsic,
}

impl Tag {
    pub fn name(value: Intrinsic) -> Self {
        return Self {
            key: String::from("Name"),
            value,
        };
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Properties {
    SecurityGroup(SecurityGroupProperties),
    Instance(InstanceProperties),
    Role(RoleProperties),
    InstanceProfile(InstanceProfileProperties),
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: ResourceType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,

    pub properties: Properties,
}

/// Template fragment keyed by logical ID.
pub type Resources = BTreeMap<LogicalId, Resource>;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub resources: Resources,
}

impl Template {
    pub fn new(description: Option<String>) -> Self {
        return Self {
            format_version: String::from(TEMPLATE_FORMAT_VERSION),
            description,
            resources: Resources::new(),
        };
    }

    /// Adds every resource of `fragment`, replacing entries with the same logical ID.
    pub fn merge(&mut self, fragment: Resources) {
        for (logical_id, resource) in fragment {
            if self.resources.contains_key(&logical_id) {
                tracing::warn!(%logical_id, "Replacing resource already present in the template");
            }
            self.resources.insert(logical_id, resource);
        }
    }
}
