use std::path::PathBuf;

use cfn_nat_instance::{assembler, config, writer};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config_path = PathBuf::from("./config.yaml");
    let config = config::parse(&config_path)?;

    for config_entry in &config {
        let template = assembler::assemble(config_entry);
        writer::write(config_entry, &template)?;
    }

    return Ok(());
}
