use serde::{Deserialize, Serialize};
use std::{fs, io, path::PathBuf};
use validator::{Validate, ValidationError};

use crate::nat_instance::{NatInstanceOptions, NetworkNaming, DEFAULT_PUBLIC_SUBNET};
use crate::template::LogicalId;

pub const DEFAULT_INSTANCE_TYPE: &str = "t4g.nano";

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("File {0} not found")]
    FileNotFound(String),

    #[error("Parsing error: {0}")]
    ParsingError(String),

    #[error("Validation errors: {0}")]
    ValidationError(String),

    #[error("Unknown error occurred: {0}")]
    Unknown(String),
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ConfigFile {
    pub location: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ConfigEntry {
    #[validate(required, length(min = 1))]
    pub image_id: Option<String>,

    #[serde(default = "default_instance_type")]
    pub instance_type: String,

    #[validate(length(min = 1))]
    pub zones: Vec<String>,

    #[validate(custom = "validate_logical_name")]
    pub name: Option<String>,

    #[serde(default = "default_public_subnet")]
    #[validate(custom = "validate_logical_name")]
    pub public_subnet: String,

    pub description: Option<String>,

    #[validate(custom = "validate_json_file")]
    pub json: ConfigFile,

    #[validate(custom = "validate_yaml_file")]
    pub yaml: Option<ConfigFile>,
}

impl ConfigEntry {
    pub fn nat_instance_options(&self) -> NatInstanceOptions {
        return match &self.name {
            Some(name) => NatInstanceOptions { name: name.clone() },
            None => NatInstanceOptions::default(),
        };
    }

    pub fn network_naming(&self) -> NetworkNaming {
        return NetworkNaming {
            public_subnet: self.public_subnet.clone(),
        };
    }
}

fn default_instance_type() -> String {
    return String::from(DEFAULT_INSTANCE_TYPE);
}

fn default_public_subnet() -> String {
    return String::from(DEFAULT_PUBLIC_SUBNET);
}

pub type Config = Vec<ConfigEntry>;
pub fn parse(path: &PathBuf) -> Result<Config, Error> {
    let contents = match fs::read_to_string(path) {
        Ok(raw_contents) => Ok(raw_contents),
        Err(error) => match error.kind() {
            io::ErrorKind::NotFound => Err(Error::FileNotFound(path.display().to_string())),
            _ => Err(Error::Unknown(error.to_string())),
        },
    }?;

    let config: Config = match serde_yaml::from_str(&contents) {
        Ok(data) => Ok(data),
        Err(error) => Err(Error::ParsingError(error.to_string())),
    }?;

    for config_entry in &config {
        match config_entry.validate() {
            Ok(_) => (),
            Err(error) => return Err(Error::ValidationError(error.to_string())),
        }
    }

    tracing::debug!(entries = config.len(), path = %path.display(), "Parsed the config");
    return Ok(config);
}

fn validate_logical_name(name: &str) -> Result<(), ValidationError> {
    return match LogicalId::new(name) {
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::new(
            "Names have to be non-empty and alphanumeric",
        )),
    };
}

fn validate_json_file(json_file: &ConfigFile) -> Result<(), ValidationError> {
    let file_extension = match json_file.location.extension() {
        Some(extension) => extension,
        None => {
            return Err(ValidationError::new(
                "Unable to parse the extension of the JSON file location",
            ))
        }
    };
    if file_extension != "json" {
        return Err(ValidationError::new(
            "The JSON file location has to end with `.json`",
        ));
    }

    return Ok(());
}

fn validate_yaml_file(yaml_file: &ConfigFile) -> Result<(), ValidationError> {
    let file_extension = match yaml_file.location.extension() {
        Some(extension) => extension,
        None => {
            return Err(ValidationError::new(
                "Unable to parse the extension of the YAML file location",
            ))
        }
    };
    if file_extension != "yaml" && file_extension != "yml" {
        return Err(ValidationError::new(
            "The YAML file location has to end with `.yaml` or `.yml`",
        ));
    }

    return Ok(());
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;

    use super::parse;
    use super::Config;
    use super::ConfigEntry;
    use super::ConfigFile;
    use super::Error;
    use tempfile::tempdir;

    fn config_entry() -> ConfigEntry {
        return ConfigEntry {
            image_id: Some(String::from("ami-123")),
            instance_type: String::from("t3.micro"),
            zones: vec![String::from("us-east-1a")],
            name: None,
            public_subnet: String::from("Public"),
            description: None,
            json: ConfigFile {
                location: PathBuf::from("nat.json"),
            },
            yaml: None,
        };
    }

    fn parse_entry(config_entry: ConfigEntry) -> Result<Config, Error> {
        let config: Config = vec![config_entry];
        let config_contents = serde_yaml::to_string(&config).unwrap();

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("config.yaml");

        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "{}", config_contents).unwrap();

        return parse(&file_path);
    }

    #[test]
    fn file_does_not_exist() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("config.yaml");

        let result = parse(&file_path);
        assert_eq!(true, result.is_err());
        match result.err().unwrap() {
            Error::FileNotFound(_) => {}
            _ => panic!("Expected `FileNotFound` error"),
        }
    }

    #[test]
    fn file_wrong_format() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("config.yaml");

        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "Not yaml").unwrap();

        let result = parse(&file_path);
        assert_eq!(true, result.is_err());
        match result.err().unwrap() {
            Error::ParsingError(_) => {}
            _ => panic!("Expected `ParsingError` error"),
        }
    }

    #[test]
    fn file_missing_image_id() {
        let mut entry = config_entry();
        entry.image_id = None;

        let result = parse_entry(entry);
        match result.err().unwrap() {
            Error::ValidationError(_) => {}
            _ => panic!("Expected `ValidationError` error"),
        }
    }

    #[test]
    fn file_empty_image_id() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("config.yaml");

        let mut file = File::create(&file_path).unwrap();
        writeln!(
            file,
            "- image_id: \"\"\n  zones: [eu-west-1a]\n  json:\n    location: nat.json"
        )
        .unwrap();

        let result = parse(&file_path);
        match result.err().unwrap() {
            Error::ValidationError(_) => {}
            _ => panic!("Expected `ValidationError` error"),
        }
    }

    #[test]
    fn file_empty_zones() {
        let mut entry = config_entry();
        entry.zones = vec![];

        let result = parse_entry(entry);
        match result.err().unwrap() {
            Error::ValidationError(_) => {}
            _ => panic!("Expected `ValidationError` error"),
        }
    }

    #[test]
    fn file_invalid_name() {
        let mut entry = config_entry();
        entry.name = Some(String::from("nat-instance"));

        let result = parse_entry(entry);
        match result.err().unwrap() {
            Error::ValidationError(_) => {}
            _ => panic!("Expected `ValidationError` error"),
        }
    }

    #[test]
    fn file_wrong_yaml_extension() {
        let mut entry = config_entry();
        entry.yaml = Some(ConfigFile {
            location: PathBuf::from("nat.json"),
        });

        let result = parse_entry(entry);
        match result.err().unwrap() {
            Error::ValidationError(_) => {}
            _ => panic!("Expected `ValidationError` error"),
        }
    }

    #[test]
    fn parses_the_config() {
        let mut entry = config_entry();
        entry.name = Some(String::from("Custom"));
        entry.yaml = Some(ConfigFile {
            location: PathBuf::from("nat.yml"),
        });

        let config = parse_entry(entry).unwrap();
        assert_eq!(1, config.len());
        assert_eq!("Custom", config[0].nat_instance_options().name);
        assert_eq!("Public", config[0].network_naming().public_subnet);
    }

    #[test]
    fn applies_defaults() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("config.yaml");

        let mut file = File::create(&file_path).unwrap();
        writeln!(
            file,
            "- image_id: ami-123\n  zones: [eu-west-1a]\n  json:\n    location: nat.json"
        )
        .unwrap();

        let config = parse(&file_path).unwrap();
        assert_eq!("t4g.nano", config[0].instance_type);
        assert_eq!("NatInstance", config[0].nat_instance_options().name);
        assert_eq!("Public", config[0].network_naming().public_subnet);
        assert_eq!(true, config[0].yaml.is_none());
    }
}
