use std::fs::{self};
use std::path::PathBuf;

use crate::config::ConfigEntry;
use crate::template::Template;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Unable to serialize the template: {0}")]
    Serialization(String),

    #[error("Unable to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

pub fn write(config_entry: &ConfigEntry, template: &Template) -> Result<(), Error> {
    write_json(&config_entry.json.location, template)?;
    if let Some(yaml) = &config_entry.yaml {
        write_yaml(&yaml.location, template)?;
    }

    return Ok(());
}

fn write_json(path: &PathBuf, template: &Template) -> Result<(), Error> {
    let file_contents = match serde_json::to_string_pretty(template) {
        Ok(contents) => contents,
        Err(error) => return Err(Error::Serialization(error.to_string())),
    };

    return write_file(path, file_contents);
}

fn write_yaml(path: &PathBuf, template: &Template) -> Result<(), Error> {
    // Going through a JSON value keeps `Fn::*` as plain keys instead of YAML tags.
    let value = match serde_json::to_value(template) {
        Ok(value) => value,
        Err(error) => return Err(Error::Serialization(error.to_string())),
    };
    let file_contents = match serde_yaml::to_string(&value) {
        Ok(contents) => contents,
        Err(error) => return Err(Error::Serialization(error.to_string())),
    };

    return write_file(path, file_contents);
}

fn write_file(path: &PathBuf, file_contents: String) -> Result<(), Error> {
    match fs::write(path, file_contents) {
        Ok(_) => {
            tracing::info!(path = %path.display(), "Wrote the template");
            return Ok(());
        }
        Err(source) => {
            return Err(Error::Io {
                path: path.display().to_string(),
                source,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::write;
    use super::Error;
    use crate::config::{ConfigEntry, ConfigFile};
    use crate::security_group::build_nat_security_group;
    use crate::template::Template;
    use tempfile::tempdir;

    fn config_entry(json: PathBuf, yaml: Option<PathBuf>) -> ConfigEntry {
        return ConfigEntry {
            image_id: Some(String::from("ami-123")),
            instance_type: String::from("t3.micro"),
            zones: vec![String::from("us-east-1a")],
            name: None,
            public_subnet: String::from("Public"),
            description: None,
            json: ConfigFile { location: json },
            yaml: yaml.map(|location| ConfigFile { location }),
        };
    }

    fn template() -> Template {
        let mut template = Template::new(Some(String::from("NAT")));
        template.merge(build_nat_security_group());
        return template;
    }

    #[test]
    fn writes_json() {
        let dir = tempdir().unwrap();
        let json_path = dir.path().join("nat.json");

        write(&config_entry(json_path.clone(), None), &template()).unwrap();

        let contents = fs::read_to_string(&json_path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(serde_json::to_value(template()).unwrap(), value);
    }

    #[test]
    fn writes_yaml_with_long_form_intrinsics() {
        let dir = tempdir().unwrap();
        let json_path = dir.path().join("nat.json");
        let yaml_path = dir.path().join("nat.yaml");

        write(
            &config_entry(json_path, Some(yaml_path.clone())),
            &template(),
        )
        .unwrap();

        let contents = fs::read_to_string(&yaml_path).unwrap();
        assert_eq!(false, contents.contains("!Ref"));

        let value: serde_json::Value = serde_yaml::from_str(&contents).unwrap();
        assert_eq!(
            serde_json::json!({ "Ref": "VPC" }),
            value["Resources"]["NatSecurityGroup"]["Properties"]["VpcId"]
        );
    }

    #[test]
    fn missing_directory() {
        let dir = tempdir().unwrap();
        let json_path = dir.path().join("missing").join("nat.json");

        let result = write(&config_entry(json_path, None), &template());
        match result.err().unwrap() {
            Error::Io { .. } => {}
            _ => panic!("Expected `Io` error"),
        }
    }
}
