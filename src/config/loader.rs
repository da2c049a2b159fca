//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::MockConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse a TOML config file without validating it.
///
/// CLI overrides are applied after parsing, so validation runs separately.
pub fn read_config(path: &Path) -> Result<MockConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Validate a fully assembled configuration (file plus CLI overrides).
pub fn validated(config: MockConfig) -> Result<MockConfig, ConfigError> {
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_and_validate_config() {
        let dir = TempDir::new().unwrap();
        let specs = dir.path().join("api");
        fs::create_dir(&specs).unwrap();
        let path = dir.path().join("mockpath.toml");
        fs::write(
            &path,
            format!(
                "[listener]\nbind_address = \"127.0.0.1:9000\"\n\n[specs]\ndir = {:?}\n",
                specs.display().to_string()
            ),
        )
        .unwrap();

        let config = validated(read_config(&path).unwrap()).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.specs.dir, specs);
    }

    #[test]
    fn test_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mockpath.toml");
        fs::write(&path, "[specs\n").unwrap();
        assert!(matches!(read_config(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_error_message() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mockpath.toml");
        fs::write(&path, "[specs]\ndir = \"/definitely/not/here\"\npoll_interval_ms = 0\n").unwrap();

        let err = validated(read_config(&path).unwrap()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: spec directory '/definitely/not/here' not found, specs.poll_interval_ms must be > 0"
        );
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_config(Path::new("/definitely/not/here.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
