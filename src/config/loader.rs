//! Configuration loading from disk.

use std::path::Path;
use std::fs;
use thiserror::Error;
use crate::config::schema::CheckerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse configuration from TOML text without validating it.
pub fn parse_config(content: &str) -> Result<CheckerConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Read configuration from a TOML file without validating it, so that
/// overrides can still be applied before the single validation pass.
pub fn read_config(path: &Path) -> Result<CheckerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<CheckerConfig, ConfigError> {
    let config = read_config(path)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_config_defers_validation() {
        let path = std::env::temp_dir().join(format!("ping-checker-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "[engine]\nmax_fails_count = 0\n").unwrap();

        let config = read_config(&path).unwrap();
        assert_eq!(config.engine.max_fails_count, 0);
        assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));

        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_load_config_from_file() {
        let path = std::env::temp_dir().join(format!("ping-checker-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "[engine]\nmax_fails_count = 4\nworker_pool_size = 2\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.engine.max_fails_count, 4);
        assert_eq!(config.engine.worker_pool_size, 2);

        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let path = std::env::temp_dir().join(format!("ping-checker-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "[engine]\nmax_fails_count = 0\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("max_fails_count"));

        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(parse_config("[engine\n"), Err(ConfigError::Parse(_))));
    }
}
