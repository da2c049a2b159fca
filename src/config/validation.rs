//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the spec directory exists before anything starts
//! - Validate value ranges (poll interval > 0, body limit > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure apart from the spec directory check

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::config::schema::MockConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    SpecDirNotFound(PathBuf),
    InvalidBindAddress(String),
    InvalidMetricsAddress(String),
    ZeroPollInterval,
    ZeroBodyLimit,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::SpecDirNotFound(dir) => {
                write!(f, "spec directory '{}' not found", dir.display())
            }
            ValidationError::InvalidBindAddress(addr) => write!(f, "invalid bind address '{}'", addr),
            ValidationError::InvalidMetricsAddress(addr) => {
                write!(f, "invalid metrics address '{}'", addr)
            }
            ValidationError::ZeroPollInterval => write!(f, "specs.poll_interval_ms must be > 0"),
            ValidationError::ZeroBodyLimit => write!(f, "limits.max_body_bytes must be > 0"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a configuration, collecting every problem.
pub fn validate_config(config: &MockConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !config.specs.dir.is_dir() {
        errors.push(ValidationError::SpecDirNotFound(config.specs.dir.clone()));
    }
    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.listener.bind_address.clone()));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }
    if config.specs.poll_interval_ms == 0 {
        errors.push(ValidationError::ZeroPollInterval);
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
