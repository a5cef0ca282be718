//! # ConSolar Configuration Errors
//!
//! Defines [`ConfigError`], returned by every fallible [`ConfigManager`]
//! operation.
//!
//! [`ConfigManager`]: crate::config::ConfigManager
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error during operation '{operation}' on path '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization to '{format}' failed: {source}")]
    Serialization {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Invalid {format} in '{}': {source}", path.display())]
    Deserialization {
        format: String,
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("Configuration in '{}' is not a key/value table", path.display())]
    NotATable { path: PathBuf },

    #[error("Invalid configuration key '{0}'")]
    InvalidKey(String),
}

impl ConfigError {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        ConfigError::Io {
            source,
            operation: operation.into(),
            path,
        }
    }
}
