//! # ConSolar Kernel Errors
//!
//! Defines the top-level error type surfaced at the process boundary.
//!
//! Every subsystem error converts into [`Error`], and every [`Error`] carries a
//! numeric classification through [`Error::exit_code`] so the binary can map a
//! failure straight onto a process exit status.
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::error::ConfigError;
use crate::plugin_system::error::PluginSystemError;

/// Exit code for errors without a more specific classification
pub const EXIT_GENERAL: i32 = 1;
/// Exit code for plugin system failures
pub const EXIT_PLUGIN: i32 = 2;
/// Exit code for configuration failures
pub const EXIT_CONFIG: i32 = 3;
/// Exit code for input validation failures
pub const EXIT_VALIDATION: i32 = 4;

/// Framework error
#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed plugin system error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Configuration load/save/lookup error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// User input did not pass validation
    #[error("Validation error for '{field}' ({value}): {message}")]
    Validation {
        field: String,
        value: String,
        message: String,
    },

    /// The terminal prompt failed
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// The user cancelled the operation (Ctrl+C at a prompt)
    #[error("Operation cancelled by user")]
    Interrupted,

    #[error("I/O error during operation '{operation}' on path '{}': {source}", path.display())]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
        operation: String,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl Error {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        Error::Io {
            source,
            operation: operation.into(),
            path,
        }
    }

    pub fn validation(field: &str, value: impl ToString, message: &str) -> Self {
        Error::Validation {
            field: field.to_string(),
            value: value.to_string(),
            message: message.to_string(),
        }
    }

    /// Process exit code for this error. Cancellation is a clean exit.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::PluginSystem(_) => EXIT_PLUGIN,
            Error::Config(_) => EXIT_CONFIG,
            Error::Validation { .. } => EXIT_VALIDATION,
            Error::Interrupted => 0,
            Error::Prompt(_) | Error::Io { .. } | Error::Other(_) => EXIT_GENERAL,
        }
    }

    /// True when the error represents a user cancellation rather than a failure
    pub fn is_interrupt(&self) -> bool {
        matches!(self, Error::Interrupted)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            dialoguer::Error::IO(io_err) if io_err.kind() == std::io::ErrorKind::Interrupted => {
                Error::Interrupted
            }
            other => Error::Prompt(other.to_string()),
        }
    }
}
