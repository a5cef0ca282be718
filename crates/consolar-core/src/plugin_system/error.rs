//! # ConSolar Plugin System Errors
//!
//! Defines [`PluginSystemError`], the error type of every plugin operation.
//!
//! Import failures (a module that cannot be opened or evaluated) are kept
//! apart from per-plugin failures (construction, registration, missing
//! dependency, lookup) so batch loads can record them separately.
use std::path::PathBuf;

use crate::plugin_system::version::VersionError;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Failed to import plugin module '{module}': {source}")]
    ImportFailure {
        module: String,
        path: PathBuf,
        #[source]
        source: Box<PluginSystemErrorSource>,
    },

    #[error("Plugin module '{module}' was built for {found}, host provides {expected}")]
    IncompatibleModule {
        module: String,
        expected: String,
        found: String,
    },

    #[error("Plugin '{plugin_id}' could not be constructed: {message}")]
    InstantiationError {
        plugin_id: String,
        message: String,
    },

    #[error("Plugin '{plugin_id}' failed to register: {message}")]
    RegistrationError {
        plugin_id: String,
        message: String,
    },

    #[error("Plugin '{plugin_id}' requires '{dependency}', which is not registered")]
    MissingDependency {
        plugin_id: String,
        dependency: String,
    },

    #[error("Plugin '{plugin_id}' is already registered")]
    AlreadyRegistered { plugin_id: String },

    #[error("Plugin '{plugin_id}' not found")]
    NotFound { plugin_id: String },

    #[error("Plugin '{plugin_id}' is disabled")]
    Disabled { plugin_id: String },

    #[error("Plugin '{plugin_id}' failed to run: {message}")]
    ExecutionError {
        plugin_id: String,
        message: String,
    },

    #[error("Plugin '{plugin_id}' failed to unregister: {message}")]
    ShutdownError {
        plugin_id: String,
        message: String,
    },

    #[error("Version parsing error: {0}")]
    VersionParsing(#[from] VersionError),

    #[error("Internal plugin system error: {0}")]
    InternalError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemErrorSource {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Library(#[from] libloading::Error),
    #[error("{0}")]
    Other(String),
}

impl PluginSystemError {
    pub fn import(module: &str, path: PathBuf, source: impl Into<PluginSystemErrorSource>) -> Self {
        PluginSystemError::ImportFailure {
            module: module.to_string(),
            path,
            source: Box::new(source.into()),
        }
    }

    /// Name of the plugin the error is about, when it concerns a single plugin
    pub fn plugin_id(&self) -> Option<&str> {
        match self {
            PluginSystemError::InstantiationError { plugin_id, .. }
            | PluginSystemError::RegistrationError { plugin_id, .. }
            | PluginSystemError::MissingDependency { plugin_id, .. }
            | PluginSystemError::AlreadyRegistered { plugin_id }
            | PluginSystemError::NotFound { plugin_id }
            | PluginSystemError::Disabled { plugin_id }
            | PluginSystemError::ExecutionError { plugin_id, .. }
            | PluginSystemError::ShutdownError { plugin_id, .. } => Some(plugin_id),
            _ => None,
        }
    }

    /// True for failures to open or evaluate a module, as opposed to
    /// failures of an individual plugin inside an importable module
    pub fn is_import_failure(&self) -> bool {
        matches!(
            self,
            PluginSystemError::ImportFailure { .. } | PluginSystemError::IncompatibleModule { .. }
        )
    }
}

impl From<String> for PluginSystemErrorSource {
    fn from(msg: String) -> Self {
        PluginSystemErrorSource::Other(msg)
    }
}

impl From<&str> for PluginSystemErrorSource {
    fn from(msg: &str) -> Self {
        PluginSystemErrorSource::Other(msg.to_string())
    }
}
