//! # ConSolar Core
//!
//! Building blocks for console applications: a plugin loader with a tracked
//! lifecycle, file-backed configuration, named logging, interactive prompts
//! and input validation. The `consolar` binary wires these together through
//! [`Application`].
pub mod config;
pub mod kernel;
pub mod logging;
pub mod plugin_system;
pub mod prompt;
pub mod utils;

// Re-export key public types for the binary and for plugin crates
pub use config::{ConfigError, ConfigManager, EnvConfig};
pub use kernel::{AppOptions, Application, Error, Result};
pub use logging::{LogLevel, LogSettings, Logger};
pub use plugin_system::{
    LoadReport, ModuleRegistrar, Plugin, PluginDeclaration, PluginError, PluginManager,
    PluginRegistry, PluginSystemError,
};
pub use prompt::UserPrompt;

#[cfg(test)]
mod tests;
