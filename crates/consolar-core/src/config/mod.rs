//! # ConSolar Configuration
//!
//! File-backed application configuration ([`ConfigManager`]) and typed
//! environment variable access ([`EnvConfig`]).
//!
//! Configuration files are JSON by default; YAML and TOML files are
//! supported behind the `yaml-config` and `toml-config` features. The format
//! is chosen from the file extension.
pub mod env;
pub mod error;
pub mod manager;

pub use env::EnvConfig;
pub use error::ConfigError;
pub use manager::{ConfigFormat, ConfigManager, default_config};
