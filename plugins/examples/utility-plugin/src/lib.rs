//! Utility plugin for ConSolar: hashing, timestamps and uptime.
use std::time::{Duration, Instant};

use consolar_core::{Logger, Plugin, PluginError, PluginRegistry};
use sha2::{Digest, Sha256, Sha512};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Md5,
    Sha256,
    Sha512,
}

impl std::str::FromStr for HashAlgorithm {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha512" => Ok(HashAlgorithm::Sha512),
            other => Err(PluginError::ExecutionError(format!(
                "Unsupported hash algorithm '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug)]
pub struct UtilityPlugin {
    logger: Logger,
    started: Instant,
}

impl Default for UtilityPlugin {
    fn default() -> Self {
        Self {
            logger: Logger::new("Plugin-UtilityPlugin"),
            started: Instant::now(),
        }
    }
}

impl UtilityPlugin {
    /// Lowercase hex digest of `text`
    pub fn hash_text(&self, text: &str, algorithm: HashAlgorithm) -> String {
        match algorithm {
            HashAlgorithm::Md5 => format!("{:x}", md5::compute(text.as_bytes())),
            HashAlgorithm::Sha256 => hex::encode(Sha256::digest(text.as_bytes())),
            HashAlgorithm::Sha512 => hex::encode(Sha512::digest(text.as_bytes())),
        }
    }

    /// Local time formatted as `YYYY-MM-DD HH:MM:SS`
    pub fn timestamp(&self) -> String {
        chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
    }

    /// Time since the plugin was constructed
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Plugin for UtilityPlugin {
    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> Option<&str> {
        Some("Provides common utility functions")
    }

    fn on_register(&mut self, _registry: &PluginRegistry) -> Result<(), PluginError> {
        self.logger.info("Utility plugin loaded with useful tools!");
        Ok(())
    }

    fn on_unregister(&mut self) -> Result<(), PluginError> {
        self.logger.info(format!(
            "Utility plugin ran for {:.2} seconds",
            self.uptime().as_secs_f64()
        ));
        Ok(())
    }

    /// `hash <text> [md5|sha256|sha512]`, `timestamp` or `uptime`
    fn run(&mut self, args: &[String]) -> Result<Option<String>, PluginError> {
        match args {
            [command, text, rest @ ..] if command == "hash" => {
                let algorithm = match rest.first() {
                    Some(name) => name.parse()?,
                    None => HashAlgorithm::Sha256,
                };
                Ok(Some(self.hash_text(text, algorithm)))
            }
            [command] if command == "timestamp" => Ok(Some(self.timestamp())),
            [command] if command == "uptime" => {
                Ok(Some(format!("{:.2}s", self.uptime().as_secs_f64())))
            }
            _ => Err(PluginError::ExecutionError(
                "usage: hash <text> [md5|sha256|sha512] | timestamp | uptime".to_string(),
            )),
        }
    }
}

consolar_core::export_plugin!(UtilityPlugin);
