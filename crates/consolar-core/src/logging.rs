//! # ConSolar Logging
//!
//! A named logging handle over the `log` facade. Components receive a
//! [`Logger`] at construction instead of reaching for a global instance; the
//! backend (console and file output) is installed once by the binary.
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use log::{Level, LevelFilter};

use crate::config::ConfigManager;
use crate::kernel::constants;

/// Log levels understood by the framework configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Maximum `log` level that lets messages of this level through
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Error | LogLevel::Critical => LevelFilter::Error,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            other => Err(format!("Unknown log level '{}'", other)),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

/// Named logger. The name becomes the `log` target of every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logger {
    name: String,
}

impl Logger {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Derives a logger for a sub-component, e.g. `ConSolar::PluginManager`
    pub fn child(&self, name: &str) -> Self {
        Self::new(format!("{}::{}", self.name, name))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn log(&self, level: LogLevel, message: impl fmt::Display) {
        match level {
            LogLevel::Debug => log::log!(target: self.name.as_str(), Level::Debug, "{}", message),
            LogLevel::Info => log::log!(target: self.name.as_str(), Level::Info, "{}", message),
            LogLevel::Warning => log::log!(target: self.name.as_str(), Level::Warn, "{}", message),
            LogLevel::Error => log::log!(target: self.name.as_str(), Level::Error, "{}", message),
            LogLevel::Critical => {
                log::log!(target: self.name.as_str(), Level::Error, "CRITICAL: {}", message)
            }
        }
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(LogLevel::Info, message);
    }

    pub fn warning(&self, message: impl fmt::Display) {
        self.log(LogLevel::Warning, message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(LogLevel::Error, message);
    }

    pub fn critical(&self, message: impl fmt::Display) {
        self.log(LogLevel::Critical, message);
    }

    /// Records a plugin lifecycle event, e.g. `("APlugin", "register", "SUCCESS")`
    pub fn plugin_action(&self, plugin_name: &str, action: &str, status: &str) {
        self.info(format_plugin_action(plugin_name, action, status));
    }

    /// Records something the user did at the console
    pub fn user_action(&self, action: &str, details: Option<&str>) {
        self.info(format_user_action(action, details));
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(constants::APP_NAME)
    }
}

/// Where and how verbosely the binary writes logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LogLevel,
    pub log_dir: PathBuf,
    pub log_file: String,
}

impl LogSettings {
    /// Reads the `logging` section. `debug` forces the `DEBUG` level; an
    /// unknown level falls back to `INFO`.
    pub fn from_config(config: &ConfigManager, debug: bool) -> Self {
        let level = if debug {
            LogLevel::Debug
        } else {
            config
                .get_nested_as::<String>("logging.level")
                .and_then(|level| level.parse().ok())
                .unwrap_or(LogLevel::Info)
        };
        Self {
            level,
            log_dir: PathBuf::from(config.get_nested_or(
                "logging.log_dir",
                constants::LOG_DIR_NAME.to_string(),
            )),
            log_file: config.get_nested_or("logging.log_file", constants::LOG_FILE_NAME.to_string()),
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join(&self.log_file)
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            log_dir: PathBuf::from(constants::LOG_DIR_NAME),
            log_file: constants::LOG_FILE_NAME.to_string(),
        }
    }
}

pub fn format_plugin_action(plugin_name: &str, action: &str, status: &str) -> String {
    format!("Plugin {}: {} - {}", plugin_name, action, status)
}

pub fn format_user_action(action: &str, details: Option<&str>) -> String {
    match details {
        Some(details) if !details.is_empty() => format!("User Action: {} - {}", action, details),
        _ => format!("User Action: {}", action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert_eq!(" critical ".parse::<LogLevel>().unwrap(), LogLevel::Critical);
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_critical_shares_error_filter() {
        assert_eq!(LogLevel::Critical.to_level_filter(), LevelFilter::Error);
        assert_eq!(LogLevel::Warning.to_level_filter(), LevelFilter::Warn);
    }

    #[test]
    fn test_child_logger_name() {
        let logger = Logger::new("ConSolar").child("PluginManager");
        assert_eq!(logger.name(), "ConSolar::PluginManager");
    }

    #[test]
    fn test_log_settings_from_config() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let mut config = ConfigManager::new(temp_dir.path().join("config.json"), &Logger::default())
            .expect("json is supported");
        config.set_defaults(crate::config::default_config());
        config.load().expect("defaults should load");

        let settings = LogSettings::from_config(&config, false);
        assert_eq!(settings, LogSettings::default());
        assert_eq!(settings.log_path(), PathBuf::from("logs").join("consolar.log"));

        config.set_nested("logging.level", "error").unwrap();
        assert_eq!(LogSettings::from_config(&config, false).level, LogLevel::Error);
        assert_eq!(LogSettings::from_config(&config, true).level, LogLevel::Debug);

        config.set_nested("logging.level", "LOUD").unwrap();
        assert_eq!(LogSettings::from_config(&config, false).level, LogLevel::Info);
    }

    #[test]
    fn test_action_formatting() {
        assert_eq!(
            format_plugin_action("APlugin", "register", "SUCCESS"),
            "Plugin APlugin: register - SUCCESS"
        );
        assert_eq!(format_user_action("menu", None), "User Action: menu");
        assert_eq!(
            format_user_action("menu", Some("list plugins")),
            "User Action: menu - list plugins"
        );
    }
}
