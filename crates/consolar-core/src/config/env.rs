use std::env;

use crate::logging::Logger;

/// Typed access to environment variables
#[derive(Debug, Clone)]
pub struct EnvConfig {
    logger: Logger,
}

impl EnvConfig {
    pub fn new(logger: &Logger) -> Self {
        Self {
            logger: logger.child("EnvConfig"),
        }
    }

    /// The variable's value, if set and valid unicode
    pub fn get(&self, key: &str) -> Option<String> {
        let value = env::var(key).ok();
        self.logger
            .debug(format!("Environment variable '{}': {:?}", key, value));
        value
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// `true`, `1`, `yes` and `on` (any case) are true; anything else set is
    /// false. Unset returns `default`.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(value) => matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "true" | "1" | "yes" | "on"
            ),
            None => default,
        }
    }

    /// Parses the variable as an integer, warning and returning `default`
    /// when it is set but not a number
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.get(key) {
            Some(value) => value.trim().parse().unwrap_or_else(|_| {
                self.logger.warning(format!(
                    "Invalid integer value for env var '{}', using default: {}",
                    key, default
                ));
                default
            }),
            None => default,
        }
    }

    /// Splits the variable on `separator`, trimming each item. Unset or empty
    /// returns `default`.
    pub fn get_list(&self, key: &str, separator: &str, default: Vec<String>) -> Vec<String> {
        match self.get(key) {
            Some(value) if !value.is_empty() => value
                .split(separator)
                .map(|item| item.trim().to_string())
                .collect(),
            _ => default,
        }
    }
}
