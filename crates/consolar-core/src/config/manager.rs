use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::config::error::ConfigError;
use crate::kernel::constants;
use crate::logging::Logger;

/// Separator used by the nested accessors, e.g. `plugins.plugin_dir`
pub const NESTED_SEPARATOR: char = '.';

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    fn require(path: &Path) -> Result<Self, ConfigError> {
        Self::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))
    }

    pub fn serialize(&self, data: &Map<String, Value>) -> Result<String, ConfigError> {
        let result: Result<String, Box<dyn std::error::Error + Send + Sync>> = match self {
            ConfigFormat::Json => serde_json::to_string_pretty(data).map_err(|e| e.into()),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(data).map_err(|e| e.into()),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(data).map_err(|e| e.into()),
        };
        result.map_err(|source| ConfigError::Serialization {
            format: self.extension().to_string(),
            source,
        })
    }

    pub fn deserialize(&self, content: &str, path: &Path) -> Result<Map<String, Value>, ConfigError> {
        let parsed: Result<Value, Box<dyn std::error::Error + Send + Sync>> = match self {
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.into()),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.into()),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.into()),
        };
        match parsed {
            Ok(Value::Object(map)) => Ok(map),
            // An empty YAML document parses as null.
            Ok(Value::Null) => Ok(Map::new()),
            Ok(_) => Err(ConfigError::NotATable {
                path: path.to_path_buf(),
            }),
            Err(source) => Err(ConfigError::Deserialization {
                format: self.extension().to_string(),
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// The framework's built-in configuration
pub fn default_config() -> Map<String, Value> {
    let defaults = json!({
        "framework": {
            "name": constants::APP_NAME,
            "version": constants::APP_VERSION,
            "debug": false
        },
        "logging": {
            "level": "INFO",
            "log_dir": constants::LOG_DIR_NAME,
            "log_file": constants::LOG_FILE_NAME
        },
        "plugins": {
            "plugin_dir": constants::DEFAULT_PLUGINS_DIR,
            "auto_load": true
        },
        "ui": {
            "theme": "default",
            "show_progress": true
        }
    });
    match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// File-backed key/value configuration.
///
/// Every mutating call except [`set_defaults`](Self::set_defaults) writes the
/// file back immediately.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
    format: ConfigFormat,
    data: Map<String, Value>,
    defaults: Map<String, Value>,
    logger: Logger,
}

impl ConfigManager {
    /// Create a manager for `path`. The format follows the file extension.
    pub fn new(path: impl Into<PathBuf>, logger: &Logger) -> Result<Self, ConfigError> {
        let path = path.into();
        let format = ConfigFormat::require(&path)?;
        let logger = logger.child("ConfigManager");
        logger.debug(format!("ConfigManager initialized with file: {}", path.display()));
        Ok(Self {
            path,
            format,
            data: Map::new(),
            defaults: Map::new(),
            logger,
        })
    }

    /// `config/config.json` relative to the working directory
    pub fn default_path() -> PathBuf {
        Path::new(constants::CONFIG_DIR_NAME).join(constants::CONFIG_FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ConfigFormat {
        self.format
    }

    pub fn set_defaults(&mut self, defaults: Map<String, Value>) {
        self.logger
            .debug(format!("Default configuration set with {} keys", defaults.len()));
        self.defaults = defaults;
    }

    pub fn defaults(&self) -> &Map<String, Value> {
        &self.defaults
    }

    /// Reads the file, creating it from the defaults when it does not exist.
    /// Top-level keys missing from the file are filled in from the defaults.
    pub fn load(&mut self) -> Result<&Map<String, Value>, ConfigError> {
        if self.path.exists() {
            let content = fs::read_to_string(&self.path)
                .map_err(|e| ConfigError::io(e, "read", self.path.clone()))?;
            self.data = self.format.deserialize(&content, &self.path)?;
            self.logger
                .info(format!("Configuration loaded from {}", self.path.display()));
        } else {
            self.logger.warning(format!(
                "Config file not found: {}, using defaults",
                self.path.display()
            ));
            self.data = self.defaults.clone();
            self.save()?;
        }

        for (key, value) in &self.defaults {
            if !self.data.contains_key(key) {
                self.data.insert(key.clone(), value.clone());
            }
        }
        Ok(&self.data)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.write_to(&self.path, self.format)?;
        self.logger
            .info(format!("Configuration saved to {}", self.path.display()));
        Ok(())
    }

    fn write_to(&self, path: &Path, format: ConfigFormat) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::io(e, "create_dir_all", parent.to_path_buf()))?;
        }
        let content = format.serialize(&self.data)?;
        fs::write(path, content).map_err(|e| ConfigError::io(e, "write", path.to_path_buf()))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        let value = self.data.get(key);
        self.logger.debug(format!("Config get '{}': {:?}", key, value));
        value
    }

    /// Get a top-level value converted to `T`
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Get a top-level value converted to `T`, or `default`
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get_as(key).unwrap_or(default)
    }

    /// Sets a top-level value and saves
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), ConfigError> {
        let value = to_value(value)?;
        self.logger.debug(format!("Config set '{}': {}", key, value));
        self.data.insert(key.to_string(), value);
        self.save()
    }

    /// Looks up a dotted path such as `logging.level`
    pub fn get_nested(&self, key_path: &str) -> Option<&Value> {
        let mut keys = key_path.split(NESTED_SEPARATOR);
        let first = keys.next()?;
        let value = keys.try_fold(self.data.get(first)?, |value, key| value.get(key));
        if value.is_none() {
            self.logger
                .debug(format!("Config nested key '{}' not found", key_path));
        }
        value
    }

    pub fn get_nested_as<T: DeserializeOwned>(&self, key_path: &str) -> Option<T> {
        self.get_nested(key_path)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn get_nested_or<T: DeserializeOwned>(&self, key_path: &str, default: T) -> T {
        self.get_nested_as(key_path).unwrap_or(default)
    }

    /// Sets a dotted path, replacing any non-table value along the way with
    /// an empty table, and saves
    pub fn set_nested<T: Serialize>(&mut self, key_path: &str, value: T) -> Result<(), ConfigError> {
        let keys: Vec<&str> = key_path.split(NESTED_SEPARATOR).collect();
        if keys.iter().any(|k| k.is_empty()) {
            return Err(ConfigError::InvalidKey(key_path.to_string()));
        }
        let value = to_value(value)?;
        self.logger
            .debug(format!("Config set nested '{}': {}", key_path, value));

        let (last, parents) = match keys.split_last() {
            Some(split) => split,
            None => return Err(ConfigError::InvalidKey(key_path.to_string())),
        };
        let mut table = &mut self.data;
        for key in parents {
            let entry = table
                .entry(key.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            table = match entry {
                Value::Object(map) => map,
                _ => return Err(ConfigError::InvalidKey(key_path.to_string())),
            };
        }
        table.insert(last.to_string(), value);
        self.save()
    }

    /// Shallow merge of `values` into the top level, then save
    pub fn update(&mut self, values: Map<String, Value>) -> Result<(), ConfigError> {
        self.logger.info(format!(
            "Configuration updated with {} new values",
            values.len()
        ));
        self.data.extend(values);
        self.save()
    }

    pub fn reset_to_defaults(&mut self) -> Result<(), ConfigError> {
        self.data = self.defaults.clone();
        self.logger.info("Configuration reset to defaults");
        self.save()
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Removes a top-level key. Saves only when something was removed.
    pub fn remove_key(&mut self, key: &str) -> Result<bool, ConfigError> {
        if self.data.remove(key).is_none() {
            return Ok(false);
        }
        self.logger.debug(format!("Config key '{}' removed", key));
        self.save()?;
        Ok(true)
    }

    pub fn get_all(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Writes the current configuration to another file, in that file's format
    pub fn export_to(&self, path: &Path) -> Result<(), ConfigError> {
        let format = ConfigFormat::require(path)?;
        self.write_to(path, format)?;
        self.logger
            .info(format!("Configuration exported to {}", path.display()));
        Ok(())
    }

    /// Reads another configuration file and either merges it into the
    /// current one (top level) or replaces it, then saves
    pub fn import_from(&mut self, path: &Path, merge: bool) -> Result<(), ConfigError> {
        let format = ConfigFormat::require(path)?;
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::io(e, "read", path.to_path_buf()))?;
        let imported = format.deserialize(&content, path)?;
        if merge {
            self.data.extend(imported);
            self.logger
                .info(format!("Configuration merged from {}", path.display()));
        } else {
            self.data = imported;
            self.logger
                .info(format!("Configuration replaced from {}", path.display()));
        }
        self.save()
    }
}

fn to_value<T: Serialize>(value: T) -> Result<Value, ConfigError> {
    serde_json::to_value(value).map_err(|e| ConfigError::Serialization {
        format: "json".to_string(),
        source: Box::new(e),
    })
}
