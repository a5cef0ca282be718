//! Plugin module discovery.
//!
//! Discovery only looks at file names in a single, non-recursive directory.
//! It never opens or evaluates a module; that is the loader's job.
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::kernel::constants;
use crate::logging::Logger;

/// Listing entry for a discovered module, built without importing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDescriptor {
    pub identifier: String,
    pub path: PathBuf,
    pub version: String,
    pub description: String,
}

/// Optional `<identifier>.json` next to a module file
#[derive(Debug, Default, Deserialize)]
struct SidecarMetadata {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PluginDiscovery {
    suffix: String,
    reserved_prefix: String,
    logger: Logger,
}

impl PluginDiscovery {
    /// Discovery for the platform's dynamic library suffix
    pub fn new(logger: Logger) -> Self {
        Self {
            suffix: std::env::consts::DLL_SUFFIX.to_string(),
            reserved_prefix: constants::RESERVED_PREFIX.to_string(),
            logger,
        }
    }

    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }

    pub fn with_reserved_prefix(mut self, prefix: &str) -> Self {
        self.reserved_prefix = prefix.to_string();
        self
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Maps a file name to a module identifier, or `None` when the file is
    /// not a loadable module.
    pub fn identifier_for(&self, file_name: &str) -> Option<String> {
        let stem = file_name.strip_suffix(self.suffix.as_str())?;
        if stem.is_empty() || stem.starts_with(self.reserved_prefix.as_str()) {
            return None;
        }
        Some(stem.to_string())
    }

    /// Path of the module file for `identifier` inside `dir`
    pub fn module_path(&self, dir: &Path, identifier: &str) -> PathBuf {
        dir.join(format!("{}{}", identifier, self.suffix))
    }

    /// Lists module identifiers in `dir`, sorted.
    ///
    /// A missing or unreadable directory is logged and treated as empty.
    pub fn discover(&self, dir: &Path) -> Vec<String> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                self.logger.warning(format!(
                    "Plugin directory {} could not be read: {}",
                    dir.display(),
                    e
                ));
                return Vec::new();
            }
        };

        let mut identifiers: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| !t.is_dir()).unwrap_or(false))
            .filter_map(|entry| {
                let file_name = entry.file_name();
                self.identifier_for(&file_name.to_string_lossy())
            })
            .collect();
        identifiers.sort();

        self.logger.debug(format!(
            "Discovered {} plugin module(s) in {}",
            identifiers.len(),
            dir.display()
        ));
        identifiers
    }

    /// Describes every discovered module without importing any of them
    pub fn describe(&self, dir: &Path) -> Vec<PluginDescriptor> {
        self.discover(dir)
            .into_iter()
            .map(|identifier| self.describe_one(dir, identifier))
            .collect()
    }

    fn describe_one(&self, dir: &Path, identifier: String) -> PluginDescriptor {
        let sidecar = dir.join(format!("{}.json", identifier));
        let metadata = if sidecar.is_file() {
            match fs::read_to_string(&sidecar)
                .map_err(|e| e.to_string())
                .and_then(|raw| serde_json::from_str::<SidecarMetadata>(&raw).map_err(|e| e.to_string()))
            {
                Ok(metadata) => metadata,
                Err(e) => {
                    self.logger.warning(format!(
                        "Ignoring unreadable metadata {}: {}",
                        sidecar.display(),
                        e
                    ));
                    SidecarMetadata::default()
                }
            }
        } else {
            SidecarMetadata::default()
        };

        PluginDescriptor {
            path: self.module_path(dir, &identifier),
            identifier,
            version: metadata
                .version
                .unwrap_or_else(|| constants::UNKNOWN_VERSION.to_string()),
            description: metadata.description.unwrap_or_default(),
        }
    }
}
