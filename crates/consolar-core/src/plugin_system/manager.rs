use std::path::{Path, PathBuf};

use crate::logging::Logger;
use crate::plugin_system::discovery::{PluginDescriptor, PluginDiscovery};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::importer::{DylibImporter, ModuleImporter};
use crate::plugin_system::loader::PluginLoader;
use crate::plugin_system::registry::{InstanceId, PluginInstance, PluginRegistry};

/// A module that could not be loaded during a batch load
#[derive(Debug)]
pub struct LoadFailure {
    pub module: String,
    pub error: PluginSystemError,
}

/// Outcome of [`PluginManager::load_all`]
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Names of the plugins registered by this pass, in registration order
    pub loaded: Vec<String>,
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_modules(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.module.as_str()).collect()
    }
}

/// Owns the plugin registry and drives every lifecycle transition
pub struct PluginManager {
    registry: PluginRegistry,
    loader: PluginLoader,
    discovery: PluginDiscovery,
    /// Identifiers found by the last discovery pass
    discovered: Vec<String>,
    logger: Logger,
}

impl PluginManager {
    pub fn new(plugin_dir: impl Into<PathBuf>, importer: Box<dyn ModuleImporter>, logger: &Logger) -> Self {
        let logger = logger.child("PluginManager");
        let plugin_dir = plugin_dir.into();
        Self {
            registry: PluginRegistry::new(),
            loader: PluginLoader::new(plugin_dir, importer, logger.child("Loader")),
            discovery: PluginDiscovery::new(logger.child("Discovery")),
            discovered: Vec::new(),
            logger,
        }
    }

    /// Manager for dynamic library plugins
    pub fn with_dylib_importer(plugin_dir: impl Into<PathBuf>, logger: &Logger) -> Self {
        Self::new(plugin_dir, Box::new(DylibImporter::new()), logger)
    }

    /// Use `suffix` instead of the platform library suffix for module files
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.loader = self.loader.with_suffix(suffix);
        self.discovery = self.discovery.with_suffix(suffix);
        self
    }

    pub fn plugin_dir(&self) -> &Path {
        self.loader.plugin_dir()
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn loader(&self) -> &PluginLoader {
        &self.loader
    }

    /// Identifiers found by the last call to [`discover`](Self::discover)
    pub fn discovered(&self) -> &[String] {
        &self.discovered
    }

    /// Scans the plugin directory and remembers the result, replacing the
    /// previous one
    pub fn discover(&mut self) -> &[String] {
        self.discovered = self.discovery.discover(self.loader.plugin_dir());
        &self.discovered
    }

    /// Descriptors for the modules in the plugin directory. Nothing is
    /// imported.
    pub fn describe(&self) -> Vec<PluginDescriptor> {
        self.discovery.describe(self.loader.plugin_dir())
    }

    /// Loads a single module, propagating any failure
    pub fn load(&mut self, identifier: &str) -> Result<Vec<InstanceId>, PluginSystemError> {
        self.loader.load(identifier, &mut self.registry)
    }

    /// Discovers and loads every module. Failures are recorded per module and
    /// never abort the pass.
    pub fn load_all(&mut self) -> LoadReport {
        let identifiers = self.discover().to_vec();
        self.logger.info(format!(
            "Loading {} plugin module(s) from {}",
            identifiers.len(),
            self.plugin_dir().display()
        ));

        let mut report = LoadReport::default();
        for identifier in identifiers {
            let before = self.registry.len();
            let result = self.loader.load(&identifier, &mut self.registry);

            // Members registered before a failure count as loaded.
            let added = self.registry.names()[before..]
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>();
            report.loaded.extend(added);

            if let Err(error) = result {
                self.logger
                    .error(format!("Error loading plugin module '{}': {}", identifier, error));
                report.failures.push(LoadFailure {
                    module: identifier,
                    error,
                });
            }
        }

        self.logger.info(format!(
            "Loaded {} plugin(s), {} module failure(s)",
            report.loaded_count(),
            report.failure_count()
        ));
        report
    }

    /// Unregisters and removes one instance. Unregister errors are logged
    /// and do not keep the instance registered.
    pub fn unload(&mut self, id: InstanceId) -> bool {
        let Some(mut instance) = self.registry.remove(id) else {
            self.logger.warning(format!("No plugin instance {} to unload", id));
            return false;
        };
        if let Err(e) = instance.plugin_mut().unregister(&self.logger) {
            self.logger.error(format!("Error unloading plugin '{}': {}", instance.name(), e));
        }
        self.logger.plugin_action(instance.name(), "unload", "DONE");
        true
    }

    /// Unloads the first plugin named `name`
    pub fn unload_by_name(&mut self, name: &str) -> Result<(), PluginSystemError> {
        let id = self.get_by_name(name)?.id();
        self.unload(id);
        Ok(())
    }

    /// Unloads every registered plugin, returning how many were removed
    pub fn unload_all(&mut self) -> usize {
        let ids = self.registry.ids();
        ids.into_iter().filter(|id| self.unload(*id)).count()
    }

    pub fn get_by_name(&self, name: &str) -> Result<&PluginInstance, PluginSystemError> {
        self.registry
            .get(name)
            .ok_or_else(|| PluginSystemError::NotFound {
                plugin_id: name.to_string(),
            })
    }

    pub fn get_by_name_mut(&mut self, name: &str) -> Result<&mut PluginInstance, PluginSystemError> {
        self.registry
            .get_mut(name)
            .ok_or_else(|| PluginSystemError::NotFound {
                plugin_id: name.to_string(),
            })
    }

    /// Replaces the module that provides `name` with a fresh import of it.
    ///
    /// Every plugin of that module is rebuilt. The new instances take the
    /// place of the old ones only once all of them registered; otherwise the
    /// old instances stay and the error is returned.
    pub fn reload(&mut self, name: &str) -> Result<Vec<InstanceId>, PluginSystemError> {
        let (module_id, position) = {
            let instance = self.get_by_name(name)?;
            let position = self.registry.position(instance.id()).unwrap_or(self.registry.len());
            (instance.module_identifier().to_string(), position)
        };
        self.logger.plugin_action(name, "reload", "STARTED");

        if !self.loader.invalidate(&module_id) {
            self.logger
                .debug(format!("Module '{}' was not cached, importing fresh", module_id));
        }

        let old_ids = self.registry.ids_for_module(&module_id);
        let outcome = self
            .loader
            .import(&module_id)
            .and_then(|module| self.loader.prepare(&module, &mut self.registry, &old_ids));

        let fresh = match outcome {
            Ok(fresh) => fresh,
            Err(e) => {
                self.logger.plugin_action(name, "reload", "FAILED");
                self.logger.error(format!("Reload of '{}' rolled back: {}", name, e));
                return Err(e);
            }
        };

        let first_old = old_ids
            .iter()
            .filter_map(|id| self.registry.position(*id))
            .min()
            .unwrap_or(position);
        for id in &old_ids {
            if let Some(mut old) = self.registry.remove(*id) {
                if let Err(e) = old.plugin_mut().unregister(&self.logger) {
                    self.logger
                        .error(format!("Error unloading replaced plugin '{}': {}", old.name(), e));
                }
            }
        }

        let new_ids: Vec<InstanceId> = fresh.iter().map(PluginInstance::id).collect();
        for (offset, instance) in fresh.into_iter().enumerate() {
            self.registry.insert_at(first_old + offset, instance);
        }

        self.logger.plugin_action(name, "reload", "SUCCESS");
        Ok(new_ids)
    }

    /// Plugin names in registration order
    pub fn list_names(&self) -> Vec<String> {
        self.registry.names().into_iter().map(str::to_string).collect()
    }

    pub fn enable(&mut self, name: &str) -> Result<(), PluginSystemError> {
        self.set_enabled(name, true)
    }

    pub fn disable(&mut self, name: &str) -> Result<(), PluginSystemError> {
        self.set_enabled(name, false)
    }

    fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), PluginSystemError> {
        if !self.registry.set_enabled(name, enabled) {
            return Err(PluginSystemError::NotFound {
                plugin_id: name.to_string(),
            });
        }
        let action = if enabled { "enable" } else { "disable" };
        self.logger.plugin_action(name, action, "SUCCESS");
        Ok(())
    }

    /// Runs an enabled plugin's action
    pub fn run(&mut self, name: &str, args: &[String]) -> Result<Option<String>, PluginSystemError> {
        let instance = self.get_by_name_mut(name)?;
        if !instance.is_enabled() {
            return Err(PluginSystemError::Disabled {
                plugin_id: name.to_string(),
            });
        }
        let result = instance.plugin_mut().execute(args);
        let status = if result.is_ok() { "SUCCESS" } else { "FAILED" };
        self.logger.plugin_action(name, "run", status);
        result
    }
}
