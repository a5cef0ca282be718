use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::logging::Logger;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::importer::ModuleImporter;
use crate::plugin_system::module::{LoadedModule, PluginMember};
use crate::plugin_system::registry::{InstanceId, PluginInstance, PluginRegistry};
use crate::plugin_system::traits::panic_message;
use crate::plugin_system::version::parse_plugin_version;

/// Imports plugin modules and turns their members into registered instances
pub struct PluginLoader {
    plugin_dir: PathBuf,
    suffix: String,
    importer: Box<dyn ModuleImporter>,
    /// Imported modules by identifier
    modules: HashMap<String, Arc<LoadedModule>>,
    logger: Logger,
}

impl PluginLoader {
    /// Create a loader for modules in `plugin_dir`, named with the platform's
    /// dynamic library suffix
    pub fn new(plugin_dir: impl Into<PathBuf>, importer: Box<dyn ModuleImporter>, logger: Logger) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
            suffix: std::env::consts::DLL_SUFFIX.to_string(),
            importer,
            modules: HashMap::new(),
            logger,
        }
    }

    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }

    pub fn plugin_dir(&self) -> &Path {
        &self.plugin_dir
    }

    /// Source path of the module `identifier`
    pub fn resolve(&self, identifier: &str) -> PathBuf {
        self.plugin_dir.join(format!("{}{}", identifier, self.suffix))
    }

    pub fn is_cached(&self, identifier: &str) -> bool {
        self.modules.contains_key(identifier)
    }

    /// Identifiers of all cached modules, sorted
    pub fn cached_modules(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Drops the cached copy of a module. Instances built from it keep the
    /// module alive until they are removed.
    pub fn invalidate(&mut self, identifier: &str) -> bool {
        self.modules.remove(identifier).is_some()
    }

    /// Returns the cached module or imports it
    pub fn import(&mut self, identifier: &str) -> Result<Arc<LoadedModule>, PluginSystemError> {
        if let Some(module) = self.modules.get(identifier) {
            self.logger.debug(format!("Using cached module '{}'", identifier));
            return Ok(Arc::clone(module));
        }

        let path = self.resolve(identifier);
        self.logger.debug(format!("Importing module '{}' from {}", identifier, path.display()));
        match self.importer.import(identifier, &path) {
            Ok(module) => {
                let module = Arc::new(module);
                self.modules.insert(identifier.to_string(), Arc::clone(&module));
                Ok(module)
            }
            Err(e) => {
                self.logger.error(format!("Failed to import plugin module '{}': {}", identifier, e));
                Err(e)
            }
        }
    }

    /// Imports `identifier` and registers every plugin it declares, in
    /// declaration order.
    ///
    /// Stops at the first member that fails; members registered before it
    /// stay in the registry.
    pub fn load(
        &mut self,
        identifier: &str,
        registry: &mut PluginRegistry,
    ) -> Result<Vec<InstanceId>, PluginSystemError> {
        let module = self.import(identifier)?;
        let mut loaded = Vec::with_capacity(module.members().len());
        for member in module.members() {
            let instance = self.instantiate(&module, member, registry, &[], &[])?;
            loaded.push(instance.id());
            registry.push(instance);
        }
        if loaded.is_empty() {
            self.logger
                .warning(format!("Plugin module '{}' declares no plugins", identifier));
        }
        Ok(loaded)
    }

    /// Constructs and registers every member of `module` without adding any
    /// of them to the registry.
    ///
    /// Instances listed in `replacing` are ignored by the duplicate-name
    /// check. On failure the instances prepared so far are unregistered
    /// again and the error is returned.
    pub fn prepare(
        &self,
        module: &Arc<LoadedModule>,
        registry: &mut PluginRegistry,
        replacing: &[InstanceId],
    ) -> Result<Vec<PluginInstance>, PluginSystemError> {
        let mut prepared: Vec<PluginInstance> = Vec::with_capacity(module.members().len());
        for member in module.members() {
            let taken: Vec<&str> = prepared.iter().map(|i| i.name()).collect();
            match self.instantiate(module, member, registry, replacing, &taken) {
                Ok(instance) => prepared.push(instance),
                Err(e) => {
                    self.discard(prepared);
                    return Err(e);
                }
            }
        }
        Ok(prepared)
    }

    /// Unregisters instances that never made it into the registry
    pub fn discard(&self, instances: Vec<PluginInstance>) {
        for mut instance in instances {
            if let Err(e) = instance.plugin_mut().unregister(&self.logger) {
                self.logger.warning(format!("Discarding '{}': {}", instance.name(), e));
            }
        }
    }

    fn instantiate(
        &self,
        module: &Arc<LoadedModule>,
        member: &PluginMember,
        registry: &mut PluginRegistry,
        replacing: &[InstanceId],
        taken: &[&str],
    ) -> Result<PluginInstance, PluginSystemError> {
        let mut plugin = panic::catch_unwind(AssertUnwindSafe(|| (member.construct)())).map_err(|panic_obj| {
            let error = PluginSystemError::InstantiationError {
                plugin_id: member.type_name.to_string(),
                message: format!("panic: {}", panic_message(panic_obj.as_ref())),
            };
            self.logger.error(&error);
            error
        })?;

        let name = plugin.name().to_string();
        let duplicate = taken.contains(&name.as_str())
            || registry
                .iter()
                .any(|i| i.name() == name && !replacing.contains(&i.id()));
        if duplicate {
            let error = PluginSystemError::AlreadyRegistered { plugin_id: name };
            self.logger.error(&error);
            return Err(error);
        }

        if let Err(e) = parse_plugin_version(plugin.version()) {
            self.logger
                .warning(format!("Plugin '{}' declares a non-semver version: {}", name, e));
        }

        if let Err(e) = plugin.register(registry, &self.logger) {
            self.logger.error(&e);
            return Err(e);
        }

        let id = registry.allocate_id();
        Ok(PluginInstance::new(id, plugin, Arc::clone(module)))
    }
}
