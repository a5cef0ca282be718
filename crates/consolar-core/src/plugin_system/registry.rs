use std::fmt;
use std::sync::Arc;

use crate::plugin_system::module::LoadedModule;
use crate::plugin_system::traits::Plugin;

/// Identity of one plugin instance, stable for the instance's lifetime.
///
/// Names are not unique across reloads (the replacement carries the same
/// name), so unloading goes by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A constructed plugin and the bookkeeping around it
pub struct PluginInstance {
    // Declared before `module` so the plugin is dropped while its code is
    // still mapped.
    plugin: Box<dyn Plugin>,
    id: InstanceId,
    name: String,
    version: String,
    description: Option<String>,
    dependencies: Vec<String>,
    enabled: bool,
    module: Arc<LoadedModule>,
}

impl PluginInstance {
    pub(crate) fn new(id: InstanceId, plugin: Box<dyn Plugin>, module: Arc<LoadedModule>) -> Self {
        Self {
            id,
            name: plugin.name().to_string(),
            version: plugin.version().to_string(),
            description: plugin.description().map(str::to_string),
            dependencies: plugin.dependencies(),
            enabled: true,
            plugin,
            module,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Identifier of the module the instance was constructed from
    pub fn module_identifier(&self) -> &str {
        self.module.identifier()
    }

    pub fn module(&self) -> &Arc<LoadedModule> {
        &self.module
    }

    pub fn plugin(&self) -> &(dyn Plugin + 'static) {
        self.plugin.as_ref()
    }

    pub fn plugin_mut(&mut self) -> &mut (dyn Plugin + 'static) {
        self.plugin.as_mut()
    }
}

impl fmt::Debug for PluginInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginInstance")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("version", &self.version)
            .field("enabled", &self.enabled)
            .field("module", &self.module.identifier())
            .finish()
    }
}

/// Ordered collection of registered plugin instances.
///
/// Keeps registration order. The registry itself does not reject duplicate
/// names; the loader does, and name lookups return the first match.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    instances: Vec<PluginInstance>,
    next_id: u64,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn allocate_id(&mut self) -> InstanceId {
        self.next_id += 1;
        InstanceId(self.next_id)
    }

    /// Appends an already registered plugin and returns its id
    pub fn insert(&mut self, plugin: Box<dyn Plugin>, module: Arc<LoadedModule>) -> InstanceId {
        let id = self.allocate_id();
        self.instances.push(PluginInstance::new(id, plugin, module));
        id
    }

    pub(crate) fn push(&mut self, instance: PluginInstance) {
        self.instances.push(instance);
    }

    /// Inserts at `index`, clamped to the end of the registry
    pub(crate) fn insert_at(&mut self, index: usize, instance: PluginInstance) {
        let index = index.min(self.instances.len());
        self.instances.insert(index, instance);
    }

    pub fn remove(&mut self, id: InstanceId) -> Option<PluginInstance> {
        let index = self.position(id)?;
        Some(self.instances.remove(index))
    }

    pub fn position(&self, id: InstanceId) -> Option<usize> {
        self.instances.iter().position(|i| i.id == id)
    }

    /// Names of all registered instances, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.instances.iter().map(|i| i.name.as_str()).collect()
    }

    pub fn ids(&self) -> Vec<InstanceId> {
        self.instances.iter().map(|i| i.id).collect()
    }

    /// Ids of every instance constructed from the given module
    pub fn ids_for_module(&self, module: &str) -> Vec<InstanceId> {
        self.instances
            .iter()
            .filter(|i| i.module_identifier() == module)
            .map(|i| i.id)
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.instances.iter().any(|i| i.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&PluginInstance> {
        self.instances.iter().find(|i| i.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut PluginInstance> {
        self.instances.iter_mut().find(|i| i.name == name)
    }

    pub fn get_by_id(&self, id: InstanceId) -> Option<&PluginInstance> {
        self.instances.iter().find(|i| i.id == id)
    }

    pub fn get_by_id_mut(&mut self, id: InstanceId) -> Option<&mut PluginInstance> {
        self.instances.iter_mut().find(|i| i.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PluginInstance> {
        self.instances.iter()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Sets the enabled flag of the first instance named `name`. Returns
    /// false when no such instance exists.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.get_mut(name) {
            Some(instance) => {
                instance.set_enabled(enabled);
                true
            }
            None => false,
        }
    }

    pub fn enabled_names(&self) -> Vec<&str> {
        self.instances
            .iter()
            .filter(|i| i.enabled)
            .map(|i| i.name.as_str())
            .collect()
    }
}
