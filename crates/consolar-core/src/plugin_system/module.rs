//! Plugin modules and the explicit registration entry point.
//!
//! A plugin module (a dynamic library in the plugin directory, or a
//! statically linked table entry) exposes a single [`PluginDeclaration`].
//! Importing the module runs the declaration's `register` function, which
//! lists the module's plugin types on a [`ModuleRegistrar`]. The loader then
//! constructs each listed type with no arguments.
use std::fmt;
use std::path::{Path, PathBuf};

use libloading::Library;

use crate::plugin_system::traits::{Plugin, short_type_name};

/// Zero-argument constructor for one plugin type
pub type PluginFactory = fn() -> Box<dyn Plugin>;

/// Signature of a module's registration entry point
pub type ModuleEntry = fn(&mut ModuleRegistrar);

/// Hands the host's `log` backend to a dynamic module
pub type LoggerInstaller = fn(&'static dyn log::Log, log::LevelFilter);

/// Installs `logger` as this copy of the `log` facade's backend.
///
/// A dynamic plugin module links its own copy of `log`, whose records go
/// nowhere until the host shares its backend through this function.
/// [`export_plugin!`](crate::export_plugin) points the declaration at it.
pub fn install_host_logger(logger: &'static dyn log::Log, level: log::LevelFilter) {
    // Fails only when this copy already has a backend.
    let _ = log::set_logger(logger);
    log::set_max_level(level);
}

/// The symbol every dynamic plugin module exports, usually through
/// [`export_plugin!`](crate::export_plugin).
#[repr(C)]
#[derive(Clone, Copy)]
pub struct PluginDeclaration {
    /// Plugin API version the module was built against
    pub api_version: &'static str,
    /// Version of `consolar-core` the module was built against
    pub core_version: &'static str,
    /// Lists the module's plugin types
    pub register: ModuleEntry,
    /// Called by the host before `register`
    pub install_logger: LoggerInstaller,
}

/// One plugin type declared by a module
#[derive(Clone, Copy)]
pub struct PluginMember {
    /// Type name, used to identify the member before it is constructed
    pub type_name: &'static str,
    pub construct: PluginFactory,
}

impl fmt::Debug for PluginMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginMember")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Collects the plugin types a module declares
#[derive(Debug, Default)]
pub struct ModuleRegistrar {
    members: Vec<PluginMember>,
}

fn construct_default<T: Plugin + Default>() -> Box<dyn Plugin> {
    Box::new(T::default())
}

impl ModuleRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a plugin type built through its `Default` impl
    pub fn add<T: Plugin + Default>(&mut self) -> &mut Self {
        self.members.push(PluginMember {
            type_name: short_type_name(std::any::type_name::<T>()),
            construct: construct_default::<T>,
        });
        self
    }

    /// Declares a plugin built by an explicit zero-argument factory
    pub fn add_factory(&mut self, type_name: &'static str, construct: PluginFactory) -> &mut Self {
        self.members.push(PluginMember {
            type_name,
            construct,
        });
        self
    }

    pub fn members(&self) -> &[PluginMember] {
        &self.members
    }

    pub fn into_members(self) -> Vec<PluginMember> {
        self.members
    }
}

/// An imported plugin module.
///
/// Instances built from a module hold an `Arc` to it, so a dynamic library
/// stays mapped until the last plugin created from it has been dropped.
pub struct LoadedModule {
    identifier: String,
    path: PathBuf,
    members: Vec<PluginMember>,
    // Must stay the last field: members and their names point into it.
    library: Option<Library>,
}

impl LoadedModule {
    pub fn new(identifier: &str, path: &Path, members: Vec<PluginMember>) -> Self {
        Self {
            identifier: identifier.to_string(),
            path: path.to_path_buf(),
            members,
            library: None,
        }
    }

    pub(crate) fn with_library(mut self, library: Library) -> Self {
        self.library = Some(library);
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn members(&self) -> &[PluginMember] {
        &self.members
    }

    pub fn is_dynamic(&self) -> bool {
        self.library.is_some()
    }
}

impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModule")
            .field("identifier", &self.identifier)
            .field("path", &self.path)
            .field("members", &self.members)
            .field("dynamic", &self.is_dynamic())
            .finish()
    }
}

/// Exports the plugin declaration of a dynamic plugin module.
///
/// ```ignore
/// consolar_core::export_plugin!(ExamplePlugin, OtherPlugin);
/// ```
#[macro_export]
macro_rules! export_plugin {
    ($($plugin:ty),+ $(,)?) => {
        #[doc(hidden)]
        #[unsafe(no_mangle)]
        pub static CONSOLAR_PLUGIN_MODULE: $crate::plugin_system::PluginDeclaration =
            $crate::plugin_system::PluginDeclaration {
                api_version: $crate::kernel::constants::API_VERSION,
                core_version: $crate::kernel::constants::CORE_VERSION,
                register: {
                    fn __consolar_register(registrar: &mut $crate::plugin_system::ModuleRegistrar) {
                        $( registrar.add::<$plugin>(); )+
                    }
                    __consolar_register
                },
                install_logger: $crate::plugin_system::install_host_logger,
            };
    };
}
