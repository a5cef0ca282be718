//! Module importers.
//!
//! An importer turns a module identifier plus its source path into a freshly
//! evaluated [`LoadedModule`]. Caching is not the importer's concern: the
//! loader keeps the module cache and asks for a fresh import on a miss or
//! after invalidation.
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use libloading::Library;
use tempfile::TempDir;

use crate::kernel::constants;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::module::{LoadedModule, ModuleEntry, ModuleRegistrar, PluginDeclaration};
use crate::plugin_system::traits::panic_message;
use crate::plugin_system::version::ApiVersion;

/// Produces fresh module imports
pub trait ModuleImporter {
    /// Imports the module `identifier` from `path`, bypassing any cache.
    fn import(&mut self, identifier: &str, path: &Path) -> Result<LoadedModule, PluginSystemError>;
}

fn ensure_source_exists(identifier: &str, path: &Path) -> Result<(), PluginSystemError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PluginSystemError::import(
            identifier,
            path.to_path_buf(),
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no module file at {}", path.display()),
            ),
        ))
    }
}

/// Runs a module's entry point and collects its members
fn evaluate(identifier: &str, path: &Path, entry: ModuleEntry) -> Result<ModuleRegistrar, PluginSystemError> {
    let mut registrar = ModuleRegistrar::new();
    panic::catch_unwind(AssertUnwindSafe(|| entry(&mut registrar))).map_err(|panic_obj| {
        PluginSystemError::import(
            identifier,
            path.to_path_buf(),
            format!("panic while evaluating module: {}", panic_message(panic_obj.as_ref())),
        )
    })?;
    Ok(registrar)
}

/// Imports plugin modules compiled as dynamic libraries.
///
/// Each import opens a private copy of the library file, so reloading a
/// module whose file was rebuilt in place maps the new code instead of the
/// handle the platform loader already holds for the old path.
pub struct DylibImporter {
    shadow_dir: Option<TempDir>,
    generation: u64,
    host_api: ApiVersion,
}

impl DylibImporter {
    pub fn new() -> Self {
        Self {
            shadow_dir: None,
            generation: 0,
            // The constant is a valid three-part version.
            host_api: constants::API_VERSION.parse().unwrap_or_else(|_| ApiVersion::new(0, 1, 0)),
        }
    }

    fn shadow_copy(&mut self, identifier: &str, path: &Path) -> Result<PathBuf, PluginSystemError> {
        if self.shadow_dir.is_none() {
            let dir = tempfile::Builder::new()
                .prefix("consolar-plugins-")
                .tempdir()
                .map_err(|e| PluginSystemError::import(identifier, path.to_path_buf(), e))?;
            self.shadow_dir = Some(dir);
        }
        let dir = match &self.shadow_dir {
            Some(dir) => dir.path(),
            None => {
                return Err(PluginSystemError::InternalError(
                    "shadow directory missing after creation".to_string(),
                ));
            }
        };

        self.generation += 1;
        let target = dir.join(format!(
            "{}-{}{}",
            identifier,
            self.generation,
            std::env::consts::DLL_SUFFIX
        ));
        fs::copy(path, &target).map_err(|e| PluginSystemError::import(identifier, path.to_path_buf(), e))?;
        Ok(target)
    }

    fn check_compatibility(
        &self,
        identifier: &str,
        declaration: &PluginDeclaration,
    ) -> Result<(), PluginSystemError> {
        // Rust has no stable ABI: trait objects only cross the boundary
        // safely when both sides were built from the same core release.
        if declaration.core_version != constants::CORE_VERSION {
            return Err(PluginSystemError::IncompatibleModule {
                module: identifier.to_string(),
                expected: format!("core {}", constants::CORE_VERSION),
                found: format!("core {}", declaration.core_version),
            });
        }
        let module_api: ApiVersion = declaration.api_version.parse()?;
        if !self.host_api.is_compatible_with(&module_api) {
            return Err(PluginSystemError::IncompatibleModule {
                module: identifier.to_string(),
                expected: format!("API {}", self.host_api),
                found: format!("API {}", module_api),
            });
        }
        Ok(())
    }
}

impl Default for DylibImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleImporter for DylibImporter {
    fn import(&mut self, identifier: &str, path: &Path) -> Result<LoadedModule, PluginSystemError> {
        ensure_source_exists(identifier, path)?;
        let shadow = self.shadow_copy(identifier, path)?;

        let library = unsafe { Library::new(&shadow) }
            .map_err(|e| PluginSystemError::import(identifier, path.to_path_buf(), e))?;

        let declaration: PluginDeclaration = unsafe {
            library
                .get::<*const PluginDeclaration>(constants::PLUGIN_DECLARATION_SYMBOL.as_bytes())
                .map_err(|e| PluginSystemError::import(identifier, path.to_path_buf(), e))?
                .read()
        };

        self.check_compatibility(identifier, &declaration)?;
        (declaration.install_logger)(log::logger(), log::max_level());
        let registrar = evaluate(identifier, path, declaration.register)?;
        Ok(LoadedModule::new(identifier, path, registrar.into_members()).with_library(library))
    }
}

#[derive(Clone)]
enum StaticModule {
    Entry(ModuleEntry),
    Broken(String),
}

/// Imports modules linked into the host binary.
///
/// Identifiers map to registration entry points in a table. A module still
/// needs its file in the plugin directory, which keeps discovery and
/// "module no longer present" behavior identical to dynamic modules.
/// Clones share the table, so a definition can be swapped before a reload.
#[derive(Clone, Default)]
pub struct StaticImporter {
    modules: Rc<RefCell<HashMap<String, StaticModule>>>,
}

impl StaticImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines (or redefines) the module `identifier`
    pub fn define(&self, identifier: &str, entry: ModuleEntry) -> &Self {
        self.modules
            .borrow_mut()
            .insert(identifier.to_string(), StaticModule::Entry(entry));
        self
    }

    /// Makes every import of `identifier` fail with `message`
    pub fn define_broken(&self, identifier: &str, message: &str) -> &Self {
        self.modules
            .borrow_mut()
            .insert(identifier.to_string(), StaticModule::Broken(message.to_string()));
        self
    }

    pub fn undefine(&self, identifier: &str) -> bool {
        self.modules.borrow_mut().remove(identifier).is_some()
    }

    pub fn is_defined(&self, identifier: &str) -> bool {
        self.modules.borrow().contains_key(identifier)
    }
}

impl ModuleImporter for StaticImporter {
    fn import(&mut self, identifier: &str, path: &Path) -> Result<LoadedModule, PluginSystemError> {
        ensure_source_exists(identifier, path)?;
        let definition = self.modules.borrow().get(identifier).cloned();
        let entry = match definition {
            Some(StaticModule::Entry(entry)) => entry,
            Some(StaticModule::Broken(message)) => {
                return Err(PluginSystemError::import(identifier, path.to_path_buf(), message));
            }
            None => {
                return Err(PluginSystemError::import(
                    identifier,
                    path.to_path_buf(),
                    format!("no module named '{}'", identifier),
                ));
            }
        };
        let registrar = evaluate(identifier, path, entry)?;
        Ok(LoadedModule::new(identifier, path, registrar.into_members()))
    }
}
