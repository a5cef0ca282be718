//! # ConSolar Plugin System
//!
//! Finds plugin modules in a directory, imports them, constructs the plugin
//! types each module declares and tracks every plugin through its lifecycle
//! (register, enable/disable, unregister, reload).
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`traits`]**: The [`Plugin`] trait implemented by every plugin, and the
//!   base `register` / `unregister` steps run on `dyn Plugin`.
//! - **[`registry`]**: [`PluginRegistry`], the ordered collection of live
//!   [`PluginInstance`]s.
//! - **[`discovery`]**: [`PluginDiscovery`], a file-name based scan of the
//!   plugin directory that never imports anything.
//! - **[`module`]**: What a module declares: [`PluginDeclaration`],
//!   [`ModuleRegistrar`] and the [`export_plugin!`](crate::export_plugin)
//!   macro.
//! - **[`importer`]**: [`ModuleImporter`] and its implementations for dynamic
//!   libraries ([`DylibImporter`]) and linked-in modules ([`StaticImporter`]).
//! - **[`loader`]**: [`PluginLoader`], the module cache plus construction and
//!   registration of module members.
//! - **[`manager`]**: [`PluginManager`], which composes the above.
//! - **[`error`]** and **[`version`]**: Error types and API version checks.
//!
//! Everything here is synchronous and single-threaded. Mutating operations
//! take `&mut self`.
pub mod discovery;
pub mod error;
pub mod importer;
pub mod loader;
pub mod manager;
pub mod module;
pub mod registry;
pub mod traits;
pub mod version;

pub use discovery::{PluginDescriptor, PluginDiscovery};
pub use error::PluginSystemError;
pub use importer::{DylibImporter, ModuleImporter, StaticImporter};
pub use loader::PluginLoader;
pub use manager::{LoadFailure, LoadReport, PluginManager};
pub use module::{
    LoadedModule, LoggerInstaller, ModuleRegistrar, PluginDeclaration, PluginMember, install_host_logger,
};
pub use registry::{InstanceId, PluginInstance, PluginRegistry};
pub use traits::{Plugin, PluginError};
pub use version::ApiVersion;

#[cfg(test)]
mod tests;
