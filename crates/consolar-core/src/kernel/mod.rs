//! # ConSolar Kernel
//!
//! The `kernel` module ties the framework together.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Application Bootstrapping**: [`Application`](bootstrap::Application)
//!   loads the configuration, builds the root [`Logger`](crate::logging::Logger)
//!   and the [`PluginManager`](crate::plugin_system::PluginManager), and passes
//!   them around explicitly instead of through global instances.
//! - **Core Constants**: Names, versions and default paths in `constants`.
//! - **Error Handling**: The top-level [`Error`](error::Error), its `Result`
//!   alias and the process exit code of every failure, in `error`.
pub mod bootstrap;
pub mod constants;
pub mod error;

pub use bootstrap::{AppOptions, Application};
pub use error::{Error, Result};
