use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::kernel::constants;
use crate::logging::Logger;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::registry::PluginRegistry;

/// Error type returned by plugin hooks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PluginError {
    #[error("Plugin setup error: {0}")]
    SetupError(String),
    #[error("Plugin dependency error: {0}")]
    DependencyError(String),
    #[error("Plugin teardown error: {0}")]
    TeardownError(String),
    #[error("Plugin execution error: {0}")]
    ExecutionError(String),
}

/// Core trait that all plugins must implement.
///
/// Only the hooks are meant to be overridden. The cross-cutting part of the
/// lifecycle (dependency checks, logging, panic containment) lives in
/// [`register`](#method.register) and [`unregister`](#method.unregister) on
/// `dyn Plugin`, which the loader and manager call.
pub trait Plugin: Any {
    /// The name of the plugin. Defaults to the implementing type's name.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// The semantic version of the plugin
    fn version(&self) -> &str {
        constants::DEFAULT_PLUGIN_VERSION
    }

    /// Human readable description
    fn description(&self) -> Option<&str> {
        None
    }

    /// Names of plugins that must already be registered when this one is
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Custom setup, called once after the dependency check passed
    fn on_register(&mut self, _registry: &PluginRegistry) -> Result<(), PluginError> {
        Ok(())
    }

    /// Custom teardown, called once when the plugin is unloaded
    fn on_unregister(&mut self) -> Result<(), PluginError> {
        Ok(())
    }

    /// The plugin's own action, invoked from the console. Returns a line of
    /// output to show the user, if any.
    fn run(&mut self, _args: &[String]) -> Result<Option<String>, PluginError> {
        Ok(None)
    }
}

impl dyn Plugin {
    /// Runs the registration step for this plugin against `registry`.
    ///
    /// Dependencies are checked against the names registered at call time;
    /// a dependency registered afterwards does not satisfy an earlier check.
    pub fn register(
        &mut self,
        registry: &PluginRegistry,
        logger: &Logger,
    ) -> Result<(), PluginSystemError> {
        let name = self.name().to_string();
        let registered = registry.names();
        for dependency in self.dependencies() {
            if !registered.iter().any(|n| *n == dependency) {
                logger.plugin_action(&name, "register", "MISSING DEPENDENCY");
                return Err(PluginSystemError::MissingDependency {
                    plugin_id: name,
                    dependency,
                });
            }
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.on_register(registry)));
        match outcome {
            Ok(Ok(())) => {
                logger.plugin_action(&name, "register", "SUCCESS");
                Ok(())
            }
            Ok(Err(e)) => {
                logger.plugin_action(&name, "register", "FAILED");
                Err(PluginSystemError::RegistrationError {
                    plugin_id: name,
                    message: e.to_string(),
                })
            }
            Err(panic_obj) => {
                logger.plugin_action(&name, "register", "PANICKED");
                Err(PluginSystemError::RegistrationError {
                    plugin_id: name,
                    message: format!("panic: {}", panic_message(panic_obj.as_ref())),
                })
            }
        }
    }

    /// Invokes the plugin's `run` hook with panic containment.
    pub fn execute(&mut self, args: &[String]) -> Result<Option<String>, PluginSystemError> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run(args)));
        match outcome {
            Ok(result) => result.map_err(|e| PluginSystemError::ExecutionError {
                plugin_id: self.name().to_string(),
                message: e.to_string(),
            }),
            Err(panic_obj) => Err(PluginSystemError::ExecutionError {
                plugin_id: self.name().to_string(),
                message: format!("panic: {}", panic_message(panic_obj.as_ref())),
            }),
        }
    }

    /// Runs the teardown step for this plugin.
    pub fn unregister(&mut self, logger: &Logger) -> Result<(), PluginSystemError> {
        let name = self.name().to_string();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.on_unregister()));
        match outcome {
            Ok(Ok(())) => {
                logger.plugin_action(&name, "unregister", "SUCCESS");
                Ok(())
            }
            Ok(Err(e)) => {
                logger.plugin_action(&name, "unregister", "FAILED");
                Err(PluginSystemError::ShutdownError {
                    plugin_id: name,
                    message: e.to_string(),
                })
            }
            Err(panic_obj) => {
                logger.plugin_action(&name, "unregister", "PANICKED");
                Err(PluginSystemError::ShutdownError {
                    plugin_id: name,
                    message: format!("panic: {}", panic_message(panic_obj.as_ref())),
                })
            }
        }
    }
}

/// Strips the module path and generic arguments from a `type_name`.
pub fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

pub(crate) fn panic_message(panic_obj: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_obj.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = panic_obj.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic reason".to_string()
    }
}
