//! Example plugin for ConSolar.
//!
//! Build it as a `cdylib` and copy the library into the plugin directory:
//! `consolar plugin run ExamplePlugin` then prints its greeting.
use consolar_core::{Logger, Plugin, PluginError, PluginRegistry};
use serde::Serialize;

const GREETING: &str = "Hello from Example Plugin!";

/// A simple plugin that demonstrates the plugin hooks
#[derive(Debug)]
pub struct ExamplePlugin {
    logger: Logger,
    greetings: usize,
}

/// Snapshot returned by the `status` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginStatus {
    pub name: String,
    pub version: String,
    pub description: String,
    pub greetings: usize,
}

impl Default for ExamplePlugin {
    fn default() -> Self {
        Self {
            logger: Logger::new("Plugin-ExamplePlugin"),
            greetings: 0,
        }
    }
}

impl ExamplePlugin {
    pub fn do_something(&mut self) -> String {
        self.greetings += 1;
        self.logger.info("Example plugin is doing something!");
        GREETING.to_string()
    }

    pub fn status(&self) -> PluginStatus {
        PluginStatus {
            name: self.name().to_string(),
            version: self.version().to_string(),
            description: self.description().unwrap_or_default().to_string(),
            greetings: self.greetings,
        }
    }
}

impl Plugin for ExamplePlugin {
    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> Option<&str> {
        Some("A simple example plugin that demonstrates plugin capabilities")
    }

    fn on_register(&mut self, _registry: &PluginRegistry) -> Result<(), PluginError> {
        self.logger.info("Example plugin registered successfully!");
        Ok(())
    }

    fn on_unregister(&mut self) -> Result<(), PluginError> {
        self.logger.info("Example plugin unregistered");
        Ok(())
    }

    /// `hello` (the default) greets, `status` prints the status as JSON.
    fn run(&mut self, args: &[String]) -> Result<Option<String>, PluginError> {
        match args.first().map(String::as_str) {
            None | Some("hello") => Ok(Some(self.do_something())),
            Some("status") => serde_json::to_string(&self.status())
                .map(Some)
                .map_err(|e| PluginError::ExecutionError(e.to_string())),
            Some(other) => Err(PluginError::ExecutionError(format!(
                "unknown command '{}', expected 'hello' or 'status'",
                other
            ))),
        }
    }
}

consolar_core::export_plugin!(ExamplePlugin);

#[cfg(test)]
mod tests {
    use super::*;
    use consolar_core::kernel::constants;

    #[test]
    fn test_greeting_and_status() {
        let mut plugin = ExamplePlugin::default();
        assert_eq!(plugin.name(), "ExamplePlugin");
        assert_eq!(plugin.run(&[]).unwrap(), Some(GREETING.to_string()));
        assert_eq!(
            plugin.run(&["hello".to_string()]).unwrap(),
            Some(GREETING.to_string())
        );

        let status = plugin.status();
        assert_eq!(status.version, "1.0.0");
        assert_eq!(status.greetings, 2);

        let json = plugin.run(&["status".to_string()]).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "ExamplePlugin");
        assert_eq!(value["greetings"], 2);
    }

    #[test]
    fn test_unknown_command_fails() {
        let mut plugin = ExamplePlugin::default();
        let err = plugin.run(&["dance".to_string()]).unwrap_err();
        assert!(matches!(err, PluginError::ExecutionError(_)));
    }

    #[test]
    fn test_exported_declaration() {
        assert_eq!(CONSOLAR_PLUGIN_MODULE.api_version, constants::API_VERSION);
        assert_eq!(CONSOLAR_PLUGIN_MODULE.core_version, constants::CORE_VERSION);

        let mut registrar = consolar_core::ModuleRegistrar::new();
        (CONSOLAR_PLUGIN_MODULE.register)(&mut registrar);
        let members = registrar.into_members();
        assert_eq!(members.len(), 1);
        assert_eq!((members[0].construct)().name(), "ExamplePlugin");
    }
}
