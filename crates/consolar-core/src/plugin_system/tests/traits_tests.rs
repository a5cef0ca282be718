use std::path::Path;
use std::sync::Arc;

use super::fixtures::*;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::module::LoadedModule;
use crate::plugin_system::registry::PluginRegistry;
use crate::plugin_system::traits::{Plugin, short_type_name};

fn detached_module() -> Arc<LoadedModule> {
    Arc::new(LoadedModule::new("detached", Path::new("detached.so"), Vec::new()))
}

#[test]
fn test_plugin_defaults() {
    let plugin: Box<dyn Plugin> = Box::new(ZetaPlugin);
    assert_eq!(plugin.name(), "ZetaPlugin");
    assert_eq!(plugin.version(), "1.0.0");
    assert_eq!(plugin.description(), None);
    assert!(plugin.dependencies().is_empty());
}

#[test]
fn test_plugin_overrides() {
    let plugin: Box<dyn Plugin> = Box::new(BPlugin);
    assert_eq!(plugin.name(), "BPlugin");
    assert_eq!(plugin.version(), "0.3.1");
    assert_eq!(plugin.dependencies(), vec!["APlugin".to_string()]);

    let greeter: Box<dyn Plugin> = Box::new(GreeterV2);
    assert_eq!(greeter.name(), "Greeter");
}

#[test]
fn test_short_type_name() {
    assert_eq!(short_type_name("consolar_core::plugins::APlugin"), "APlugin");
    assert_eq!(short_type_name("APlugin"), "APlugin");
    assert_eq!(short_type_name("my_crate::Wrapper<other::Inner>"), "Wrapper");
}

#[test]
fn test_register_without_dependencies() {
    take_events();
    let registry = PluginRegistry::new();
    let mut plugin: Box<dyn Plugin> = Box::new(APlugin);

    plugin.register(&registry, &test_logger()).expect("register should succeed");
    assert_eq!(take_events(), vec!["APlugin:register".to_string()]);
}

#[test]
fn test_register_missing_dependency() {
    let registry = PluginRegistry::new();
    let mut plugin: Box<dyn Plugin> = Box::new(BPlugin);

    match plugin.register(&registry, &test_logger()) {
        Err(PluginSystemError::MissingDependency { plugin_id, dependency }) => {
            assert_eq!(plugin_id, "BPlugin");
            assert_eq!(dependency, "APlugin");
        }
        other => panic!("Expected MissingDependency, got {:?}", other),
    }
}

#[test]
fn test_register_with_dependency_present() {
    let mut registry = PluginRegistry::new();
    registry.insert(Box::new(APlugin), detached_module());

    let mut plugin: Box<dyn Plugin> = Box::new(BPlugin);
    assert!(plugin.register(&registry, &test_logger()).is_ok());
}

#[test]
fn test_register_hook_failure_is_wrapped() {
    let registry = PluginRegistry::new();
    let mut plugin: Box<dyn Plugin> = Box::new(FailingSetupPlugin);

    let err = plugin.register(&registry, &test_logger()).unwrap_err();
    assert_eq!(err.plugin_id(), Some("FailingSetupPlugin"));
    assert!(matches!(err, PluginSystemError::RegistrationError { .. }));
    assert!(err.to_string().contains("setup refused"));
}

#[test]
fn test_register_hook_panic_is_contained() {
    let registry = PluginRegistry::new();
    let mut plugin: Box<dyn Plugin> = Box::new(PanickingSetupPlugin);

    match plugin.register(&registry, &test_logger()) {
        Err(PluginSystemError::RegistrationError { plugin_id, message }) => {
            assert_eq!(plugin_id, "PanickingSetupPlugin");
            assert_eq!(message, "panic: setup exploded");
        }
        other => panic!("Expected RegistrationError, got {:?}", other),
    }
}

#[test]
fn test_unregister_failure_is_reported() {
    take_events();
    let mut plugin: Box<dyn Plugin> = Box::new(FaultyTeardownPlugin);

    let err = plugin.unregister(&test_logger()).unwrap_err();
    assert!(matches!(err, PluginSystemError::ShutdownError { .. }));
    assert_eq!(take_events(), vec!["FaultyTeardownPlugin:unregister".to_string()]);
}

#[test]
fn test_execute_default_and_failure() {
    let mut quiet: Box<dyn Plugin> = Box::new(ZetaPlugin);
    assert_eq!(quiet.execute(&[]).unwrap(), None);

    let mut failing: Box<dyn Plugin> = Box::new(FailingRunPlugin);
    match failing.execute(&[]) {
        Err(PluginSystemError::ExecutionError { plugin_id, message }) => {
            assert_eq!(plugin_id, "FailingRunPlugin");
            assert!(message.contains("nothing to do"));
        }
        other => panic!("Expected ExecutionError, got {:?}", other),
    }
}
