use std::path::Path;
use std::sync::Arc;

use super::fixtures::*;
use crate::plugin_system::module::LoadedModule;
use crate::plugin_system::registry::PluginRegistry;

fn module(identifier: &str) -> Arc<LoadedModule> {
    Arc::new(LoadedModule::new(identifier, Path::new("unused"), Vec::new()))
}

#[test]
fn test_registry_keeps_insertion_order() {
    let mut registry = PluginRegistry::new();
    assert!(registry.is_empty());

    registry.insert(Box::new(ZetaPlugin), module("z"));
    registry.insert(Box::new(APlugin), module("a"));
    registry.insert(Box::new(BPlugin), module("a"));

    assert_eq!(registry.len(), 3);
    assert_eq!(registry.names(), vec!["ZetaPlugin", "APlugin", "BPlugin"]);
}

#[test]
fn test_instance_metadata_is_captured() {
    let mut registry = PluginRegistry::new();
    let id = registry.insert(Box::new(BPlugin), module("b_module"));

    let instance = registry.get_by_id(id).expect("instance should exist");
    assert_eq!(instance.name(), "BPlugin");
    assert_eq!(instance.version(), "0.3.1");
    assert_eq!(instance.description(), None);
    assert_eq!(instance.dependencies(), ["APlugin".to_string()]);
    assert!(instance.is_enabled());
    assert_eq!(instance.module_identifier(), "b_module");
}

#[test]
fn test_ids_are_unique() {
    let mut registry = PluginRegistry::new();
    let first = registry.insert(Box::new(APlugin), module("a"));
    let second = registry.insert(Box::new(APlugin), module("a"));
    assert_ne!(first, second);
    assert_eq!(registry.ids(), vec![first, second]);
}

#[test]
fn test_duplicate_names_resolve_to_first() {
    let mut registry = PluginRegistry::new();
    let first = registry.insert(Box::new(APlugin), module("a"));
    registry.insert(Box::new(APlugin), module("a2"));

    assert_eq!(registry.get("APlugin").map(|i| i.id()), Some(first));
    assert_eq!(registry.names(), vec!["APlugin", "APlugin"]);
}

#[test]
fn test_remove_by_identity() {
    let mut registry = PluginRegistry::new();
    let a = registry.insert(Box::new(APlugin), module("a"));
    let z = registry.insert(Box::new(ZetaPlugin), module("z"));

    let removed = registry.remove(a).expect("APlugin should be removed");
    assert_eq!(removed.name(), "APlugin");
    assert!(registry.remove(a).is_none());
    assert_eq!(registry.names(), vec!["ZetaPlugin"]);
    assert_eq!(registry.position(z), Some(0));
}

#[test]
fn test_enable_disable_flag() {
    let mut registry = PluginRegistry::new();
    registry.insert(Box::new(APlugin), module("a"));
    registry.insert(Box::new(ZetaPlugin), module("z"));

    assert!(registry.set_enabled("APlugin", false));
    assert!(!registry.get("APlugin").unwrap().is_enabled());
    assert_eq!(registry.enabled_names(), vec!["ZetaPlugin"]);

    assert!(registry.set_enabled("APlugin", true));
    assert_eq!(registry.enabled_names(), vec!["APlugin", "ZetaPlugin"]);
    assert!(!registry.set_enabled("Missing", true));
}

#[test]
fn test_ids_for_module() {
    let mut registry = PluginRegistry::new();
    let a = registry.insert(Box::new(APlugin), module("shared"));
    registry.insert(Box::new(ZetaPlugin), module("other"));
    let b = registry.insert(Box::new(BPlugin), module("shared"));

    assert_eq!(registry.ids_for_module("shared"), vec![a, b]);
    assert!(registry.ids_for_module("missing").is_empty());
}
