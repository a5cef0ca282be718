use tempfile::tempdir;

use super::fixtures::*;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::importer::StaticImporter;
use crate::plugin_system::manager::PluginManager;

fn loaded_greeter(importer: &StaticImporter, dir: &std::path::Path) -> PluginManager {
    touch_module(dir, "a_plugin");
    touch_module(dir, "greeter");
    touch_module(dir, "zeta");
    importer
        .define("a_plugin", a_module)
        .define("greeter", greeter_v1_module)
        .define("zeta", zeta_module);

    let mut manager = create_test_manager(dir, importer);
    assert!(manager.load_all().is_clean());
    take_events();
    manager
}

#[test]
fn test_reload_picks_up_new_definition() {
    let tmp_dir = tempdir().expect("Failed to create temp directory");
    let importer = StaticImporter::new();
    let mut manager = loaded_greeter(&importer, tmp_dir.path());
    let old_id = manager.get_by_name("Greeter").unwrap().id();
    assert_eq!(manager.run("Greeter", &[]).unwrap(), Some("hello from v1".to_string()));

    importer.define("greeter", greeter_v2_module);
    let new_ids = manager.reload("Greeter").expect("reload should succeed");
    assert_eq!(new_ids.len(), 2);

    let greeter = manager.get_by_name("Greeter").unwrap();
    assert_ne!(greeter.id(), old_id);
    assert_eq!(greeter.version(), "2.0.0");
    assert_eq!(manager.run("Greeter", &[]).unwrap(), Some("hello from v2".to_string()));

    // Replacements take the place of the old instances.
    assert_eq!(
        manager.list_names(),
        vec![
            "APlugin".to_string(),
            "Greeter".to_string(),
            "GreeterCompanion".to_string(),
            "ZetaPlugin".to_string(),
        ]
    );
    assert_eq!(
        take_events(),
        vec![
            "GreeterCompanion:register".to_string(),
            "Greeter v1:unregister".to_string(),
            "GreeterCompanion:unregister".to_string(),
        ]
    );
}

#[test]
fn test_failed_reload_keeps_previous_instance() {
    let tmp_dir = tempdir().expect("Failed to create temp directory");
    let importer = StaticImporter::new();
    let mut manager = loaded_greeter(&importer, tmp_dir.path());
    let old_id = manager.get_by_name("Greeter").unwrap().id();

    importer.define("greeter", greeter_broken_module);
    let err = manager.reload("Greeter").unwrap_err();
    assert!(matches!(err, PluginSystemError::RegistrationError { .. }));

    let greeter = manager.get_by_name("Greeter").unwrap();
    assert_eq!(greeter.id(), old_id);
    assert_eq!(manager.run("Greeter", &[]).unwrap(), Some("hello from v1".to_string()));
    assert_eq!(manager.registry().len(), 4);

    // Only the half-built replacement was torn down.
    assert_eq!(
        take_events(),
        vec![
            "GreeterCompanion:register".to_string(),
            "GreeterCompanion:unregister".to_string(),
        ]
    );
}

#[test]
fn test_reload_of_removed_module_fails() {
    let tmp_dir = tempdir().expect("Failed to create temp directory");
    let importer = StaticImporter::new();
    let mut manager = loaded_greeter(&importer, tmp_dir.path());

    std::fs::remove_file(tmp_dir.path().join(format!("greeter{}", std::env::consts::DLL_SUFFIX))).unwrap();
    let err = manager.reload("Greeter").unwrap_err();
    assert!(err.is_import_failure());
    assert!(manager.get_by_name("Greeter").is_ok());

    // The module is no longer cached, so later reloads import again.
    assert!(!manager.loader().is_cached("greeter"));
}

#[test]
fn test_reload_unknown_plugin() {
    let tmp_dir = tempdir().expect("Failed to create temp directory");
    let importer = StaticImporter::new();
    let mut manager = loaded_greeter(&importer, tmp_dir.path());

    match manager.reload("Nobody") {
        Err(PluginSystemError::NotFound { plugin_id }) => assert_eq!(plugin_id, "Nobody"),
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_reload_same_definition_after_manual_invalidation() {
    let tmp_dir = tempdir().expect("Failed to create temp directory");
    touch_module(tmp_dir.path(), "a_plugin");
    let importer = StaticImporter::new();
    importer.define("a_plugin", a_module);

    let mut manager = create_test_manager(tmp_dir.path(), &importer);
    manager.load("a_plugin").unwrap();
    take_events();

    let ids = manager.reload("APlugin").unwrap();
    assert_eq!(ids.len(), 1);
    assert_eq!(manager.list_names(), vec!["APlugin".to_string()]);
    assert_eq!(
        take_events(),
        vec!["APlugin:register".to_string(), "APlugin:unregister".to_string()]
    );
}
