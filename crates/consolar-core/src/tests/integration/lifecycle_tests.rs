#![cfg(test)]

use tempfile::tempdir;

use super::common::{journal, reporter_module, setup_test_environment};
use crate::kernel::error::{EXIT_PLUGIN, Error, Result};
use crate::plugin_system::PluginSystemError;

#[test]
fn test_start_run_and_shutdown() -> Result<()> {
    let tmp_dir = tempdir().expect("Failed to create temp directory");
    let env = setup_test_environment(tmp_dir.path());
    let mut app = env.application(env.config("config.json")?)?;

    let report = app.start()?.expect("auto-load is on by default");
    assert_eq!(
        report.loaded,
        vec!["CounterPlugin".to_string(), "ReporterPlugin".to_string()]
    );
    assert_eq!(report.failed_modules(), vec!["orphan"]);

    let plugins = app.plugins_mut();
    let args = vec!["a".to_string(), "b".to_string()];
    assert_eq!(plugins.run("CounterPlugin", &args)?, Some("run #1 with [a, b]".to_string()));
    assert_eq!(plugins.run("CounterPlugin", &[])?, Some("run #2 with []".to_string()));
    assert_eq!(plugins.run("ReporterPlugin", &[])?, None);

    assert_eq!(app.shutdown(), 2);
    assert_eq!(
        journal(),
        vec![
            "CounterPlugin:register".to_string(),
            "ReporterPlugin:register (1 before)".to_string(),
            "CounterPlugin:unregister after 2 run(s)".to_string(),
            "ReporterPlugin:unregister".to_string(),
        ]
    );
    Ok(())
}

#[test]
fn test_disabled_plugin_surfaces_plugin_exit_code() -> Result<()> {
    let tmp_dir = tempdir().expect("Failed to create temp directory");
    let env = setup_test_environment(tmp_dir.path());
    let mut app = env.application(env.config("config.json")?)?;
    app.start()?;

    app.plugins_mut().disable("CounterPlugin")?;
    let err: Error = app
        .plugins_mut()
        .run("CounterPlugin", &[])
        .unwrap_err()
        .into();
    assert_eq!(err.exit_code(), EXIT_PLUGIN);
    assert!(matches!(
        err,
        Error::PluginSystem(PluginSystemError::Disabled { .. })
    ));

    app.plugins_mut().enable("CounterPlugin")?;
    assert!(app.plugins_mut().run("CounterPlugin", &[])?.is_some());
    Ok(())
}

#[test]
fn test_reload_keeps_state_of_other_plugins() -> Result<()> {
    let tmp_dir = tempdir().expect("Failed to create temp directory");
    let env = setup_test_environment(tmp_dir.path());
    let mut app = env.application(env.config("config.json")?)?;
    app.start()?;

    app.plugins_mut().run("CounterPlugin", &[])?;
    env.importer.define("reporter", reporter_module);
    app.plugins_mut().reload("ReporterPlugin")?;

    // CounterPlugin was not touched by the reload.
    assert_eq!(
        app.plugins_mut().run("CounterPlugin", &[])?,
        Some("run #2 with []".to_string())
    );
    assert_eq!(
        app.plugins().list_names(),
        vec!["CounterPlugin".to_string(), "ReporterPlugin".to_string()]
    );
    Ok(())
}

#[test]
fn test_unknown_plugin_is_not_found() -> Result<()> {
    let tmp_dir = tempdir().expect("Failed to create temp directory");
    let env = setup_test_environment(tmp_dir.path());
    let mut app = env.application(env.config("config.json")?)?;
    app.start()?;

    match app.plugins_mut().reload("Ghost") {
        Err(PluginSystemError::NotFound { plugin_id }) => assert_eq!(plugin_id, "Ghost"),
        other => panic!("Expected NotFound, got {:?}", other.map(|ids| ids.len())),
    }
    Ok(())
}
