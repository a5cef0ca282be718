#![cfg(test)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ConfigManager;
use crate::kernel::bootstrap::{AppOptions, Application};
use crate::kernel::error::Result as KernelResult;
use crate::logging::Logger;
use crate::plugin_system::{ModuleRegistrar, Plugin, PluginError, PluginRegistry, StaticImporter};

// ===== MOCK PLUGINS =====

thread_local! {
    static JOURNAL: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

pub fn journal() -> Vec<String> {
    JOURNAL.with(|j| j.borrow().clone())
}

fn note(entry: String) {
    JOURNAL.with(|j| j.borrow_mut().push(entry));
}

/// Counts the arguments it is run with
#[derive(Default)]
pub struct CounterPlugin {
    runs: usize,
}

impl Plugin for CounterPlugin {
    fn version(&self) -> &str {
        "1.2.0"
    }

    fn description(&self) -> Option<&str> {
        Some("Counts invocations")
    }

    fn on_register(&mut self, _registry: &PluginRegistry) -> Result<(), PluginError> {
        note("CounterPlugin:register".to_string());
        Ok(())
    }

    fn on_unregister(&mut self) -> Result<(), PluginError> {
        note(format!("CounterPlugin:unregister after {} run(s)", self.runs));
        Ok(())
    }

    fn run(&mut self, args: &[String]) -> Result<Option<String>, PluginError> {
        self.runs += 1;
        Ok(Some(format!("run #{} with [{}]", self.runs, args.join(", "))))
    }
}

/// Depends on `CounterPlugin`
#[derive(Default)]
pub struct ReporterPlugin;

impl Plugin for ReporterPlugin {
    fn dependencies(&self) -> Vec<String> {
        vec!["CounterPlugin".to_string()]
    }

    fn on_register(&mut self, registry: &PluginRegistry) -> Result<(), PluginError> {
        note(format!("ReporterPlugin:register ({} before)", registry.len()));
        Ok(())
    }

    fn on_unregister(&mut self) -> Result<(), PluginError> {
        note("ReporterPlugin:unregister".to_string());
        Ok(())
    }
}

pub fn counter_module(registrar: &mut ModuleRegistrar) {
    registrar.add::<CounterPlugin>();
}

pub fn reporter_module(registrar: &mut ModuleRegistrar) {
    registrar.add::<ReporterPlugin>();
}

// ===== ENVIRONMENT =====

pub struct TestEnvironment {
    pub root: PathBuf,
    pub plugin_dir: PathBuf,
    pub importer: StaticImporter,
}

/// Lays out a plugin directory with `counter`, `reporter` and one module
/// nothing defines, and registers the defined ones with a static importer.
pub fn setup_test_environment(root: &Path) -> TestEnvironment {
    let plugin_dir = root.join("plugins");
    fs::create_dir_all(&plugin_dir).expect("Failed to create plugin dir");
    for id in ["counter", "reporter", "orphan"] {
        fs::write(plugin_dir.join(format!("{}{}", id, std::env::consts::DLL_SUFFIX)), b"")
            .expect("Failed to create module file");
    }
    // Not a module: wrong suffix
    fs::write(plugin_dir.join("README.txt"), "notes").expect("Failed to write README");

    let importer = StaticImporter::new();
    importer
        .define("counter", counter_module)
        .define("reporter", reporter_module);

    TestEnvironment {
        root: root.to_path_buf(),
        plugin_dir,
        importer,
    }
}

impl TestEnvironment {
    pub fn config(&self, file_name: &str) -> KernelResult<ConfigManager> {
        Application::load_config(&self.root.join(file_name), &Logger::new("test"))
    }

    pub fn application(&self, config: ConfigManager) -> KernelResult<Application> {
        let options = AppOptions {
            plugin_dir: Some(self.plugin_dir.clone()),
            ..AppOptions::default()
        };
        Application::with_importer(config, options, Box::new(self.importer.clone()))
    }
}
