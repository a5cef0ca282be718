use std::path::{Path, PathBuf};

use crate::config::{ConfigManager, EnvConfig, default_config};
use crate::kernel::constants;
use crate::kernel::error::{Error, Result};
use crate::logging::{LogSettings, Logger};
use crate::plugin_system::{DylibImporter, LoadReport, ModuleImporter, PluginManager};

const DISABLED_KEY: &str = "plugins.disabled";

/// Command line overrides applied on top of the configuration file
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Plugin directory, taking precedence over the environment and config
    pub plugin_dir: Option<PathBuf>,
    /// Overrides `plugins.auto_load`
    pub auto_load: Option<bool>,
    pub debug: bool,
}

/// Main application struct. Owns the configuration, the root logger and the
/// plugin manager, and hands them out explicitly.
pub struct Application {
    config: ConfigManager,
    logger: Logger,
    plugins: PluginManager,
    debug: bool,
    auto_load: bool,
    initialized: bool,
}

impl Application {
    /// Loads the configuration at `path`, creating it from the framework
    /// defaults when missing.
    pub fn load_config(path: &Path, logger: &Logger) -> Result<ConfigManager> {
        let mut config = ConfigManager::new(path, logger)?;
        config.set_defaults(default_config());
        config.load()?;
        Ok(config)
    }

    /// Creates an application that loads plugins as dynamic libraries.
    pub fn new(config: ConfigManager, options: AppOptions) -> Result<Self> {
        Self::with_importer(config, options, Box::new(DylibImporter::new()))
    }

    /// Creates an application that imports plugin modules through `importer`.
    pub fn with_importer(
        config: ConfigManager,
        options: AppOptions,
        importer: Box<dyn ModuleImporter>,
    ) -> Result<Self> {
        let logger = Logger::default();
        let env = EnvConfig::new(&logger);

        let plugin_dir = options
            .plugin_dir
            .or_else(|| env.get(constants::ENV_PLUGIN_DIR).map(PathBuf::from))
            .or_else(|| config.get_nested_as::<String>("plugins.plugin_dir").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_PLUGINS_DIR));
        let auto_load = options
            .auto_load
            .unwrap_or_else(|| config.get_nested_or("plugins.auto_load", true));
        let debug = options.debug
            || env.get_bool(constants::ENV_DEBUG, false)
            || config.get_nested_or("framework.debug", false);

        if plugin_dir.as_os_str().is_empty() {
            return Err(Error::validation(
                "plugins.plugin_dir",
                "",
                "Plugin directory must not be empty",
            ));
        }

        logger.info(format!(
            "Initializing {} v{}",
            constants::APP_NAME,
            constants::APP_VERSION
        ));
        logger.debug(format!("Plugin directory: {}", plugin_dir.display()));

        let plugins = PluginManager::new(plugin_dir, importer, &logger);
        Ok(Self {
            config,
            logger,
            plugins,
            debug,
            auto_load,
            initialized: false,
        })
    }

    /// Starts the application: loads every plugin when auto-loading is on.
    /// Returns the load report of that pass, if one ran.
    pub fn start(&mut self) -> Result<Option<LoadReport>> {
        if self.initialized {
            return Err(Error::Other("Application already started".to_string()));
        }
        let report = if self.auto_load {
            let report = self.plugins.load_all();
            for failure in &report.failures {
                self.logger.warning(format!(
                    "Plugin module '{}' was skipped: {}",
                    failure.module, failure.error
                ));
            }
            self.apply_disabled();
            Some(report)
        } else {
            self.logger.info("Plugin auto-loading is disabled");
            None
        };
        self.initialized = true;
        Ok(report)
    }

    /// Enables or disables a loaded plugin and records the choice under
    /// `plugins.disabled`, so the next start applies it again.
    pub fn set_plugin_enabled(&mut self, name: &str, enabled: bool) -> Result<()> {
        if enabled {
            self.plugins.enable(name)?;
        } else {
            self.plugins.disable(name)?;
        }
        let mut disabled = self.disabled_plugins();
        disabled.retain(|n| n != name);
        if !enabled {
            disabled.push(name.to_string());
        }
        self.config.set_nested(DISABLED_KEY, disabled)?;
        Ok(())
    }

    /// Plugin names recorded as disabled in the configuration
    pub fn disabled_plugins(&self) -> Vec<String> {
        self.config.get_nested_or(DISABLED_KEY, Vec::new())
    }

    fn apply_disabled(&mut self) {
        for name in self.disabled_plugins() {
            if self.plugins.disable(&name).is_err() {
                self.logger
                    .debug(format!("Disabled plugin '{}' is not loaded", name));
            }
        }
    }

    /// Unloads every plugin. Returns how many were unloaded.
    pub fn shutdown(&mut self) -> usize {
        let unloaded = self.plugins.unload_all();
        self.initialized = false;
        self.logger
            .info(format!("Shut down, {} plugin(s) unloaded", unloaded));
        unloaded
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn auto_load(&self) -> bool {
        self.auto_load
    }

    /// Log output settings: `DEBUG` in debug mode, otherwise the `logging`
    /// section of the configuration
    pub fn log_settings(&self) -> LogSettings {
        LogSettings::from_config(&self.config, self.debug)
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigManager {
        &mut self.config
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn plugins(&self) -> &PluginManager {
        &self.plugins
    }

    pub fn plugins_mut(&mut self) -> &mut PluginManager {
        &mut self.plugins
    }
}
