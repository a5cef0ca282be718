/// Application name
pub const APP_NAME: &str = "ConSolar";

/// Application version
pub const APP_VERSION: &str = "0.0.1b";

/// Short description shown in banners and `--help`
pub const APP_DESCRIPTION: &str = "A Console Framework for Interactive Applications";

/// Current plugin API version. Plugin modules built against a different
/// major version are rejected at import time.
pub const API_VERSION: &str = "0.1.0";

/// Version of this crate, baked into every exported plugin declaration
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default plugins directory
pub const DEFAULT_PLUGINS_DIR: &str = "plugins";

/// File names starting with this prefix are never treated as plugin modules
pub const RESERVED_PREFIX: &str = "__";

/// Version reported by plugins that do not declare one
pub const DEFAULT_PLUGIN_VERSION: &str = "1.0.0";

/// Version reported by descriptors without sidecar metadata
pub const UNKNOWN_VERSION: &str = "unknown";

/// Name of the symbol every dynamic plugin module exports
pub const PLUGIN_DECLARATION_SYMBOL: &str = "CONSOLAR_PLUGIN_MODULE";

/// Default configuration directory
pub const CONFIG_DIR_NAME: &str = "config";

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Default log directory
pub const LOG_DIR_NAME: &str = "logs";

/// Default log file name
pub const LOG_FILE_NAME: &str = "consolar.log";

/// Environment variable overriding the configured plugin directory
pub const ENV_PLUGIN_DIR: &str = "CONSOLAR_PLUGIN_DIR";

/// Environment variable enabling debug output (`true`, `1`, `yes`, `on`)
pub const ENV_DEBUG: &str = "CONSOLAR_DEBUG";
