mod logging;
mod menu;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::{Term, style};
use consolar_core::kernel::constants;
use consolar_core::{AppOptions, Application, ConfigManager, Error, Logger, Result};
use serde_json::Value;

/// ConSolar: a console framework for interactive applications
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Configuration file (JSON, YAML or TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory to load plugin modules from
    #[arg(long, value_name = "DIR")]
    plugin_dir: Option<PathBuf>,

    /// Verbose output on the console and in the log file
    #[arg(long)]
    debug: bool,

    /// Do not load plugins at startup
    #[arg(long)]
    no_plugins: bool,

    /// Simple ping command for testing
    #[arg(long)]
    ping: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage plugins
    Plugin {
        #[command(subcommand)]
        command: PluginCommand,
    },
    /// Read or change configuration values
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum PluginCommand {
    /// List loaded plugins
    List,
    /// List plugin modules in the plugin directory without loading them
    Discover,
    /// Reload the module providing a plugin
    Reload { name: String },
    /// Enable a plugin (persist setting)
    Enable { name: String },
    /// Disable a plugin (persist setting)
    Disable { name: String },
    /// Run a plugin's action
    Run {
        name: String,
        /// Arguments passed to the plugin
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print a value by dotted key, e.g. `logging.level`
    Get { key: String },
    /// Set a value by dotted key. The value is parsed as JSON when possible.
    Set { key: String, value: String },
}

const CANCELLED: &str = "Operation cancelled by user";

fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    if let Err(e) = install_interrupt_handler() {
        eprintln!("{} signal handler not installed: {}", style("warning:").yellow(), e);
    }
    let logging = match logging::init_logging(args.debug) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("{} logging disabled: {}", style("warning:").yellow(), e);
            None
        }
    };

    match run(args, logging.as_ref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_error(&e),
    }
}

/// SIGINT and SIGTERM outside an interactive prompt end the process like a
/// cancelled prompt does: a notice and exit status 0. Plugins loaded at that
/// point are not unregistered.
fn install_interrupt_handler() -> std::result::Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        let _ = Term::stderr().show_cursor();
        log::warn!("Interrupted by signal");
        eprintln!("\n{}", style(CANCELLED).yellow());
        std::process::exit(0);
    })
}

/// Prints `e` and maps it onto the process exit status.
fn report_error(e: &Error) -> ExitCode {
    if e.is_interrupt() {
        eprintln!("\n{}", style(CANCELLED).yellow());
    } else {
        log::error!("{}", e);
        eprintln!("{} {}", style("Error:").red().bold(), e);
    }
    ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
}

fn run(args: CliArgs, log_handle: Option<&logging::LogHandle>) -> Result<()> {
    let config_path = args.config.unwrap_or_else(ConfigManager::default_path);
    let config = Application::load_config(&config_path, &Logger::default())?;
    let options = AppOptions {
        plugin_dir: args.plugin_dir,
        auto_load: args.no_plugins.then_some(false),
        debug: args.debug,
    };
    let mut app = Application::new(config, options)?;

    if let Some(handle) = log_handle {
        let settings = app.log_settings();
        if let Err(e) = handle.configure(&settings) {
            log::warn!("Could not open log file {}: {}", settings.log_path().display(), e);
        }
    }
    tracing::debug!(command = ?args.command, "dispatching");

    match args.command {
        Some(Commands::Config { command }) => run_config_command(&mut app, command),
        Some(Commands::Plugin { command }) => {
            if let PluginCommand::Discover = command {
                print_discovered(&app);
                return Ok(());
            }
            app.start()?;
            let result = run_plugin_command(&mut app, command);
            app.shutdown();
            result
        }
        None => {
            println!(
                "{} v{}",
                style(constants::APP_NAME).cyan().bold(),
                constants::APP_VERSION
            );
            app.start()?;
            let result = menu::run(&mut app);
            app.shutdown();
            result
        }
    }
}

fn run_plugin_command(app: &mut Application, command: PluginCommand) -> Result<()> {
    match command {
        PluginCommand::List => print_plugins(app),
        PluginCommand::Discover => print_discovered(app),
        PluginCommand::Reload { name } => {
            let ids = app.plugins_mut().reload(&name)?;
            println!(
                "{} Reloaded '{}' ({} plugin(s) rebuilt)",
                style("✓").green().bold(),
                name,
                ids.len()
            );
        }
        PluginCommand::Enable { name } => {
            app.set_plugin_enabled(&name, true)?;
            println!("{} Enabled '{}'", style("✓").green().bold(), name);
        }
        PluginCommand::Disable { name } => {
            app.set_plugin_enabled(&name, false)?;
            println!("{} Disabled '{}'", style("✓").green().bold(), name);
        }
        PluginCommand::Run { name, args } => {
            if let Some(output) = app.plugins_mut().run(&name, &args)? {
                println!("{}", output);
            }
        }
    }
    Ok(())
}

fn run_config_command(app: &mut Application, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Get { key } => {
            let value = app
                .config()
                .get_nested(&key)
                .ok_or_else(|| Error::validation("key", &key, "No such configuration key"))?;
            match value {
                Value::String(s) => println!("{}", s),
                other => println!("{}", other),
            }
        }
        ConfigCommand::Set { key, value } => {
            let parsed = serde_json::from_str::<Value>(&value).unwrap_or(Value::String(value));
            app.config_mut().set_nested(&key, &parsed)?;
            println!("{} = {}", key, parsed);
        }
    }
    Ok(())
}

pub(crate) fn print_plugins(app: &Application) {
    let registry = app.plugins().registry();
    if registry.is_empty() {
        println!("No plugins loaded.");
        return;
    }
    println!("Loaded plugins:");
    for instance in registry.iter() {
        let status = if instance.is_enabled() {
            style("enabled").green()
        } else {
            style("disabled").red()
        };
        println!(
            "  - {} v{} [{}] from '{}'",
            style(instance.name()).bold(),
            instance.version(),
            status,
            instance.module_identifier()
        );
        if let Some(description) = instance.description() {
            println!("      {}", style(description).dim());
        }
    }
}

fn print_discovered(app: &Application) {
    let descriptors = app.plugins().describe();
    if descriptors.is_empty() {
        println!(
            "No plugin modules found in {}",
            app.plugins().plugin_dir().display()
        );
        return;
    }
    println!("Plugin modules in {}:", app.plugins().plugin_dir().display());
    for descriptor in descriptors {
        println!(
            "  - {} (version {}) {}",
            style(&descriptor.identifier).bold(),
            descriptor.version,
            style(&descriptor.description).dim()
        );
    }
}
