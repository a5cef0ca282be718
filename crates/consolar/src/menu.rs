//! Interactive main menu shown when no subcommand is given.
use console::{Term, style};
use consolar_core::utils::validate_not_empty;
use consolar_core::{Application, Result, UserPrompt};

const LIST_PLUGINS: &str = "List plugins";
const TEST_INPUT: &str = "Test user input";
const TEST_CHOICE: &str = "Test multi-choice";
const MANAGE_PLUGIN: &str = "Manage a plugin";
const EXIT: &str = "Exit";

const MAIN_OPTIONS: [&str; 5] = [LIST_PLUGINS, TEST_INPUT, TEST_CHOICE, MANAGE_PLUGIN, EXIT];
const PLUGIN_ACTIONS: [&str; 6] = ["Run", "Reload", "Enable", "Disable", "Unload", "Back"];

/// Runs the menu until the user picks "Exit".
///
/// Ctrl+C surfaces as [`Error::Interrupted`](consolar_core::Error::Interrupted);
/// any other failure of a menu action is shown and the menu continues.
///
/// Without a terminal the menu prints the loaded plugins and returns.
pub fn run(app: &mut Application) -> Result<()> {
    if !Term::stdout().is_term() {
        crate::print_plugins(app);
        println!("Interactive menu needs a terminal; see --help for subcommands.");
        return Ok(());
    }
    let mut prompt = UserPrompt::new();
    loop {
        println!();
        let choice = prompt.multi_choice("Main menu", &MAIN_OPTIONS)?;
        app.logger().user_action("menu", Some(choice.as_str()));

        let outcome = match choice.as_str() {
            LIST_PLUGINS => {
                crate::print_plugins(app);
                Ok(())
            }
            TEST_INPUT => test_input(&mut prompt),
            TEST_CHOICE => test_choice(&mut prompt),
            MANAGE_PLUGIN => manage_plugin(app, &mut prompt),
            _ => break,
        };
        match outcome {
            Err(e) if e.is_interrupt() => return Err(e),
            Err(e) => eprintln!("{} {}", style("Error:").red().bold(), e),
            Ok(()) => {}
        }
    }
    println!("Goodbye!");
    Ok(())
}

fn test_input(prompt: &mut UserPrompt) -> Result<()> {
    let answer = prompt.input("What is your name?")?;
    let name = validate_not_empty(&answer, "name")?;
    println!("Hello, {}!", style(name).green());
    Ok(())
}

fn test_choice(prompt: &mut UserPrompt) -> Result<()> {
    prompt.multi_choice("Pick a colour", &["Red", "Green", "Blue"])?;
    prompt.echo();
    Ok(())
}

fn manage_plugin(app: &mut Application, prompt: &mut UserPrompt) -> Result<()> {
    let names = app.plugins().list_names();
    if names.is_empty() {
        println!("No plugins loaded.");
        return Ok(());
    }
    let name = prompt.multi_choice("Select a plugin", &names)?;
    let action = prompt.multi_choice(&format!("What should happen to '{}'?", name), &PLUGIN_ACTIONS)?;

    match action.as_str() {
        "Run" => {
            let line = prompt.input("Arguments (space separated)")?;
            let args: Vec<String> = line.split_whitespace().map(str::to_string).collect();
            match app.plugins_mut().run(&name, &args)? {
                Some(output) => println!("{}", output),
                None => println!("{}", style("(no output)").dim()),
            }
        }
        "Reload" => {
            app.plugins_mut().reload(&name)?;
            println!("{} Reloaded '{}'", style("✓").green().bold(), name);
        }
        "Enable" => {
            app.set_plugin_enabled(&name, true)?;
            println!("{} Enabled '{}'", style("✓").green().bold(), name);
        }
        "Disable" => {
            app.set_plugin_enabled(&name, false)?;
            println!("{} Disabled '{}'", style("✓").green().bold(), name);
        }
        "Unload" => {
            if prompt.confirm(&format!("Unload '{}'?", name))? {
                app.plugins_mut().unload_by_name(&name)?;
                println!("{} Unloaded '{}'", style("✓").green().bold(), name);
            }
        }
        _ => {}
    }
    Ok(())
}
