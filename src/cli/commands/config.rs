//! Handlers for `docsync config *` subcommands.

use crate::cli::ConfigCommands;
use crate::config::manager::ConfigManager;
use crate::config::settings::{SettingInfo, SettingKey, SettingValue};
use crate::error::Error;
use crate::fs::FileSystem;
use crate::output::Output;

pub fn execute_config_command<F: FileSystem>(
    manager: &ConfigManager<F>,
    command: ConfigCommands,
    output: &Output,
) -> Result<(), Error> {
    match command {
        ConfigCommands::Set { key, value } => {
            let key: SettingKey = key.parse()?;
            let value = SettingValue::parse_for_key(key, &value)?;
            manager.set_setting(key, &value)?;
            output.success(format!("Set {key} = {value}"));
        }
        ConfigCommands::Get { key, json } => {
            let key: SettingKey = key.parse()?;
            let value = manager.get_setting(key)?;
            if json {
                let info = SettingInfo::new(key, &value);
                // ast-grep-ignore: no-println
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                // ast-grep-ignore: no-println
                println!("{value}");
            }
        }
        ConfigCommands::Settings { json } => {
            print_settings_list(manager.list_settings()?, json, output)?;
        }
    }
    Ok(())
}

pub fn print_settings_list(
    settings: Vec<SettingInfo>,
    json: bool,
    output: &Output,
) -> Result<(), Error> {
    if json {
        // ast-grep-ignore: no-println
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }
    output.info("Available configuration settings:");
    for setting in settings {
        // ast-grep-ignore: no-println
        println!();
        // ast-grep-ignore: no-println
        println!("  {} = {}", setting.key, setting.value);
        // ast-grep-ignore: no-println
        println!(
            "    Type: {}  Default: {}",
            setting.type_name, setting.default
        );
        // ast-grep-ignore: no-println
        println!("    {}", setting.description);
    }
    Ok(())
}
