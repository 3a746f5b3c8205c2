//! CLI command-name contract used for log fields.

use crate::cli::parse::{Commands, HistoryCommands, PresetCommands, SettingsCommands};

/// Command name string for logging (e.g. "history.list", "generate").
pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::Generate { .. } => "generate".to_string(),
        Commands::History { command } => format!("history.{}", history_command_name(command)),
        Commands::Stats { .. } => "stats".to_string(),
        Commands::Settings { command } => format!("settings.{}", settings_command_name(command)),
        Commands::Preset { command } => format!("preset.{}", preset_command_name(command)),
        Commands::Translate { .. } => "translate".to_string(),
    }
}

pub fn history_command_name(command: &HistoryCommands) -> &'static str {
    match command {
        HistoryCommands::List { .. } => "list",
        HistoryCommands::Show { .. } => "show",
        HistoryCommands::Delete { .. } => "delete",
        HistoryCommands::Import { .. } => "import",
    }
}

pub fn settings_command_name(command: &SettingsCommands) -> &'static str {
    match command {
        SettingsCommands::Show { .. } => "show",
        SettingsCommands::Set { .. } => "set",
    }
}

pub fn preset_command_name(command: &PresetCommands) -> &'static str {
    match command {
        PresetCommands::List => "list",
        PresetCommands::Add { .. } => "add",
        PresetCommands::Edit { .. } => "edit",
        PresetCommands::Delete { .. } => "delete",
    }
}
