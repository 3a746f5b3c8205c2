//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, HistoryCommands, PresetCommands, SettingsCommands};
pub use presentation::{
    format_batch_event, format_history_detail_json, format_history_detail_text,
    format_history_list_json, format_history_list_text, format_preset_list,
    format_settings_json, format_settings_text, format_stats_json, format_stats_text,
    format_summary_json, format_summary_text,
};
pub use route::RunContext;
