//! CLI presentation: text and json formatters per command family.

mod generation;
mod history;
mod settings;

pub use generation::{format_batch_event, format_summary_json, format_summary_text};
pub use history::{
    format_history_detail_json, format_history_detail_text, format_history_list_json,
    format_history_list_text,
};
pub use settings::{
    format_preset_list, format_settings_json, format_settings_text, format_stats_json,
    format_stats_text,
};
