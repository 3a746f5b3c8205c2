//! Settings, preset and stats presentation.

use crate::error::ApiError;
use crate::settings::{Preset, StudioSettings};
use crate::studio::GlobalStats;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::Value;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    match chars.len() {
        0 => "(not set)".to_string(),
        n if n <= 8 => "*".repeat(n),
        n => format!(
            "{}...{}",
            chars[..4].iter().collect::<String>(),
            chars[n - 4..].iter().collect::<String>()
        ),
    }
}

/// Settings as a key/value table with the API key masked.
pub fn format_settings_text(settings: &StudioSettings) -> Result<String, ApiError> {
    let mut shown = settings.clone();
    shown.api_key = mask_key(&settings.api_key);
    let value = serde_json::to_value(&shown)
        .map_err(|e| ApiError::ConfigError(format!("Failed to render settings: {}", e)))?;

    let mut table = Table::new();
    table.set_header(vec!["Key", "Value"]);
    if let Value::Object(fields) = value {
        for (key, field) in fields {
            match field {
                Value::Object(nested) => {
                    for (inner, v) in nested {
                        table.add_row(vec![format!("{}.{}", key, inner), render_scalar(&v)]);
                    }
                }
                Value::Array(items) => {
                    table.add_row(vec![key, format!("{} item(s)", items.len())]);
                }
                other => {
                    table.add_row(vec![key, render_scalar(&other)]);
                }
            }
        }
    }
    Ok(format!("{}\n\n{}", format_section_heading("Settings"), table))
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) if s.is_empty() => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn format_settings_json(settings: &StudioSettings) -> String {
    let mut shown = settings.clone();
    shown.api_key = mask_key(&settings.api_key);
    serde_json::to_string_pretty(&shown).unwrap_or_else(|_| "{}".to_string())
}

pub fn format_preset_list(presets: &[Preset]) -> String {
    if presets.is_empty() {
        return "No presets saved.\n\nUse 'genstudio preset add' to save one.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["#", "Name", "Content"]);
    for (i, preset) in presets.iter().enumerate() {
        let content: String = if preset.content.chars().count() > 60 {
            format!("{}...", preset.content.chars().take(60).collect::<String>())
        } else {
            preset.content.clone()
        };
        table.add_row(vec![(i + 1).to_string(), preset.name.clone(), content]);
    }
    table.to_string()
}

pub fn format_stats_text(stats: &GlobalStats) -> String {
    format!(
        "{}\n  Succeeded: {}\n  Failed:    {}\n  Spent:     {}",
        format_section_heading("Generation statistics"),
        stats.success.green(),
        stats.failed.red(),
        stats.display_cost()
    )
}

pub fn format_stats_json(stats: &GlobalStats) -> String {
    serde_json::to_string_pretty(stats).unwrap_or_else(|_| "{}".to_string())
}
