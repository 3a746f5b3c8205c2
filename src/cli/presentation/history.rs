//! History command presentation: gallery list and record detail.

use crate::cli::presentation::settings::format_section_heading;
use crate::studio::{HistoryDetail, HistoryEntry};
use comfy_table::Table;
use serde_json::json;

pub fn format_history_list_text(entries: &[HistoryEntry], more: bool) -> String {
    if entries.is_empty() {
        return "No history records.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["ID", "Time", "Model", "Images", "Prompt"]);
    for entry in entries {
        table.add_row(vec![
            entry.id.to_string(),
            entry.display_timestamp(),
            entry.model.clone().unwrap_or_default(),
            entry.images.len().to_string(),
            entry.prompt_preview(),
        ]);
    }
    let mut output = table.to_string();
    output.push_str(&format!("\n\n{} record(s)", entries.len()));
    if more {
        output.push_str("; more available (use --pages or --all)");
    }
    output
}

pub fn format_history_list_json(entries: &[HistoryEntry], more: bool) -> String {
    let out = json!({ "records": entries, "total": entries.len(), "more": more });
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
}

pub fn format_history_detail_text(detail: &HistoryDetail) -> String {
    let entry = &detail.entry;
    let mut output = format!(
        "{}\n{} | {}\n",
        format_section_heading(&format!("Record #{}", entry.id)),
        entry.display_timestamp(),
        entry.model.as_deref().unwrap_or("")
    );

    output.push_str(&format!("\n{}\n", format_section_heading("Prompt")));
    output.push_str(entry.prompt.as_deref().unwrap_or(""));
    output.push('\n');

    output.push_str(&format!("\n{}\n", format_section_heading("Images")));
    if entry.images.is_empty() {
        output.push_str("  (no images generated)\n");
    }
    for image in &entry.images {
        output.push_str(&format!("  {}  {}\n", image.filename, image.path));
    }

    if !detail.ref_images.is_empty() {
        output.push_str(&format!("\n{}\n", format_section_heading("Reference images")));
        for image in &detail.ref_images {
            output.push_str(&format!("  {}\n", image.path));
        }
    }
    if !detail.thought_images.is_empty() {
        output.push_str(&format!("\n{}\n", format_section_heading("Thought drafts")));
        for image in &detail.thought_images {
            output.push_str(&format!("  {}\n", image.path));
        }
    }

    output.push_str(&format!(
        "\n{}\n",
        format_section_heading("Thinking process / output")
    ));
    match detail.text.as_deref() {
        Some(text) if !text.is_empty() => output.push_str(text),
        _ => output.push_str(crate::generation::NO_TEXT_OUTPUT),
    }
    output
}

pub fn format_history_detail_json(detail: &HistoryDetail) -> String {
    serde_json::to_string_pretty(detail).unwrap_or_else(|_| "{}".to_string())
}
