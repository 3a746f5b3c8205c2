//! Generate command presentation: live progress lines and the final summary.

use crate::generation::{BatchEvent, Summary};
use crate::settings::GenerationMode;
use crate::studio::stats::format_cost;
use crate::studio::GlobalStats;
use owo_colors::OwoColorize;
use serde_json::json;

/// One progress line per event, or `None` for events that print nothing.
pub fn format_batch_event(event: &BatchEvent) -> Option<String> {
    match event {
        BatchEvent::BatchStarted { total, mode } => Some(match mode {
            GenerationMode::Parallel => format!("Generating {} image(s) in parallel...", total),
            GenerationMode::Sequential => format!("Generating {} image(s) one by one...", total),
        }),
        BatchEvent::UnitStarted {
            unit_index,
            progress,
        } => Some(format!(
            "  [{}/{}] started",
            unit_index + 1,
            progress.total
        )),
        BatchEvent::UnitSucceeded {
            unit_index,
            output,
            progress,
        } => {
            let mut line = format!(
                "  [{}/{}] {} (done {})",
                unit_index + 1,
                progress.total,
                "ok".green(),
                progress
            );
            if let Some(id) = output.record_id() {
                line.push_str(&format!(" record #{}", id));
            }
            if let Some(cost) = output.cost() {
                line.push_str(&format!(" {}", format_cost(cost)));
            }
            for path in output.image_paths() {
                line.push_str(&format!("\n      {}", path));
            }
            Some(line)
        }
        BatchEvent::UnitFailed {
            unit_index,
            message,
            progress,
            ..
        } => Some(format!(
            "  [{}/{}] {}: {}",
            unit_index + 1,
            progress.total,
            "failed".red(),
            message
        )),
        BatchEvent::BatchCompleted { .. } => None,
    }
}

pub fn format_summary_text(summary: &Summary, stats: Option<&GlobalStats>) -> String {
    let mut output = format!(
        "Batch complete: {} succeeded, {} failed (cost {})",
        summary.succeeded,
        summary.failed,
        format_cost(summary.accumulated_cost)
    );
    if let Some(report) = summary.error_report() {
        output.push_str(&format!("\n\n{}\n{}", "Errors:".red().bold(), report));
    }
    if let Some(stats) = stats {
        output.push_str(&format!(
            "\n\nTotals: {} succeeded, {} failed, spent {}",
            stats.success,
            stats.failed,
            stats.display_cost()
        ));
    }
    output
}

pub fn format_summary_json(summary: &Summary, stats: Option<&GlobalStats>) -> String {
    let out = json!({
        "summary": summary,
        "stats": stats,
    });
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
}
