//! CLI parse: clap types for GenStudio. No behavior; definitions only.

use crate::settings::GenerationMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// GenStudio CLI - batch image generation against a studio server
#[derive(Parser)]
#[command(name = "genstudio")]
#[command(about = "Batch image generation, history and settings for a GenStudio server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Studio server API root (overrides config), e.g. http://127.0.0.1:8000/api
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Enable verbose logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a batch of images
    Generate {
        /// Prompt text
        #[arg(long, short)]
        prompt: Option<String>,
        /// Use a saved preset's content as the prompt
        #[arg(long, conflicts_with = "prompt")]
        preset: Option<String>,
        /// Number of images (defaults to the saved batch size)
        #[arg(long, short = 'n')]
        count: Option<usize>,
        /// sequential or parallel (defaults to the saved mode)
        #[arg(long)]
        mode: Option<GenerationMode>,
        /// Reference image (repeatable, at most 14)
        #[arg(long = "ref", value_name = "FILE")]
        refs: Vec<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Browse and manage generation history
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Show lifetime generation statistics
    Stats {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show or edit the server-side generation settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Manage prompt presets
    Preset {
        #[command(subcommand)]
        command: PresetCommands,
    },
    /// Translate the thinking output of a history record
    Translate {
        /// History record id
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List records, newest first
    List {
        /// Number of pages to load
        #[arg(long, default_value = "1")]
        pages: usize,
        /// Load every page
        #[arg(long, conflicts_with = "pages")]
        all: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show one record in full
    Show {
        id: i64,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Delete a record and its files
    Delete {
        id: i64,
        /// Skip confirmation
        #[arg(long, short)]
        yes: bool,
    },
    /// Import a previously exported history archive (.zip)
    Import { file: PathBuf },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show the current settings
    Show {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Edit settings: KEY=VALUE pairs, e.g. `batch_size=4 generation_mode=parallel`
    Set {
        #[arg(required = true, value_name = "KEY=VALUE")]
        pairs: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum PresetCommands {
    /// List presets
    List,
    /// Save a prompt as a preset
    Add {
        /// Prompt content
        content: String,
        /// Preset name (defaults to the start of the content)
        #[arg(long)]
        name: Option<String>,
    },
    /// Rename or rewrite a preset
    Edit {
        /// Position shown by `preset list` (1-based)
        index: usize,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete a preset
    Delete {
        /// Position shown by `preset list` (1-based)
        index: usize,
        /// Skip confirmation
        #[arg(long, short)]
        yes: bool,
    },
}
