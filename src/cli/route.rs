//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::command_name;
use crate::cli::parse::{Commands, HistoryCommands, PresetCommands, SettingsCommands};
use crate::cli::presentation::{
    format_batch_event, format_history_detail_json, format_history_detail_text,
    format_history_list_json, format_history_list_text, format_preset_list,
    format_settings_json, format_settings_text, format_stats_json, format_stats_text,
    format_summary_json, format_summary_text,
};
use crate::config::GenStudioConfig;
use crate::error::ApiError;
use crate::generation::{
    load_reference_images, translate_if_present, BatchEvent, BatchOrchestrator,
    GenerationRequest, HttpGenerationService, ObserverSet, TracingObserver,
};
use crate::settings::{AutoSaver, GenerationMode, StudioSettings};
use crate::studio::{ConfigStore, HistoryPager, HistoryStore, StatsStore, StudioClient};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

/// Runtime context for CLI execution: resolved config, server client and the async runtime.
pub struct RunContext {
    config: GenStudioConfig,
    client: StudioClient,
    runtime: Runtime,
}

impl RunContext {
    pub fn new(config: GenStudioConfig) -> Result<Self, ApiError> {
        let client = StudioClient::new(&config.server)?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(ApiError::Io)?;
        Ok(Self {
            config,
            client,
            runtime,
        })
    }

    pub fn config(&self) -> &GenStudioConfig {
        &self.config
    }

    pub fn client(&self) -> &StudioClient {
        &self.client
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let name = command_name(command);
        debug!(command = %name, "Dispatching command");
        let result = self.runtime.block_on(self.dispatch(command));
        match &result {
            Ok(_) => info!(
                command = %name,
                duration_ms = started.elapsed().as_millis() as u64,
                "Command finished"
            ),
            Err(e) => warn!(command = %name, error = %e, "Command failed"),
        }
        result
    }

    async fn dispatch(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Generate {
                prompt,
                preset,
                count,
                mode,
                refs,
                format,
            } => {
                self.handle_generate(
                    prompt.as_deref(),
                    preset.as_deref(),
                    *count,
                    *mode,
                    refs,
                    format,
                )
                .await
            }
            Commands::History { command } => self.handle_history_command(command).await,
            Commands::Stats { format } => {
                let stats = StatsStore::new(self.client.clone()).fetch().await?;
                if format == "json" {
                    Ok(format_stats_json(&stats))
                } else {
                    Ok(format_stats_text(&stats))
                }
            }
            Commands::Settings { command } => self.handle_settings_command(command).await,
            Commands::Preset { command } => self.handle_preset_command(command).await,
            Commands::Translate { id } => self.handle_translate(*id).await,
        }
    }

    async fn handle_generate(
        &self,
        prompt: Option<&str>,
        preset: Option<&str>,
        count: Option<usize>,
        mode: Option<GenerationMode>,
        refs: &[PathBuf],
        format: &str,
    ) -> Result<String, ApiError> {
        let settings = ConfigStore::new(self.client.clone()).load().await?;

        let prompt = match (prompt, preset) {
            (Some(p), _) => p.to_string(),
            (None, Some(name)) => settings
                .preset(name)
                .map(|p| p.content.clone())
                .ok_or_else(|| ApiError::NotFound(format!("preset '{}'", name)))?,
            (None, None) => {
                return Err(ApiError::Validation(
                    "A prompt is required (use --prompt or --preset)".to_string(),
                ))
            }
        };
        let total = count.unwrap_or(settings.batch_size as usize);
        let mode = mode.unwrap_or(settings.generation_mode);

        let ref_images = load_reference_images(refs).await?;
        let request = GenerationRequest::from_settings(&settings, prompt, ref_images);

        // Totals are informational; a stats outage must not block generation.
        let stats = match StatsStore::new(self.client.clone()).fetch().await {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!(error = %e, "Could not load statistics");
                None
            }
        };

        let show_progress = format != "json";
        let printer = move |event: &BatchEvent| {
            if !show_progress {
                return;
            }
            if let Some(line) = format_batch_event(event) {
                eprintln!("{}", line);
            }
        };
        let tracing_observer = TracingObserver;
        let observers = ObserverSet::new()
            .with(&tracing_observer)
            .with(&printer);

        let orchestrator = BatchOrchestrator::new(HttpGenerationService::new(self.client.clone()));
        let summary = orchestrator.run(&request, total, mode, &observers).await?;

        let stats = stats.map(|mut stats| {
            stats.merge(&summary);
            stats
        });
        if format == "json" {
            Ok(format_summary_json(&summary, stats.as_ref()))
        } else {
            Ok(format_summary_text(&summary, stats.as_ref()))
        }
    }

    async fn handle_history_command(&self, command: &HistoryCommands) -> Result<String, ApiError> {
        let store = HistoryStore::new(self.client.clone());
        match command {
            HistoryCommands::List { pages, all, format } => {
                let mut pager = HistoryPager::new(store, self.config.history.page_size);
                let mut entries = Vec::new();
                let mut loaded = 0;
                while (*all || loaded < *pages) && !pager.is_exhausted() {
                    entries.extend(pager.next_page().await?);
                    loaded += 1;
                }
                let more = !pager.is_exhausted();
                if format == "json" {
                    Ok(format_history_list_json(&entries, more))
                } else {
                    Ok(format_history_list_text(&entries, more))
                }
            }
            HistoryCommands::Show { id, format } => {
                let detail = store.detail(*id).await?;
                if format == "json" {
                    Ok(format_history_detail_json(&detail))
                } else {
                    Ok(format_history_detail_text(&detail))
                }
            }
            HistoryCommands::Delete { id, yes } => {
                if !*yes && !confirm(&format!("Delete record #{} and its images?", id))? {
                    return Ok("Deletion cancelled".to_string());
                }
                store.delete(*id).await?;
                Ok(format!("Deleted record #{}", id))
            }
            HistoryCommands::Import { file } => self.handle_import(&store, file).await,
        }
    }

    async fn handle_import(&self, store: &HistoryStore, file: &Path) -> Result<String, ApiError> {
        let count = store.import_zip(file).await?;
        Ok(format!(
            "Imported {} record(s) from {}",
            count,
            file.display()
        ))
    }

    async fn handle_settings_command(
        &self,
        command: &SettingsCommands,
    ) -> Result<String, ApiError> {
        let store = ConfigStore::new(self.client.clone());
        match command {
            SettingsCommands::Show { format } => {
                let settings = store.load().await?;
                if format == "json" {
                    Ok(format_settings_json(&settings))
                } else {
                    format_settings_text(&settings)
                }
            }
            SettingsCommands::Set { pairs } => {
                let mut settings = store.load().await?;
                let mut changed = Vec::with_capacity(pairs.len());
                for pair in pairs {
                    let (key, value) = pair.split_once('=').ok_or_else(|| {
                        ApiError::Validation(format!("Expected KEY=VALUE, got '{}'", pair))
                    })?;
                    settings.set_field(key.trim(), value)?;
                    changed.push(key.trim().to_string());
                }
                settings.normalize();
                self.persist(store, settings).await?;
                Ok(format!("Updated: {}", changed.join(", ")))
            }
        }
    }

    async fn handle_preset_command(&self, command: &PresetCommands) -> Result<String, ApiError> {
        let store = ConfigStore::new(self.client.clone());
        let mut settings = store.load().await?;
        match command {
            PresetCommands::List => Ok(format_preset_list(&settings.presets)),
            PresetCommands::Add { content, name } => {
                let saved = settings.add_preset(name.as_deref(), content)?.name.clone();
                self.persist(store, settings).await?;
                Ok(format!("Saved preset '{}'", saved))
            }
            PresetCommands::Edit {
                index,
                name,
                content,
            } => {
                let position = preset_position(&settings, *index)?;
                let current = &settings.presets[position];
                let name = name.clone().unwrap_or_else(|| current.name.clone());
                let content = content.clone().unwrap_or_else(|| current.content.clone());
                settings.edit_preset(position, &name, &content)?;
                self.persist(store, settings).await?;
                Ok(format!("Updated preset #{} '{}'", index, name))
            }
            PresetCommands::Delete { index, yes } => {
                let position = preset_position(&settings, *index)?;
                let prompt = format!("Delete preset '{}'?", settings.presets[position].name);
                if !*yes && !confirm(&prompt)? {
                    return Ok("Deletion cancelled".to_string());
                }
                let removed = settings.delete_preset(position)?;
                self.persist(store, settings).await?;
                Ok(format!("Deleted preset '{}'", removed.name))
            }
        }
    }

    async fn handle_translate(&self, id: i64) -> Result<String, ApiError> {
        let settings = ConfigStore::new(self.client.clone()).load().await?;
        let detail = HistoryStore::new(self.client.clone()).detail(id).await?;
        let service = HttpGenerationService::new(self.client.clone());
        let text = detail.text.as_deref().unwrap_or_default();
        let translated = translate_if_present(
            &service,
            text,
            &settings.api_key,
            &settings.trans_model_name,
        )
        .await?;
        Ok(translated.unwrap_or_else(|| "No thinking output to translate.".to_string()))
    }

    /// Save edited settings through the auto-saver and wait for the write to land.
    async fn persist(&self, store: ConfigStore, settings: StudioSettings) -> Result<(), ApiError> {
        let saver = AutoSaver::spawn(store, self.config.autosave.delay());
        saver.touch(settings)?;
        saver.shutdown().await
    }
}

/// Map a 1-based preset number to a vector position.
fn preset_position(settings: &StudioSettings, index: usize) -> Result<usize, ApiError> {
    if index == 0 || index > settings.presets.len() {
        return Err(ApiError::NotFound(format!("preset #{}", index)));
    }
    Ok(index - 1)
}

fn confirm(prompt: &str) -> Result<bool, ApiError> {
    use dialoguer::Confirm;
    Confirm::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| ApiError::ConfigError(format!("Failed to get user input: {}", e)))
}
