//! Studio settings: the generation settings document the server stores under `/config`.
//!
//! Every field defaults when absent so partially-populated documents from older
//! servers still load. Prompt presets live here too.

use crate::error::ApiError;
use serde::{Deserialize, Deserializer, Serialize};

pub mod autosave;

pub use autosave::{AutoSaver, SaveStatus, SettingsSink};

/// Upper bound of the thinking budget slider.
pub const MAX_THINKING_BUDGET: u32 = 30_000;
const DEFAULT_THINKING_BUDGET: u32 = 2048;
/// Characters of the prompt used as a preset name when none is given.
const PRESET_NAME_PREFIX_CHARS: usize = 20;

/// Request dialect the server should speak to the upstream model API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiFormat {
    #[default]
    Gemini,
    Openai,
}

impl std::str::FromStr for ApiFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gemini" => Ok(ApiFormat::Gemini),
            "openai" => Ok(ApiFormat::Openai),
            other => Err(ApiError::Validation(format!(
                "Unknown API format '{}' (expected gemini or openai)",
                other
            ))),
        }
    }
}

/// How a batch's units are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    #[default]
    Sequential,
    Parallel,
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationMode::Sequential => write!(f, "sequential"),
            GenerationMode::Parallel => write!(f, "parallel"),
        }
    }
}

impl std::str::FromStr for GenerationMode {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(GenerationMode::Sequential),
            "parallel" => Ok(GenerationMode::Parallel),
            other => Err(ApiError::Validation(format!(
                "Unknown generation mode '{}' (expected sequential or parallel)",
                other
            ))),
        }
    }
}

/// A named prompt the user can recall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub content: String,
}

fn block_none() -> String {
    "BLOCK_NONE".to_string()
}

/// Per-category harm thresholds forwarded to the model API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySettings {
    #[serde(
        rename = "HARM_CATEGORY_HARASSMENT",
        default = "block_none",
        deserialize_with = "null_as_block_none"
    )]
    pub harassment: String,
    #[serde(
        rename = "HARM_CATEGORY_HATE_SPEECH",
        default = "block_none",
        deserialize_with = "null_as_block_none"
    )]
    pub hate_speech: String,
    #[serde(
        rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        default = "block_none",
        deserialize_with = "null_as_block_none"
    )]
    pub sexually_explicit: String,
    #[serde(
        rename = "HARM_CATEGORY_DANGEROUS_CONTENT",
        default = "block_none",
        deserialize_with = "null_as_block_none"
    )]
    pub dangerous_content: String,
    #[serde(
        rename = "HARM_CATEGORY_CIVIC_INTEGRITY",
        default = "block_none",
        deserialize_with = "null_as_block_none"
    )]
    pub civic_integrity: String,
}

impl Default for SafetySettings {
    fn default() -> Self {
        Self {
            harassment: block_none(),
            hate_speech: block_none(),
            sexually_explicit: block_none(),
            dangerous_content: block_none(),
            civic_integrity: block_none(),
        }
    }
}

impl SafetySettings {
    /// Replace empty thresholds with `BLOCK_NONE`.
    fn normalize(&mut self) {
        for value in [
            &mut self.harassment,
            &mut self.hate_speech,
            &mut self.sexually_explicit,
            &mut self.dangerous_content,
            &mut self.civic_integrity,
        ] {
            if value.trim().is_empty() {
                *value = block_none();
            }
        }
    }
}

fn default_batch_size() -> u32 {
    1
}

fn default_temperature() -> f32 {
    1.0
}

fn default_top_p() -> f32 {
    0.95
}

fn default_thinking_budget() -> u32 {
    DEFAULT_THINKING_BUDGET
}

fn default_true() -> bool {
    true
}

fn default_volume() -> f32 {
    1.0
}

/// Missing and `null` both decode to `T::default()`. Stored documents carry `null`
/// wherever a numeric input was left empty.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Like [`null_as_default`] for fields whose default is not `T::default()`.
macro_rules! null_as {
    ($name:ident, $ty:ty, $default:expr) => {
        fn $name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<$ty, D::Error> {
            Ok(Option::<$ty>::deserialize(deserializer)?.unwrap_or_else($default))
        }
    };
}

null_as!(null_as_block_none, String, block_none);
null_as!(null_as_batch_size, u32, default_batch_size);
null_as!(null_as_temperature, f32, default_temperature);
null_as!(null_as_top_p, f32, default_top_p);
null_as!(null_as_thinking_budget, u32, default_thinking_budget);
null_as!(null_as_true, bool, default_true);
null_as!(null_as_volume, f32, default_volume);

/// Settings document exchanged with `GET/POST /config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioSettings {
    #[serde(default, deserialize_with = "null_as_default")]
    pub api_key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub api_base_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub api_format: ApiFormat,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub trans_model_name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub image_size: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub aspect_ratio: String,
    #[serde(default = "default_batch_size", deserialize_with = "null_as_batch_size")]
    pub batch_size: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub retry_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub generation_mode: GenerationMode,
    #[serde(default = "default_temperature", deserialize_with = "null_as_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p", deserialize_with = "null_as_top_p")]
    pub top_p: f32,

    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_volume", deserialize_with = "null_as_volume")]
    pub sound_volume: f32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub presets: Vec<Preset>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub include_thoughts: bool,
    #[serde(
        default = "default_thinking_budget",
        deserialize_with = "null_as_thinking_budget"
    )]
    pub thinking_budget: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub include_safety_settings: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub safety_settings: SafetySettings,

    #[serde(default, deserialize_with = "null_as_default")]
    pub jailbreak_enabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub system_instruction_method: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub system_prompt: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub forged_response: String,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: String::new(),
            api_format: ApiFormat::default(),
            model_name: String::new(),
            trans_model_name: String::new(),
            image_size: String::new(),
            aspect_ratio: String::new(),
            batch_size: default_batch_size(),
            retry_count: 0,
            generation_mode: GenerationMode::default(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            sound_enabled: true,
            sound_volume: default_volume(),
            presets: Vec::new(),
            include_thoughts: false,
            thinking_budget: default_thinking_budget(),
            include_safety_settings: false,
            safety_settings: SafetySettings::default(),
            jailbreak_enabled: false,
            system_instruction_method: String::new(),
            system_prompt: String::new(),
            forged_response: String::new(),
        }
    }
}

impl StudioSettings {
    /// Clamp values into the ranges the server accepts.
    pub fn normalize(&mut self) {
        self.thinking_budget = self.thinking_budget.min(MAX_THINKING_BUDGET);
        self.batch_size = self.batch_size.max(1);
        self.sound_volume = self.sound_volume.clamp(0.0, 1.0);
        self.safety_settings.normalize();
    }

    /// Assign one field from its wire name and a string value (as typed on the CLI).
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), ApiError> {
        match key {
            "api_key" => self.api_key = value.to_string(),
            "api_base_url" => self.api_base_url = value.to_string(),
            "api_format" => self.api_format = value.parse()?,
            "model_name" => self.model_name = value.to_string(),
            "trans_model_name" => self.trans_model_name = value.to_string(),
            "image_size" => self.image_size = value.to_string(),
            "aspect_ratio" => self.aspect_ratio = value.to_string(),
            "batch_size" => self.batch_size = parse_number(key, value)?,
            "retry_count" => self.retry_count = parse_number(key, value)?,
            "generation_mode" => self.generation_mode = value.parse()?,
            "temperature" => self.temperature = parse_number(key, value)?,
            "top_p" => self.top_p = parse_number(key, value)?,
            "sound_enabled" => self.sound_enabled = parse_bool(key, value)?,
            "sound_volume" => self.sound_volume = parse_number(key, value)?,
            "include_thoughts" => self.include_thoughts = parse_bool(key, value)?,
            "thinking_budget" => self.thinking_budget = parse_number(key, value)?,
            "include_safety_settings" => self.include_safety_settings = parse_bool(key, value)?,
            "jailbreak_enabled" => self.jailbreak_enabled = parse_bool(key, value)?,
            "system_instruction_method" => self.system_instruction_method = value.to_string(),
            "system_prompt" => self.system_prompt = value.to_string(),
            "forged_response" => self.forged_response = value.to_string(),
            "safety.harassment" => self.safety_settings.harassment = value.to_string(),
            "safety.hate_speech" => self.safety_settings.hate_speech = value.to_string(),
            "safety.sexually_explicit" => {
                self.safety_settings.sexually_explicit = value.to_string()
            }
            "safety.dangerous_content" => {
                self.safety_settings.dangerous_content = value.to_string()
            }
            "safety.civic_integrity" => self.safety_settings.civic_integrity = value.to_string(),
            other => {
                return Err(ApiError::Validation(format!(
                    "Unknown settings key '{}'",
                    other
                )))
            }
        }
        self.normalize();
        Ok(())
    }

    /// Append a preset. Without a name the first characters of the content are used.
    pub fn add_preset(&mut self, name: Option<&str>, content: &str) -> Result<&Preset, ApiError> {
        if content.is_empty() {
            return Err(ApiError::Validation(
                "Preset content cannot be empty".to_string(),
            ));
        }
        let name = match name.map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            Some(_) => {
                return Err(ApiError::Validation(
                    "Preset name cannot be empty".to_string(),
                ))
            }
            None => content.chars().take(PRESET_NAME_PREFIX_CHARS).collect(),
        };
        self.presets.push(Preset {
            name,
            content: content.to_string(),
        });
        Ok(&self.presets[self.presets.len() - 1])
    }

    /// Replace the preset at `index`.
    pub fn edit_preset(&mut self, index: usize, name: &str, content: &str) -> Result<(), ApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation(
                "Preset name cannot be empty".to_string(),
            ));
        }
        let preset = self
            .presets
            .get_mut(index)
            .ok_or_else(|| ApiError::NotFound(format!("preset #{}", index)))?;
        preset.name = name.to_string();
        preset.content = content.to_string();
        Ok(())
    }

    pub fn delete_preset(&mut self, index: usize) -> Result<Preset, ApiError> {
        if index >= self.presets.len() {
            return Err(ApiError::NotFound(format!("preset #{}", index)));
        }
        Ok(self.presets.remove(index))
    }

    /// Find a preset by exact name.
    pub fn preset(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::Validation(format!("'{}' expects a number, got '{}'", key, value)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ApiError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ApiError::Validation(format!(
            "'{}' expects true or false, got '{}'",
            key, value
        ))),
    }
}
