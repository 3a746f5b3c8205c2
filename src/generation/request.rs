//! Generation request payload sent verbatim to `POST /generate`.

use crate::error::ApiError;
use crate::settings::{ApiFormat, SafetySettings, StudioSettings, MAX_THINKING_BUDGET};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Maximum number of reference images the server accepts per request.
pub const MAX_REFERENCE_IMAGES: usize = 14;

/// The payload of one generation unit. Every unit of a batch sends the same payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    #[serde(rename = "apiKey")]
    pub api_key: String,
    pub model: String,
    pub prompt: String,
    pub api_format: ApiFormat,
    pub api_base_url: String,
    #[serde(rename = "aspectRatio", skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(rename = "imageSize")]
    pub image_size: String,
    /// The server produces one image per call; batches are fanned out client-side.
    #[serde(rename = "batchSize")]
    pub batch_size: u32,
    /// `data:<mime>;base64,...` URLs
    #[serde(rename = "refImages", default)]
    pub ref_images: Vec<String>,
    pub temperature: f32,
    #[serde(rename = "topP")]
    pub top_p: f32,

    pub include_thoughts: bool,
    pub thinking_budget: u32,
    pub include_safety_settings: bool,
    pub safety_settings: SafetySettings,

    pub jailbreak_enabled: bool,
    pub system_instruction_method: String,
    pub system_prompt: String,
    pub forged_response: String,
}

impl GenerationRequest {
    /// Build the payload from stored settings and the prompt at hand.
    pub fn from_settings(
        settings: &StudioSettings,
        prompt: impl Into<String>,
        ref_images: Vec<String>,
    ) -> Self {
        let aspect_ratio = Some(settings.aspect_ratio.trim())
            .filter(|ratio| !ratio.is_empty())
            .map(str::to_string);
        Self {
            api_key: settings.api_key.clone(),
            model: settings.model_name.clone(),
            prompt: prompt.into(),
            api_format: settings.api_format,
            api_base_url: settings.api_base_url.clone(),
            aspect_ratio,
            image_size: settings.image_size.clone(),
            batch_size: 1,
            ref_images,
            temperature: settings.temperature,
            top_p: settings.top_p,
            include_thoughts: settings.include_thoughts,
            thinking_budget: settings.thinking_budget.min(MAX_THINKING_BUDGET),
            include_safety_settings: settings.include_safety_settings,
            safety_settings: settings.safety_settings.clone(),
            jailbreak_enabled: settings.jailbreak_enabled,
            system_instruction_method: settings.system_instruction_method.clone(),
            system_prompt: settings.system_prompt.clone(),
            forged_response: settings.forged_response.clone(),
        }
    }

    /// Reject requests that can never succeed. Runs before any unit is issued.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.api_key.trim().is_empty() {
            return Err(ApiError::Validation("API key is required".to_string()));
        }
        if self.prompt.trim().is_empty() {
            return Err(ApiError::Validation("Prompt is required".to_string()));
        }
        if self.ref_images.len() > MAX_REFERENCE_IMAGES {
            return Err(ApiError::Validation(format!(
                "At most {} reference images are allowed, got {}",
                MAX_REFERENCE_IMAGES,
                self.ref_images.len()
            )));
        }
        Ok(())
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Encode raw image bytes as a data URL.
pub fn encode_data_url(path: &Path, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_for(path), STANDARD.encode(bytes))
}

/// Read reference images from disk and encode them for the request.
pub async fn load_reference_images(paths: &[PathBuf]) -> Result<Vec<String>, ApiError> {
    if paths.len() > MAX_REFERENCE_IMAGES {
        return Err(ApiError::Validation(format!(
            "At most {} reference images are allowed, got {}",
            MAX_REFERENCE_IMAGES,
            paths.len()
        )));
    }
    let mut encoded = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ApiError::Validation(format!(
                "Cannot read reference image {}: {}",
                path.display(),
                e
            ))
        })?;
        encoded.push(encode_data_url(path, &bytes));
    }
    Ok(encoded)
}
