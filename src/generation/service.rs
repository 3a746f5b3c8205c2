//! Generation service: the server endpoints that produce images and translate thoughts.

use crate::error::ApiError;
use crate::generation::request::GenerationRequest;
use crate::studio::{detail_message, error_from_response, map_send_error, read_json, StudioClient};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// Placeholder the gallery shows for records without text output.
pub const NO_TEXT_OUTPUT: &str = "(no text output)";

/// Result payload of one successful unit (`data` of the response envelope).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationOutput {
    pub data: Value,
}

impl GenerationOutput {
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    /// Declared cost. Non-numeric values are ignored.
    pub fn cost(&self) -> Option<f64> {
        self.data.get("cost").and_then(Value::as_f64)
    }

    /// History record id assigned by the server.
    pub fn record_id(&self) -> Option<i64> {
        self.data.get("id").and_then(Value::as_i64)
    }

    /// Paths of the produced images.
    pub fn image_paths(&self) -> Vec<&str> {
        self.data
            .get("images")
            .and_then(Value::as_array)
            .map(|images| {
                images
                    .iter()
                    .filter_map(|img| img.get("path").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct GenerateEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Value,
    #[serde(flatten)]
    rest: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    translated: Option<String>,
}

/// External collaborator that performs one generation per call.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Run one unit. Non-2xx, malformed bodies and `success: false` are all errors.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutput, ApiError>;

    /// Translate a model's thinking text.
    async fn translate_thought(
        &self,
        text: &str,
        api_key: &str,
        model: &str,
    ) -> Result<String, ApiError>;
}

/// [`GenerationService`] backed by the studio server.
#[derive(Debug, Clone)]
pub struct HttpGenerationService {
    client: StudioClient,
}

impl HttpGenerationService {
    pub fn new(client: StudioClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GenerationService for HttpGenerationService {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutput, ApiError> {
        let response = self
            .client
            .http()
            .post(self.client.url("generate"))
            .json(request)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(response).await);
        }

        let body = response.text().await.map_err(map_send_error)?;
        let envelope: GenerateEnvelope = serde_json::from_str(&body).map_err(|e| {
            ApiError::MalformedResponse(format!("Failed to parse generation response: {}", e))
        })?;
        if !envelope.success {
            let message = detail_message(&Value::Object(envelope.rest))
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(ApiError::service(Some(status.as_u16()), message));
        }
        let output = GenerationOutput::new(envelope.data);
        debug!(record_id = output.record_id(), "Generation unit succeeded");
        Ok(output)
    }

    async fn translate_thought(
        &self,
        text: &str,
        api_key: &str,
        model: &str,
    ) -> Result<String, ApiError> {
        let response = self
            .client
            .http()
            .post(self.client.url("translate_thought"))
            .json(&json!({
                "text": text,
                "apiKey": api_key,
                "model": model,
            }))
            .send()
            .await
            .map_err(map_send_error)?;
        let parsed: TranslateResponse = read_json(response).await?;
        parsed
            .translated
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::service(None, "Translation failed"))
    }
}

/// Translate `text` unless it is empty or the no-output placeholder.
pub async fn translate_if_present<S: GenerationService + ?Sized>(
    service: &S,
    text: &str,
    api_key: &str,
    model: &str,
) -> Result<Option<String>, ApiError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == NO_TEXT_OUTPUT {
        return Ok(None);
    }
    service
        .translate_thought(text, api_key, model)
        .await
        .map(Some)
}
