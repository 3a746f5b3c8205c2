//! Studio Server Client
//!
//! HTTP plumbing shared by every collaborator of the studio server: the generation
//! service, the settings store, the history gallery and the statistics endpoint.

use crate::config::ServerConfig;
use crate::error::ApiError;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

pub mod config_store;
pub mod history;
pub mod stats;

pub use config_store::ConfigStore;
pub use history::{HistoryDetail, HistoryEntry, HistoryImage, HistoryPager, HistoryStore};
pub use stats::{GlobalStats, StatsStore};

/// Cheap-to-clone handle to the studio server: one pooled HTTP client plus the API root.
#[derive(Debug, Clone)]
pub struct StudioClient {
    http: Client,
    base_url: String,
}

impl StudioClient {
    pub fn new(server: &ServerConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .no_proxy()
            .connect_timeout(server.connect_timeout())
            .timeout(server.request_timeout())
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: server.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Client with default timeouts pointed at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let server = ServerConfig {
            base_url: base_url.into(),
            ..ServerConfig::default()
        };
        Self::new(&server)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }
}

/// Map a transport-level failure (no response received).
pub(crate) fn map_send_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::Network(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ApiError::Network(format!("Connection error: {}", error))
    } else {
        ApiError::Network(format!("HTTP error: {}", error))
    }
}

/// Turn a non-2xx response into a service error.
///
/// Message preference: the server's `detail` field, then the HTTP status line.
pub(crate) async fn error_from_response(response: Response) -> ApiError {
    let status = response.status();
    let generic = format!("Server error (HTTP {})", status.as_u16());
    let body = response.text().await.unwrap_or_default();

    let message = match serde_json::from_str::<Value>(&body) {
        Ok(json) => detail_message(&json).unwrap_or(generic),
        Err(_) => match status.canonical_reason() {
            Some(reason) => format!("{}: {}", generic, reason),
            None => generic,
        },
    };
    debug!(status = status.as_u16(), message = %message, "Studio server returned an error");
    ApiError::service(Some(status.as_u16()), message)
}

/// `detail` as sent by the server; non-string details (validation lists) are rendered as JSON.
pub(crate) fn detail_message(json: &Value) -> Option<String> {
    match json.get("detail") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Null) | None => None,
        Some(Value::String(_)) => None,
        Some(other) => Some(other.to_string()),
    }
}

/// Check the status, then decode the JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    response
        .json()
        .await
        .map_err(|e| ApiError::MalformedResponse(format!("Failed to parse response: {}", e)))
}

/// Check the status only, discarding the body.
pub(crate) async fn expect_success(response: Response) -> Result<(), ApiError> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    Ok(())
}
