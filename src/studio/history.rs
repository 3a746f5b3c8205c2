//! History gallery: paginated listing, detail, delete and archive import.

use crate::error::ApiError;
use crate::studio::{detail_message, expect_success, map_send_error, read_json, StudioClient};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

const PROMPT_PREVIEW_CHARS: usize = 60;

/// One image file produced (or referenced) by a generation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryImage {
    pub path: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
}

/// Gallery card as returned by `GET /history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    /// Server timestamps arrive either as RFC 3339 text or epoch milliseconds.
    #[serde(default)]
    pub timestamp: Value,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub images: Vec<HistoryImage>,
}

impl HistoryEntry {
    /// Prompt shortened for list views.
    pub fn prompt_preview(&self) -> String {
        let prompt = self.prompt.as_deref().unwrap_or("");
        if prompt.is_empty() {
            return "(no description)".to_string();
        }
        if prompt.chars().count() > PROMPT_PREVIEW_CHARS {
            let head: String = prompt.chars().take(PROMPT_PREVIEW_CHARS).collect();
            format!("{}...", head)
        } else {
            prompt.to_string()
        }
    }

    /// Timestamp in local time, or the raw value when it cannot be parsed.
    pub fn display_timestamp(&self) -> String {
        match parse_timestamp(&self.timestamp) {
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => match &self.timestamp {
                Value::Null => "-".to_string(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        }
    }

    /// Thumbnail (or full image) of the first output, if any.
    pub fn cover(&self) -> Option<&str> {
        self.images
            .first()
            .map(|img| img.thumb.as_deref().unwrap_or(&img.path))
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Local>> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Local.timestamp_millis_opt(ms).single()),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|ts| ts.with_timezone(&Local))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .and_then(|naive| Local.from_local_datetime(&naive).single())
            }),
        _ => None,
    }
}

/// Full record as returned by `GET /history/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryDetail {
    #[serde(flatten)]
    pub entry: HistoryEntry,
    /// Model text output (thinking process)
    #[serde(default)]
    pub text: Option<String>,
    #[serde(rename = "refImages", default)]
    pub ref_images: Vec<HistoryImage>,
    #[serde(rename = "thoughtImages", default)]
    pub thought_images: Vec<HistoryImage>,
}

#[derive(Debug, Deserialize)]
struct ImportResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    count: u64,
    #[serde(flatten)]
    rest: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    client: StudioClient,
}

impl HistoryStore {
    pub fn new(client: StudioClient) -> Self {
        Self { client }
    }

    /// One page of records, newest first.
    pub async fn list(&self, limit: usize, offset: usize) -> Result<Vec<HistoryEntry>, ApiError> {
        let response = self
            .client
            .http()
            .get(self.client.url("history"))
            .query(&[("limit", limit), ("offset", offset)])
            .send()
            .await
            .map_err(map_send_error)?;
        read_json(response).await
    }

    pub async fn detail(&self, id: i64) -> Result<HistoryDetail, ApiError> {
        let response = self
            .client
            .http()
            .get(self.client.url(&format!("history/{}", id)))
            .send()
            .await
            .map_err(map_send_error)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("history record {}", id)));
        }
        read_json(response).await
    }

    /// Delete a record and its files on the server.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let response = self
            .client
            .http()
            .delete(self.client.url(&format!("history/{}", id)))
            .send()
            .await
            .map_err(map_send_error)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("history record {}", id)));
        }
        expect_success(response).await?;
        info!(record_id = id, "History record deleted");
        Ok(())
    }

    /// Upload a previously exported history archive. Returns the number of imported records.
    pub async fn import_zip(&self, archive: &Path) -> Result<u64, ApiError> {
        let bytes = tokio::fs::read(archive).await?;
        let file_name = archive
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "history.zip".to_string());
        debug!(archive = %archive.display(), size = bytes.len(), "Uploading history archive");

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/zip")
            .map_err(|e| ApiError::Validation(format!("Invalid archive part: {}", e)))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .http()
            .post(self.client.url("import_zip"))
            .multipart(form)
            .send()
            .await
            .map_err(map_send_error)?;
        let parsed: ImportResponse = read_json(response).await?;
        if !parsed.success {
            let message = detail_message(&Value::Object(parsed.rest))
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(ApiError::service(None, message));
        }
        info!(count = parsed.count, "History archive imported");
        Ok(parsed.count)
    }
}

/// Offset-based cursor over the history gallery.
///
/// The offset advances by the number of records actually returned, so records
/// created while paging do not cause skipped entries at the end.
#[derive(Debug, Clone)]
pub struct HistoryPager {
    store: HistoryStore,
    page_size: usize,
    offset: usize,
    exhausted: bool,
}

impl HistoryPager {
    pub fn new(store: HistoryStore, page_size: usize) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
            offset: 0,
            exhausted: false,
        }
    }

    /// Fetch the next page. An empty page marks the pager exhausted.
    pub async fn next_page(&mut self) -> Result<Vec<HistoryEntry>, ApiError> {
        if self.exhausted {
            return Ok(Vec::new());
        }
        let items = self.store.list(self.page_size, self.offset).await?;
        if items.is_empty() {
            self.exhausted = true;
        } else {
            self.offset += items.len();
        }
        Ok(items)
    }

    /// Start over from the newest record.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.exhausted = false;
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
