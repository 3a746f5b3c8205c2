//! Settings persistence on the studio server (`GET/POST /config`).

use crate::error::ApiError;
use crate::settings::{SettingsSink, StudioSettings};
use crate::studio::{expect_success, map_send_error, read_json, StudioClient};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ConfigStore {
    client: StudioClient,
}

impl ConfigStore {
    pub fn new(client: StudioClient) -> Self {
        Self { client }
    }

    /// Fetch the stored settings. A `null` document means nothing was saved yet.
    pub async fn load(&self) -> Result<StudioSettings, ApiError> {
        let response = self
            .client
            .http()
            .get(self.client.url("config"))
            .send()
            .await
            .map_err(map_send_error)?;
        let value: Value = read_json(response).await?;
        if value.is_null() {
            return Ok(StudioSettings::default());
        }
        let mut settings: StudioSettings = serde_json::from_value(value)
            .map_err(|e| ApiError::MalformedResponse(format!("Invalid settings document: {}", e)))?;
        settings.normalize();
        Ok(settings)
    }

    /// Replace the stored settings with `settings`.
    pub async fn save(&self, settings: &StudioSettings) -> Result<(), ApiError> {
        let mut settings = settings.clone();
        settings.normalize();
        let response = self
            .client
            .http()
            .post(self.client.url("config"))
            .json(&settings)
            .send()
            .await
            .map_err(map_send_error)?;
        expect_success(response).await?;
        debug!("Settings stored on server");
        Ok(())
    }
}

#[async_trait]
impl SettingsSink for ConfigStore {
    async fn save(&self, settings: &StudioSettings) -> Result<(), ApiError> {
        ConfigStore::save(self, settings).await
    }
}
