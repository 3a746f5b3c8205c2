//! Shared helpers: a mock studio server and a client pointed at it.

use genstudio::generation::GenerationRequest;
use genstudio::settings::StudioSettings;
use genstudio::studio::StudioClient;
use wiremock::MockServer;

/// Start a mock server and a client whose API root is `<mock>/api`.
pub async fn studio() -> (MockServer, StudioClient) {
    let server = MockServer::start().await;
    let client = StudioClient::with_base_url(format!("{}/api", server.uri())).unwrap();
    (server, client)
}

pub fn settings_with_key() -> StudioSettings {
    StudioSettings {
        api_key: "test-key".to_string(),
        model_name: "gemini-image".to_string(),
        ..StudioSettings::default()
    }
}

pub fn request(prompt: &str) -> GenerationRequest {
    GenerationRequest::from_settings(&settings_with_key(), prompt, Vec::new())
}
