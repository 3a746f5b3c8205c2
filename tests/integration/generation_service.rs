//! HTTP generation service: envelope handling and error mapping.

use super::test_utils::{request, studio};
use genstudio::error::ApiError;
use genstudio::generation::{translate_if_present, GenerationService, HttpGenerationService};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_generate_sends_one_image_payload_and_returns_data() {
    let (server, client) = studio().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "apiKey": "test-key",
            "prompt": "a red fox",
            "batchSize": 1,
            "refImages": []
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "id": 42,
                "cost": 0.039,
                "images": [{"path": "/outputs/42_0.png", "filename": "42_0.png"}]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = HttpGenerationService::new(client);
    let output = service.generate(&request("a red fox")).await.unwrap();
    assert_eq!(output.record_id(), Some(42));
    assert_eq!(output.cost(), Some(0.039));
    assert_eq!(output.image_paths(), vec!["/outputs/42_0.png"]);
}

#[tokio::test]
async fn test_error_detail_is_reported_verbatim() {
    let (server, client) = studio().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({"detail": "Quota exceeded"})),
        )
        .mount(&server)
        .await;

    let service = HttpGenerationService::new(client);
    let err = service.generate(&request("a red fox")).await.unwrap_err();
    assert_eq!(err.status(), Some(429));
    assert_eq!(err.unit_message(), "Quota exceeded");
}

#[tokio::test]
async fn test_non_json_error_body_falls_back_to_status() {
    let (server, client) = studio().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>boom</html>"))
        .mount(&server)
        .await;

    let service = HttpGenerationService::new(client);
    let err = service.generate(&request("a red fox")).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(err.unit_message().contains("500"), "{}", err.unit_message());
}

#[tokio::test]
async fn test_success_false_is_a_service_error() {
    let (server, client) = studio().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "detail": "Prompt blocked by safety filter"
        })))
        .mount(&server)
        .await;

    let service = HttpGenerationService::new(client);
    let err = service.generate(&request("a red fox")).await.unwrap_err();
    assert!(matches!(err, ApiError::Service { .. }));
    assert_eq!(err.unit_message(), "Prompt blocked by safety filter");
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    let client = genstudio::studio::StudioClient::with_base_url("http://127.0.0.1:1/api").unwrap();
    let service = HttpGenerationService::new(client);
    let err = service.generate(&request("a red fox")).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "{:?}", err);
}

#[tokio::test]
async fn test_translate_skips_placeholder_and_calls_server_otherwise() {
    let (server, client) = studio().await;
    Mock::given(method("POST"))
        .and(path("/api/translate_thought"))
        .and(body_partial_json(json!({"text": "thinking...", "model": "flash"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"translated": "思考中..."})))
        .expect(1)
        .mount(&server)
        .await;

    let service = HttpGenerationService::new(client);
    let skipped = translate_if_present(&service, "(no text output)", "k", "flash")
        .await
        .unwrap();
    assert_eq!(skipped, None);
    let translated = translate_if_present(&service, "thinking...", "k", "flash")
        .await
        .unwrap();
    assert_eq!(translated.as_deref(), Some("思考中..."));
}
