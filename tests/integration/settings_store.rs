//! Settings persistence through the config endpoint and the auto-saver.

use super::test_utils::studio;
use genstudio::settings::{AutoSaver, GenerationMode, SaveStatus, StudioSettings};
use genstudio::studio::ConfigStore;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_null_config_loads_defaults() {
    let (server, client) = studio().await;
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
        .mount(&server)
        .await;

    let settings = ConfigStore::new(client).load().await.unwrap();
    assert_eq!(settings, StudioSettings::default());
}

#[tokio::test]
async fn test_loaded_settings_are_normalized() {
    let (server, client) = studio().await;
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "api_key": "abc",
            "batch_size": 0,
            "thinking_budget": 99999,
            "generation_mode": "parallel",
            "presets": [{"name": "fox", "content": "a red fox"}]
        })))
        .mount(&server)
        .await;

    let settings = ConfigStore::new(client).load().await.unwrap();
    assert_eq!(settings.api_key, "abc");
    assert_eq!(settings.batch_size, 1);
    assert_eq!(settings.thinking_budget, 30_000);
    assert_eq!(settings.generation_mode, GenerationMode::Parallel);
    assert_eq!(settings.preset("fox").map(|p| p.content.as_str()), Some("a red fox"));
}

#[tokio::test]
async fn test_autosaver_coalesces_edits_into_one_post() {
    let (server, client) = studio().await;
    Mock::given(method("POST"))
        .and(path("/api/config"))
        .and(body_partial_json(json!({"batch_size": 4, "model_name": "final"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let saver = AutoSaver::spawn(ConfigStore::new(client), Duration::from_millis(200));
    let mut settings = StudioSettings::default();
    for (batch, model) in [(2, "draft"), (3, "draft-2"), (4, "final")] {
        settings.batch_size = batch;
        settings.model_name = model.to_string();
        saver.touch(settings.clone()).unwrap();
    }
    saver.flush().await.unwrap();
    assert_eq!(saver.status(), SaveStatus::Synced);
    saver.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_autosaver_reports_failed_save() {
    let (server, client) = studio().await;
    Mock::given(method("POST"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "disk full"})))
        .mount(&server)
        .await;

    let saver = AutoSaver::spawn(ConfigStore::new(client), Duration::from_millis(200));
    saver.touch(StudioSettings::default()).unwrap();
    let err = saver.flush().await.unwrap_err();
    assert_eq!(err.unit_message(), "disk full");
    assert!(matches!(saver.status(), SaveStatus::Failed(_)));
}

#[tokio::test]
async fn test_config_with_null_numbers_loads() {
    let (server, client) = studio().await;
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "api_key": "abc",
            "batch_size": null,
            "retry_count": null,
            "thinking_budget": null,
            "top_p": null
        })))
        .mount(&server)
        .await;

    let settings = ConfigStore::new(client).load().await.unwrap();
    assert_eq!(settings.api_key, "abc");
    assert_eq!(settings.batch_size, 1);
    assert_eq!(settings.retry_count, 0);
    assert_eq!(settings.thinking_budget, 2048);
    assert_eq!(settings.top_p, 0.95);
}

#[tokio::test]
async fn test_stats_with_null_total_cost() {
    let (server, client) = studio().await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success_count": 0,
            "failed_count": 0,
            "total_cost": null
        })))
        .mount(&server)
        .await;

    let stats = genstudio::studio::StatsStore::new(client).fetch().await.unwrap();
    assert_eq!(stats.cost, 0.0);
    assert_eq!(stats.display_cost(), "$0.0000");
}
