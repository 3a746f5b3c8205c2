//! Batch orchestration end to end over HTTP.

use super::test_utils::{request, settings_with_key, studio};
use genstudio::error::ApiError;
use genstudio::generation::{
    BatchEvent, BatchOrchestrator, GenerationRequest, HttpGenerationService,
};
use genstudio::settings::{GenerationMode, StudioSettings};
use genstudio::studio::{GlobalStats, StatsStore};
use parking_lot::Mutex;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn ok_body(id: i64, cost: f64) -> serde_json::Value {
    json!({
        "success": true,
        "data": {"id": id, "cost": cost, "images": [{"path": format!("/outputs/{}.png", id)}]}
    })
}

#[tokio::test]
async fn test_sequential_batch_continues_after_failure() {
    let (server, client) = studio().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(1, 0.04)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"detail": "Model overloaded"})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(3, 0.04)))
        .mount(&server)
        .await;

    let events = Mutex::new(Vec::new());
    let recorder = |event: &BatchEvent| events.lock().push(event.clone());

    let orchestrator = BatchOrchestrator::new(HttpGenerationService::new(client));
    let summary = orchestrator
        .run(&request("a red fox"), 3, GenerationMode::Sequential, &recorder)
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert!((summary.accumulated_cost - 0.08).abs() < 1e-9);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].unit_index, 1);
    assert_eq!(summary.errors[0].message, "Model overloaded");

    let events = events.into_inner();
    assert_eq!(events.len(), 1 + 3 * 2 + 1);
    assert!(matches!(
        events[4],
        BatchEvent::UnitFailed {
            unit_index: 1,
            status: Some(503),
            ..
        }
    ));
    assert!(matches!(events.last(), Some(BatchEvent::BatchCompleted { .. })));
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_parallel_batch_starts_every_unit_before_any_finishes() {
    let (server, client) = studio().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ok_body(7, 0.045))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(4)
        .mount(&server)
        .await;

    let events = Mutex::new(Vec::new());
    let recorder = |event: &BatchEvent| events.lock().push(event.clone());

    let orchestrator = BatchOrchestrator::new(HttpGenerationService::new(client));
    let summary = orchestrator
        .run(&request("a red fox"), 4, GenerationMode::Parallel, &recorder)
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 4);
    assert_eq!(summary.failed, 0);
    assert!((summary.accumulated_cost - 0.18).abs() < 1e-9);

    let events = events.into_inner();
    assert!(events[1..5]
        .iter()
        .all(|e| matches!(e, BatchEvent::UnitStarted { .. })));
    match &events[4] {
        BatchEvent::UnitStarted { progress, .. } => {
            assert_eq!(progress.waiting, 0);
            assert_eq!(progress.processing, 4);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_parallel_failures_are_collected_in_the_summary() {
    let (server, client) = studio().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "boom"})))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(9, 0.01)))
        .mount(&server)
        .await;

    let orchestrator = BatchOrchestrator::new(HttpGenerationService::new(client));
    let summary = orchestrator
        .run(&request("a red fox"), 5, GenerationMode::Parallel, &())
        .await
        .unwrap();

    assert_eq!(summary.succeeded + summary.failed, 5);
    assert_eq!(summary.failed, 2);
    assert!(summary.errors.iter().all(|e| e.message == "boom"));
    assert!((summary.accumulated_cost - 0.03).abs() < 1e-9);
    let report = summary.error_report().unwrap();
    assert_eq!(report.lines().count(), 2);
}

#[tokio::test]
async fn test_single_unit_without_json_error_body_reports_status() {
    let (server, client) = studio().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&server)
        .await;

    let summary = BatchOrchestrator::new(HttpGenerationService::new(client))
        .run(&request("a red fox"), 1, GenerationMode::Sequential, &())
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.accumulated_cost, 0.0);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].unit_index, 0);
    assert!(
        summary.errors[0].message.contains("500"),
        "{}",
        summary.errors[0].message
    );
}

#[tokio::test]
async fn test_missing_api_key_aborts_before_any_request() {
    let (server, client) = studio().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(1, 0.01)))
        .expect(0)
        .mount(&server)
        .await;

    let settings = StudioSettings::default();
    let request = GenerationRequest::from_settings(&settings, "a red fox", Vec::new());
    let orchestrator = BatchOrchestrator::new(HttpGenerationService::new(client));
    let err = orchestrator
        .run(&request, 2, GenerationMode::Parallel, &())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn test_summary_merges_into_server_totals() {
    let (server, client) = studio().await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success_count": 10,
            "failed_count": 1,
            "total_cost": 0.5
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(11, 0.25)))
        .mount(&server)
        .await;

    let mut stats: GlobalStats = StatsStore::new(client.clone()).fetch().await.unwrap();
    let request = GenerationRequest::from_settings(&settings_with_key(), "fox", Vec::new());
    let summary = BatchOrchestrator::new(HttpGenerationService::new(client))
        .run(&request, 2, GenerationMode::Sequential, &())
        .await
        .unwrap();
    stats.merge(&summary);

    assert_eq!(stats.success, 12);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.display_cost(), "$1.0000");
}
