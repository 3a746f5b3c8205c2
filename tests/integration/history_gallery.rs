//! History gallery: paging, detail, deletion and archive import.

use super::test_utils::studio;
use genstudio::error::ApiError;
use genstudio::studio::{HistoryPager, HistoryStore};
use serde_json::json;
use wiremock::matchers::{header_regex, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn records(ids: std::ops::Range<i64>) -> serde_json::Value {
    let items: Vec<_> = ids
        .map(|id| {
            json!({
                "id": id,
                "timestamp": "2026-03-01T12:00:00",
                "prompt": format!("prompt {}", id),
                "images": [{"path": format!("/outputs/{}.png", id), "filename": format!("{}.png", id)}]
            })
        })
        .collect();
    json!(items)
}

#[tokio::test]
async fn test_pager_advances_by_returned_count_until_empty() {
    let (server, client) = studio().await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records(0..3)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .and(query_param("offset", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records(3..5)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .and(query_param("offset", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let mut pager = HistoryPager::new(HistoryStore::new(client), 3);
    assert_eq!(pager.next_page().await.unwrap().len(), 3);
    assert_eq!(pager.offset(), 3);
    let second = pager.next_page().await.unwrap();
    assert_eq!(second.len(), 2);
    assert_eq!(second[0].id, 3);
    assert_eq!(pager.offset(), 5);
    assert!(!pager.is_exhausted());
    assert!(pager.next_page().await.unwrap().is_empty());
    assert!(pager.is_exhausted());
    assert!(pager.next_page().await.unwrap().is_empty());

    pager.reset();
    assert_eq!(pager.offset(), 0);
    assert!(!pager.is_exhausted());
}

#[tokio::test]
async fn test_detail_and_missing_record() {
    let (server, client) = studio().await;
    Mock::given(method("GET"))
        .and(path("/api/history/8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 8,
            "timestamp": 1767225600,
            "prompt": "a lighthouse",
            "images": [],
            "text": "Thinking about light",
            "refImages": [{"path": "/refs/1.png"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/history/9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found"})))
        .mount(&server)
        .await;

    let store = HistoryStore::new(client);
    let detail = store.detail(8).await.unwrap();
    assert_eq!(detail.entry.id, 8);
    assert_eq!(detail.text.as_deref(), Some("Thinking about light"));
    assert_eq!(detail.ref_images.len(), 1);
    assert!(detail.thought_images.is_empty());

    let err = store.detail(9).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_record() {
    let (server, client) = studio().await;
    Mock::given(method("DELETE"))
        .and(path("/api/history/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    HistoryStore::new(client).delete(4).await.unwrap();
}

#[tokio::test]
async fn test_import_zip_uploads_multipart_archive() {
    let (server, client) = studio().await;
    Mock::given(method("POST"))
        .and(path("/api/import_zip"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "count": 6
        })))
        .expect(1)
        .mount(&server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let archive = temp.path().join("history_export.zip");
    std::fs::write(&archive, b"PK\x03\x04 not really a zip").unwrap();

    let count = HistoryStore::new(client).import_zip(&archive).await.unwrap();
    assert_eq!(count, 6);
}

#[tokio::test]
async fn test_import_zip_reports_server_rejection() {
    let (server, client) = studio().await;
    Mock::given(method("POST"))
        .and(path("/api/import_zip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "detail": "Archive is missing history.json"
        })))
        .mount(&server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let archive = temp.path().join("broken.zip");
    std::fs::write(&archive, b"PK").unwrap();

    let err = HistoryStore::new(client).import_zip(&archive).await.unwrap_err();
    assert_eq!(err.unit_message(), "Archive is missing history.json");
}

#[tokio::test]
async fn test_import_zip_missing_file_is_io_error() {
    let (_server, client) = studio().await;
    let err = HistoryStore::new(client)
        .import_zip(std::path::Path::new("/definitely/not/here.zip"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Io(_)));
}
