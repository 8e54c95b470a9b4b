//! Integration tests for the HTTP collaborators
//!
//! These tests use wiremock to stand in for the bookmark API and for the
//! links being probed.

use linktide::config::{BookmarkApiConfig, ImportConfig, ProbeMethod, UserAgentConfig};
use linktide::workers::{
    build_http_client, BookmarkStore, CreateError, HttpBookmarkStore, HttpProbe, ImportWorker,
    LinkProbe, NewBookmark, ProbeResult, ValidationWorker,
};
use linktide::{run_import, run_validation, ImportStatus, LinkCandidate, RunConfig, ValidationStatus};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        client_name: "TestClient".to_string(),
        client_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
    }
}

fn api_config(server: &MockServer) -> BookmarkApiConfig {
    BookmarkApiConfig {
        base_url: format!("{}/", server.uri()),
        api_token: Some("secret".to_string()),
        timeout_ms: 2_000,
    }
}

fn bookmark(url: &str) -> NewBookmark {
    NewBookmark {
        url: url.to_string(),
        title: None,
        priority: None,
        category_ids: vec![],
        tags: vec![],
    }
}

fn probe(timeout: Duration, method: ProbeMethod) -> HttpProbe {
    HttpProbe::new(build_http_client(&user_agent(), timeout).unwrap(), method)
}

// ===== Bookmark API =====

#[tokio::test]
async fn test_create_bookmark_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bookmarks"))
        .and(header("authorization", "Bearer secret"))
        .and(body_partial_json(json!({"url": "https://example.com"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "b1",
            "title": "Example Domain"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpBookmarkStore::new(&api_config(&server), &user_agent()).unwrap();
    let created = store.create(&bookmark("https://example.com")).await.unwrap();

    assert_eq!(created.title.as_deref(), Some("Example Domain"));
}

#[tokio::test]
async fn test_create_bookmark_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bookmarks"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"error": "Bookmark already exists"})),
        )
        .mount(&server)
        .await;

    let store = HttpBookmarkStore::new(&api_config(&server), &user_agent()).unwrap();
    let result = store.create(&bookmark("https://example.com")).await;

    assert_eq!(result, Err(CreateError::Conflict));
}

#[tokio::test]
async fn test_create_bookmark_rejected_with_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bookmarks"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "Database unavailable"})),
        )
        .mount(&server)
        .await;

    let store = HttpBookmarkStore::new(&api_config(&server), &user_agent()).unwrap();
    let result = store.create(&bookmark("https://example.com")).await;

    assert_eq!(
        result,
        Err(CreateError::Rejected("Database unavailable".to_string()))
    );
}

#[tokio::test]
async fn test_list_bookmarks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bookmarks"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bookmarks": [
                {"id": "1", "url": "https://a.com", "title": "A"},
                {"id": "2", "url": "https://b.com", "lastValidated": "2024-05-01T10:00:00Z"}
            ]
        })))
        .mount(&server)
        .await;

    let store = HttpBookmarkStore::new(&api_config(&server), &user_agent()).unwrap();
    let records = store.list(2).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title.as_deref(), Some("A"));
    assert!(records[1].last_validated.is_some());
}

#[tokio::test]
async fn test_unreachable_api_is_transport_error() {
    let server = MockServer::start().await;
    let config = api_config(&server);
    drop(server);

    let store = HttpBookmarkStore::new(&config, &user_agent()).unwrap();
    let result = store.create(&bookmark("https://example.com")).await;

    assert!(matches!(result, Err(CreateError::Transport(_))));
}

#[tokio::test]
async fn test_import_run_against_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bookmarks"))
        .and(body_partial_json(json!({"url": "https://dup.example.com"})))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/bookmarks"))
        .and(body_partial_json(json!({"tags": ["imported"]})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"title": "Saved"})))
        .mount(&server)
        .await;

    let store = HttpBookmarkStore::new(&api_config(&server), &user_agent()).unwrap();
    let defaults = ImportConfig {
        priority: None,
        category_ids: vec![],
        tags: vec!["imported".to_string()],
    };
    let config = RunConfig::new(ImportWorker::new(Arc::new(store), defaults), 2, 0);

    let snapshot = run_import(
        ["one.example.com", "dup.example.com", "two.example.com"]
            .iter()
            .map(|d| LinkCandidate::new(d))
            .collect(),
        &config,
        |_| {},
    )
    .await
    .unwrap();

    let statuses: Vec<_> = snapshot.items.iter().map(|item| item.status).collect();
    assert_eq!(
        statuses,
        vec![
            ImportStatus::Success,
            ImportStatus::Duplicate,
            ImportStatus::Success
        ]
    );
    assert_eq!(snapshot.items[0].result_title.as_deref(), Some("Saved"));
}

// ===== Link probe =====

#[tokio::test]
async fn test_probe_healthy() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let result = probe(Duration::from_secs(2), ProbeMethod::Head)
        .probe(&format!("{}/ok", server.uri()))
        .await;

    assert!(matches!(
        result,
        ProbeResult::Response {
            status_code: 200,
            location: None,
            ..
        }
    ));
}

#[tokio::test]
async fn test_probe_reports_redirect_without_following() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = probe(Duration::from_secs(2), ProbeMethod::Head)
        .probe(&format!("{}/old", server.uri()))
        .await;

    match result {
        ProbeResult::Response {
            status_code,
            location,
            ..
        } => {
            assert_eq!(status_code, 301);
            assert_eq!(location, Some(format!("{}/new", server.uri())));
        }
        other => panic!("unexpected probe result: {:?}", other),
    }
}

#[tokio::test]
async fn test_probe_falls_back_to_get_when_head_refused() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/nohead"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/nohead"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let result = probe(Duration::from_secs(2), ProbeMethod::Head)
        .probe(&format!("{}/nohead", server.uri()))
        .await;

    assert!(matches!(
        result,
        ProbeResult::Response {
            status_code: 200,
            ..
        }
    ));
}

#[tokio::test]
async fn test_probe_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let result = probe(Duration::from_millis(200), ProbeMethod::Get)
        .probe(&format!("{}/slow", server.uri()))
        .await;

    assert!(matches!(result, ProbeResult::TimedOut { .. }));
}

#[tokio::test]
async fn test_validation_run_against_live_links() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/moved"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/elsewhere"))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/stuck"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let timeout = Duration::from_millis(300);
    let worker = ValidationWorker::new(Arc::new(probe(timeout, ProbeMethod::Head)), timeout);
    let config = RunConfig::new(worker, 4, 0);

    let snapshot = run_validation(
        ["/ok", "/moved", "/gone", "/stuck"]
            .iter()
            .map(|p| LinkCandidate::new(&format!("{}{}", server.uri(), p)))
            .collect(),
        &config,
        |_| {},
    )
    .await
    .unwrap();

    let statuses: Vec<_> = snapshot.items.iter().map(|item| item.status).collect();
    assert_eq!(
        statuses,
        vec![
            ValidationStatus::Healthy,
            ValidationStatus::Redirect,
            ValidationStatus::Broken,
            ValidationStatus::Timeout,
        ]
    );
    assert_eq!(
        snapshot.items[1].redirect_target,
        Some(format!("{}/elsewhere", server.uri()))
    );
    assert_eq!(snapshot.items[2].status_code, Some(404));
    assert!((snapshot.success_rate - 0.25).abs() < f64::EPSILON);
}
