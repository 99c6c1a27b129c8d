use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use kioskfeed_core::{
    errors::Error as CoreError,
    ingest::{IngestOutcome, IngestServiceTrait, StoreStats},
    normalizer::ContentFormat,
    AnalysisResult, Result as CoreResult,
};
use kioskfeed_server::{
    api::app_router, build_state, config::Config, events::EventBus, AppState, DisplaySettings,
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "KIOSK_WEBHOOK_TOKEN" => Some("secret".to_string()),
        "KIOSK_STORE_CAPACITY" => Some("2".to_string()),
        "KIOSK_DISPLAY_SECONDS" => Some("20".to_string()),
        _ => None,
    })
    .unwrap()
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn payload(company: &str) -> Value {
    json!({
        "company_name": company,
        "vacancy_title": "Kok",
        "ideal_candidate_image_url": "https://img.example/a.png",
        "tips": ["Noem salaris"]
    })
}

#[tokio::test]
async fn latest_is_404_until_something_is_stored() {
    let config = test_config();
    let state = build_state(&config).unwrap();
    let app = app_router(state.clone(), &config).unwrap();

    let (status, body) = get(&app, "/result/latest").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);

    let first = state.ingest_service.ingest(&payload("A")).unwrap();
    let (status, body) = get(&app, "/result/latest").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], first.result.id.as_str());

    let second = state.ingest_service.ingest(&payload("B")).unwrap();
    let (_, body) = get(&app, "/api/last").await;
    assert_eq!(body["id"], second.result.id.as_str());
}

#[tokio::test]
async fn recent_returns_the_bounded_window_in_order() {
    let config = test_config();
    let state = build_state(&config).unwrap();
    let app = app_router(state.clone(), &config).unwrap();

    for company in ["A", "B", "C"] {
        state.ingest_service.ingest(&payload(company)).unwrap();
    }

    let (status, body) = get(&app, "/result/recent").await;
    assert_eq!(status, StatusCode::OK);
    let companies: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|result| result["companyName"].as_str().unwrap())
        .collect();
    assert_eq!(companies, vec!["B", "C"]);
}

#[tokio::test]
async fn health_reports_store_occupancy() {
    let config = test_config();
    let state = build_state(&config).unwrap();
    let app = app_router(state.clone(), &config).unwrap();
    state.ingest_service.ingest(&payload("A")).unwrap();

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storeSize"], 1);
    assert_eq!(body["storeCapacity"], 2);
    assert_eq!(body["subscribers"], 0);
}

#[tokio::test]
async fn display_config_is_exposed() {
    let config = test_config();
    let state = build_state(&config).unwrap();
    let app = app_router(state, &config).unwrap();

    let (status, body) = get(&app, "/api/config").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["displaySeconds"], 20);
    assert_eq!(body["pollIntervalSeconds"], 10);
    assert_eq!(body["contentFormat"], "html");
}

/// Ingest service whose store is unusable.
struct BrokenIngestService;

impl IngestServiceTrait for BrokenIngestService {
    fn ingest(&self, _body: &Value) -> CoreResult<IngestOutcome> {
        Err(CoreError::StoreUnavailable("lock poisoned".into()))
    }

    fn latest(&self) -> CoreResult<Option<AnalysisResult>> {
        Err(CoreError::StoreUnavailable("lock poisoned".into()))
    }

    fn recent(&self) -> CoreResult<Vec<AnalysisResult>> {
        Err(CoreError::StoreUnavailable("lock poisoned".into()))
    }

    fn stats(&self) -> CoreResult<StoreStats> {
        Err(CoreError::StoreUnavailable("lock poisoned".into()))
    }
}

#[tokio::test]
async fn internal_failures_are_generic_500s() {
    let config = test_config();
    let state = Arc::new(AppState {
        ingest_service: Arc::new(BrokenIngestService),
        event_bus: EventBus::new(4),
        webhook_token: "secret".to_string(),
        display: DisplaySettings {
            display_seconds: 15,
            poll_interval_seconds: 10,
            content_format: ContentFormat::Html,
        },
        push_ping_interval: std::time::Duration::from_secs(20),
        started_at: std::time::Instant::now(),
    });
    let app = app_router(state, &config).unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook/result")
                .header("authorization", "Bearer secret")
                .header("content-type", "application/json")
                .body(Body::from(payload("A").to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Internal server error");

    let (status, _) = get(&app, "/result/latest").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
