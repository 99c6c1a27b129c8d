use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub store_size: usize,
    pub store_capacity: usize,
    pub subscribers: usize,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

/// Liveness plus store occupancy, for operators.
async fn get_health(State(state): State<Arc<AppState>>) -> ApiResult<Json<HealthResponse>> {
    let stats = state.ingest_service.stats()?;
    Ok(Json(HealthResponse {
        status: "ok",
        store_size: stats.size,
        store_capacity: stats.capacity,
        subscribers: state.event_bus.subscriber_count(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}
