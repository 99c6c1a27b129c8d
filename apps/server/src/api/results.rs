use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use kioskfeed_core::AnalysisResult;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

/// Pull fallback: the most recent result, or 404 when nothing is stored.
async fn get_latest_result(State(state): State<Arc<AppState>>) -> ApiResult<Json<AnalysisResult>> {
    state
        .ingest_service
        .latest()?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn get_recent_results(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<AnalysisResult>>> {
    Ok(Json(state.ingest_service.recent()?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/result/latest", get(get_latest_result))
        .route("/api/last", get(get_latest_result))
        .route("/result/recent", get(get_recent_results))
}
