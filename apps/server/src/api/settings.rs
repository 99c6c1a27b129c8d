use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use kioskfeed_core::normalizer::ContentFormat;
use serde::Serialize;

use crate::main_lib::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayConfigResponse {
    pub display_seconds: u64,
    pub poll_interval_seconds: u64,
    pub content_format: ContentFormat,
}

async fn get_display_config(State(state): State<Arc<AppState>>) -> Json<DisplayConfigResponse> {
    let display = &state.display;
    Json(DisplayConfigResponse {
        display_seconds: display.display_seconds,
        poll_interval_seconds: display.poll_interval_seconds,
        content_format: display.content_format,
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/config", get(get_display_config))
}
