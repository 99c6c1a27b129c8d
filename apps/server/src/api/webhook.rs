use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    middleware,
    routing::post,
    Json, Router,
};
use kioskfeed_core::ingest::IngestOutcome;
use serde::Serialize;
use serde_json::{Map, Value};
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::GlobalKeyExtractor, GovernorLayer,
};

use crate::{
    auth::require_webhook_token,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub success: bool,
    pub analysis_id: String,
    pub message: String,
    pub fallback: bool,
}

impl From<&IngestOutcome> for WebhookResponse {
    fn from(outcome: &IngestOutcome) -> Self {
        let message = if outcome.fallback {
            "Analysis received; stored with fallback values"
        } else {
            "Analysis received and stored"
        };
        Self {
            success: true,
            analysis_id: outcome.result.id.clone(),
            message: message.to_string(),
            fallback: outcome.fallback,
        }
    }
}

/// Decodes a JSON or form-encoded body into an untyped value.
///
/// Only encoding errors fail here; whether the value fits the schema is the
/// normalizer's concern.
pub fn parse_body(headers: &HeaderMap, body: &[u8]) -> ApiResult<Value> {
    let is_form = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    if is_form {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| ApiError::BadRequest(format!("Malformed form body: {e}")))?;
        let object: Map<String, Value> = pairs
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        return Ok(Value::Object(object));
    }

    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("Malformed JSON body: {e}")))
}

async fn receive_result(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookResponse>> {
    let payload = parse_body(&headers, &body)?;
    let outcome = state.ingest_service.ingest(&payload)?;

    if outcome.fallback {
        tracing::warn!(
            analysis_id = %outcome.result.id,
            issues = outcome.issues.len(),
            "Webhook payload stored via fallback"
        );
    } else {
        tracing::info!(analysis_id = %outcome.result.id, "Webhook payload stored");
    }

    Ok(Json(WebhookResponse::from(&outcome)))
}

pub fn router(state: Arc<AppState>, rate_per_min: u32) -> anyhow::Result<Router<Arc<AppState>>> {
    let limit = rate_per_min.max(1);
    let governor = GovernorConfigBuilder::default()
        .key_extractor(GlobalKeyExtractor)
        .per_millisecond((60_000 / u64::from(limit)).max(1))
        .burst_size(limit)
        .finish()
        .ok_or_else(|| anyhow!("Invalid webhook rate limit: {rate_per_min}/min"))?;

    Ok(Router::new()
        .route("/webhook/result", post(receive_result))
        .route("/api/webhook/v1/result", post(receive_result))
        .route_layer(middleware::from_fn_with_state(state, require_webhook_token))
        .route_layer(GovernorLayer::new(Arc::new(governor)))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn content_type(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn json_body_is_decoded() {
        let value = parse_body(&content_type("application/json"), br#"{"score": 5}"#).unwrap();
        assert_eq!(value["score"], 5);
    }

    #[test]
    fn json_is_the_default_encoding() {
        let value = parse_body(&HeaderMap::new(), b"[1, 2]").unwrap();
        assert!(value.is_array());
    }

    #[test]
    fn form_body_becomes_a_string_map() {
        let headers = content_type("application/x-www-form-urlencoded; charset=utf-8");
        let value = parse_body(&headers, b"company_name=Bakker+%26+Zn&score=42").unwrap();
        assert_eq!(value["company_name"], "Bakker & Zn");
        assert_eq!(value["score"], "42");
    }

    #[test]
    fn malformed_json_is_a_bad_request() {
        let err = parse_body(&HeaderMap::new(), b"{not json").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
