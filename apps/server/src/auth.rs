use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use constant_time_eq::constant_time_eq;

use crate::error::ApiError;
use crate::main_lib::AppState;

/// Extracts the caller's token: `Authorization: Bearer` first, then `?token=`.
pub fn extract_token(headers: &HeaderMap, query: Option<&str>) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|header| {
            let mut parts = header.splitn(2, ' ');
            match (parts.next(), parts.next()) {
                (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("Bearer") => {
                    Some(token.trim().to_string())
                }
                _ => None,
            }
        })
        .filter(|token| !token.is_empty());

    from_header.or_else(|| {
        query
            .and_then(|query| serde_urlencoded::from_str::<HashMap<String, String>>(query).ok())
            .and_then(|mut params| params.remove("token"))
            .filter(|token| !token.is_empty())
    })
}

pub fn token_matches(candidate: &str, expected: &str) -> bool {
    constant_time_eq(candidate.as_bytes(), expected.as_bytes())
}

/// Rejects webhook calls without the shared token before the body is read.
pub async fn require_webhook_token(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers(), request.uri().query())
        .ok_or_else(|| ApiError::Unauthorized("Missing webhook token".into()))?;

    if !token_matches(&token, &state.webhook_token) {
        tracing::warn!("Rejected webhook call with an invalid token");
        return Err(ApiError::Unauthorized("Invalid webhook token".into()));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(authorization: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(authorization).unwrap());
        headers
    }

    #[test]
    fn bearer_header_wins_over_query() {
        let token = extract_token(&headers("bearer from-header"), Some("token=from-query"));
        assert_eq!(token.as_deref(), Some("from-header"));
    }

    #[test]
    fn query_token_is_used_without_header() {
        let token = extract_token(&HeaderMap::new(), Some("a=1&token=s%3Dcret"));
        assert_eq!(token.as_deref(), Some("s=cret"));
    }

    #[test]
    fn other_schemes_and_blanks_are_ignored() {
        assert_eq!(extract_token(&headers("Basic abc"), None), None);
        assert_eq!(extract_token(&headers("Bearer   "), None), None);
        assert_eq!(extract_token(&HeaderMap::new(), Some("token=")), None);
    }

    #[test]
    fn comparison_is_exact() {
        assert!(token_matches("secret", "secret"));
        assert!(!token_matches("secret", "secret2"));
        assert!(!token_matches("", "secret"));
    }
}
