//! Internal-request middleware for store, enqueue, and clear routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;
use tweetstore_shared::{AppError, constants::INTERNAL_TOKEN_HEADER};

use crate::{AppState, error::ApiError};

/// Rejects requests that do not carry the configured internal token.
///
/// Only the cron and the task queue know the token. Without a configured
/// token every request passes.
pub async fn require_internal_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.internal_token.as_deref() else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(INTERNAL_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok());

    if provided.is_some_and(|token| constant_time_eq(token.as_bytes(), expected.as_bytes())) {
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Rejected request without internal token");
    ApiError(AppError::Unauthorized(format!(
        "{INTERNAL_TOKEN_HEADER} header is required"
    )))
    .into_response()
}

/// Compare two byte strings without short-circuiting on the first mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use rstest::rstest;

    use super::constant_time_eq;
    use crate::test_support::{TOKEN, TestApp};

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"s3cret", b"s3cret"));
        assert!(!constant_time_eq(b"s3cret", b"s3creT"));
        assert!(!constant_time_eq(b"s3cret", b"s3cret!"));
        assert!(!constant_time_eq(b"", b"s3cret"));
    }

    #[rstest]
    #[case::store("GET", "/store/do")]
    #[case::store_post("POST", "/store")]
    #[case::enqueue("GET", "/stores/do")]
    #[case::clear("GET", "/clear/do")]
    #[case::clear_post("POST", "/clear?context=transient")]
    #[tokio::test]
    async fn test_internal_routes_reject_missing_or_wrong_token(
        #[case] method: &str,
        #[case] uri: &str,
    ) {
        let app = TestApp::new();

        let (status, body) = app.send(method, uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "UNAUTHORIZED");

        let (status, _) = app.send(method, uri, Some("s3cre")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app.send(method, uri, Some(TOKEN)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[rstest]
    #[case("/tweets")]
    #[case("/health")]
    #[tokio::test]
    async fn test_public_routes_need_no_token(#[case] uri: &str) {
        let app = TestApp::new();

        let (status, _) = app.send("GET", uri, None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
