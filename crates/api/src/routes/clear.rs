//! Clear the tweet container in one or all providers.

use axum::{
    Json, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use tracing::{error, info};

use super::ContextQuery;
use crate::{AppState, error::ApiError};

/// Response for a clear request.
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    /// Providers whose container was cleared.
    pub cleared: Vec<String>,
}

/// Creates the clear routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clear", get(clear_tweets).post(clear_tweets))
        .route("/clear/{*rest}", get(clear_tweets).post(clear_tweets))
}

async fn clear_tweets(
    State(state): State<AppState>,
    Query(query): Query<ContextQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let context = query.context.as_deref();

    match state.tweets.clear(context).await {
        Ok(removed) => {
            info!(context = ?context, blobs = removed.values().sum::<usize>(), "Cleared tweets");
            Ok(Json(ClearResponse {
                cleared: removed.into_keys().collect(),
            }))
        }
        Err(e) => {
            error!(context = ?context, error = %e, "Failed to clear tweets");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_support::{TestApp, TOKEN};

    #[tokio::test]
    async fn test_clear_empties_listing() {
        let app = TestApp::new();
        app.send("GET", "/store/do", Some(TOKEN)).await;

        let (status, body) = app.send("GET", "/clear/do", Some(TOKEN)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cleared"], serde_json::json!(["filesystem", "transient"]));

        let (_, listing) = app.send("GET", "/tweets", None).await;
        assert_eq!(listing, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_clear_one_context() {
        let app = TestApp::new();
        app.send("GET", "/store/do", Some(TOKEN)).await;

        let (status, body) = app
            .send("GET", "/clear?context=filesystem", Some(TOKEN))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cleared"], serde_json::json!(["filesystem"]));

        let (_, listing) = app.send("GET", "/tweets", None).await;
        let services: Vec<&str> = listing
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|r| r["service"].as_str())
            .collect();
        assert_eq!(services, vec!["transient", "transient"]);
    }

    #[tokio::test]
    async fn test_clear_unknown_context() {
        let app = TestApp::new();

        let (status, _) = app.send("GET", "/clear?context=nope", Some(TOKEN)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_clear_without_token_keeps_tweets() {
        let app = TestApp::new();
        app.send("GET", "/store/do", Some(TOKEN)).await;

        let (status, body) = app.send("GET", "/clear/do", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "UNAUTHORIZED");

        let (_, listing) = app.send("GET", "/tweets", None).await;
        assert_eq!(listing.as_array().unwrap().len(), 4);
    }
}
