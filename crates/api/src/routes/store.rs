//! Store tweets: fetch mentions once and write them to one or all providers.

use std::collections::BTreeMap;

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

/// Response for a store request.
#[derive(Debug, Serialize)]
pub struct StoreResponse {
    /// Number of tweets stored, per provider.
    pub stored: BTreeMap<String, usize>,
}

/// Creates the store routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/store", get(store_tweets).post(store_tweets))
        .route("/store/{*rest}", get(store_tweets).post(store_tweets))
}

async fn store_tweets(
    State(state): State<AppState>,
    Query(query): Query<ContextQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let context = query.context.as_deref();

    match state.tweets.store_from(state.source.as_ref(), context).await {
        Ok(stored) => {
            info!(context = ?context, providers = stored.len(), "Stored mentions");
            Ok(Json(StoreResponse { stored }))
        }
        Err(e) => {
            error!(context = ?context, error = %e, "Failed to store tweets");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_support::{TestApp, TOKEN};

    #[tokio::test]
    async fn test_store_all_providers() {
        let app = TestApp::new();

        let (status, body) = app.send("GET", "/store/do", Some(TOKEN)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stored"]["transient"], 2);
        assert_eq!(body["stored"]["filesystem"], 2);
    }

    #[tokio::test]
    async fn test_store_one_context() {
        let app = TestApp::new();

        let (status, body) = app
            .send("POST", "/store/do?context=transient", Some(TOKEN))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stored"].as_object().map(|m| m.len()), Some(1));
    }

    #[tokio::test]
    async fn test_store_unknown_context() {
        let app = TestApp::new();

        let (status, body) = app.send("GET", "/store?context=nope", Some(TOKEN)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_store_source_failure() {
        let app = TestApp::with_failing_source();

        let (status, body) = app.send("GET", "/store/do", Some(TOKEN)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["message"],
            "External service error: Twitter API error 503: Service Unavailable"
        );
    }

    #[tokio::test]
    async fn test_store_requires_token() {
        let app = TestApp::new();

        let (status, body) = app.send("GET", "/store/do", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "UNAUTHORIZED");

        let (status, _) = app.send("GET", "/store/do", Some("wrong")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
