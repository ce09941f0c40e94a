//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - The store, list, enqueue, and clear routes
//! - The internal-token middleware
//! - Mapping of domain errors to JSON error responses

pub mod error;
pub mod middleware;
pub mod routes;

#[cfg(test)]
mod test_support;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tweetstore_core::tweets::{TweetService, TweetSource};
use tweetstore_platform::TaskQueue;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Tweet operations over every configured provider.
    pub tweets: Arc<TweetService>,
    /// Source of mentions to store.
    pub source: Arc<dyn TweetSource>,
    /// Queue that delivers per-provider store requests.
    pub queue: Arc<dyn TaskQueue>,
    /// Shared secret required on internal endpoints, if set.
    pub internal_token: Option<Arc<str>>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::app_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
