//! List stored tweets across every provider.

use axum::{Json, Router, extract::State, routing::get};
use tracing::debug;
use tweetstore_core::tweets::StoredTweetStatus;

use crate::AppState;

/// Creates the tweet listing routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tweets", get(list_tweets))
        .route("/tweets/{*rest}", get(list_tweets))
}

/// Providers whose container is missing or unreadable contribute nothing;
/// per-blob failures show up in each record's status.
async fn list_tweets(State(state): State<AppState>) -> Json<Vec<StoredTweetStatus>> {
    let statuses = state.tweets.statuses().await;
    debug!(count = statuses.len(), "Listed stored tweets");
    Json(statuses)
}
