//! Enqueue one store task per provider.

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use tracing::{error, info};
use tweetstore_platform::Task;
use tweetstore_shared::constants::CONTEXT_PARAM;

use crate::{AppState, error::ApiError};

/// Path each enqueued task calls.
pub const STORE_TASK_PATH: &str = "/store/do";

/// Response for an enqueue request.
#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    /// Providers a store task was enqueued for.
    pub enqueued: Vec<String>,
}

/// Creates the enqueue routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stores", get(enqueue_stores).post(enqueue_stores))
        .route("/stores/{*rest}", get(enqueue_stores).post(enqueue_stores))
}

async fn enqueue_stores(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let mut enqueued = Vec::new();

    for name in state.tweets.registry().names() {
        let task = Task::get(STORE_TASK_PATH).param(CONTEXT_PARAM, name);
        if let Err(e) = state.queue.add(task).await {
            error!(queue = state.queue.name(), context = name, error = %e, "Failed to enqueue store task");
            return Err(e.into());
        }
        enqueued.push(name.to_string());
    }

    info!(queue = state.queue.name(), count = enqueued.len(), "Enqueued store tasks");
    Ok(Json(EnqueueResponse { enqueued }))
}
