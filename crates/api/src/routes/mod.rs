//! Route definitions.

use axum::{Router, middleware};
use serde::Deserialize;

use crate::{AppState, middleware::require_internal_token};

pub mod clear;
pub mod health;
pub mod store;
pub mod stores;
pub mod tweets;

/// Query parameters shared by routes that act on one provider or all of them.
#[derive(Debug, Default, Deserialize)]
pub struct ContextQuery {
    /// Provider name. Every provider when absent.
    #[serde(default)]
    pub context: Option<String>,
}

/// Creates the application router; internal routes are guarded by the token middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn app_routes_with_state(state: AppState) -> Router<AppState> {
    let internal_routes = Router::new()
        .merge(store::routes())
        .merge(stores::routes())
        .merge(clear::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_internal_token,
        ));

    Router::new()
        .merge(health::routes())
        .merge(tweets::routes())
        .merge(internal_routes)
}
