//! Conversion of domain errors into HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tweetstore_core::storage::StorageError;
use tweetstore_core::tweets::TweetError;
use tweetstore_platform::QueueError;
use tweetstore_shared::AppError;

/// An [`AppError`] rendered as `{"error": CODE, "message": ...}`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": self.0.to_string(),
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<TweetError> for ApiError {
    fn from(err: TweetError) -> Self {
        let app = match err {
            TweetError::Registry(StorageError::UnknownProvider(name)) => {
                AppError::NotFound(format!("unknown context '{name}'"))
            }
            TweetError::Source(msg) => AppError::ExternalService(msg),
            other => AppError::Storage(other.to_string()),
        };
        Self(app)
    }
}

impl From<QueueError> for ApiError {
    fn from(err: QueueError) -> Self {
        Self(AppError::ExternalService(err.to_string()))
    }
}
