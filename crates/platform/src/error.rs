//! Task queue errors.

use thiserror::Error;

/// Errors from enqueueing or delivering tasks.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The queue was destroyed.
    #[error("task queue '{0}' is closed")]
    Closed(String),

    /// The request could not be sent.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The application answered with a non-success status.
    #[error("delivery of {path} failed with status {status}")]
    Delivery {
        /// Task path.
        path: String,
        /// HTTP status code.
        status: u16,
    },
}
