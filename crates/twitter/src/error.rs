//! Twitter client errors.

use thiserror::Error;
use tweetstore_core::tweets::TweetError;

/// Result alias for Twitter operations.
pub type TwitterResult<T> = Result<T, TwitterError>;

/// Twitter client errors.
#[derive(Error, Debug)]
pub enum TwitterError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// OAuth signature generation failed
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// Twitter API returned a non-success status
    #[error("Twitter API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error detail or title from the response body.
        message: String,
    },

    /// Missing or invalid settings
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<TwitterError> for TweetError {
    fn from(err: TwitterError) -> Self {
        TweetError::fetch(err.to_string())
    }
}
