//! Deployment errors.

use thiserror::Error;

/// Result alias for deployment operations.
pub type DeployResult<T> = Result<T, DeployError>;

/// Deployment errors.
#[derive(Debug, Error)]
pub enum DeployError {
    /// The application did not reach its desired instance count in time.
    #[error("Application '{app}' not started after {checks} checks")]
    Timeout {
        /// Application name.
        app: String,
        /// Number of status checks performed.
        checks: u32,
    },

    /// The application was in a state deploy cannot act on.
    #[error("Unexpected application state '{0}'")]
    UnexpectedState(String),

    /// A caller-supplied argument was rejected.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation was called out of order.
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// The hosting platform rejected a request.
    #[error("Platform API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error detail from the response.
        message: String,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive error.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}
