//! Tweet operation errors.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors from storing, listing, or clearing tweets.
#[derive(Debug, Error)]
pub enum TweetError {
    /// Fetching tweets from the source failed.
    #[error("tweet source error: {0}")]
    Source(String),

    /// Storage operation failed.
    #[error("{provider}: {source}")]
    Storage {
        /// Provider the operation ran against.
        provider: String,
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },

    /// Provider lookup or other registry-level storage failure.
    #[error(transparent)]
    Registry(#[from] StorageError),
}

impl TweetError {
    /// Create a source error.
    #[must_use]
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Attach a provider name to a storage error.
    #[must_use]
    pub fn storage(provider: impl Into<String>, source: StorageError) -> Self {
        Self::Storage {
            provider: provider.into(),
            source,
        }
    }
}
