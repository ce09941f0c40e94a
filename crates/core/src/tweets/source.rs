//! Contract for the social-media client that supplies tweets.

use async_trait::async_trait;

use super::error::TweetError;
use super::types::Tweet;

/// Source of recent tweets to store.
///
/// Implemented by the Twitter crate; tests use in-memory fixtures.
#[async_trait]
pub trait TweetSource: Send + Sync {
    /// Fetch the account's recent mentions.
    async fn fetch_mentions(&self) -> Result<Vec<Tweet>, TweetError>;
}

/// Fixed list of tweets. Useful for demos and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTweetSource {
    tweets: Vec<Tweet>,
}

impl StaticTweetSource {
    /// Serve the given tweets on every fetch.
    #[must_use]
    pub fn new(tweets: Vec<Tweet>) -> Self {
        Self { tweets }
    }
}

#[async_trait]
impl TweetSource for StaticTweetSource {
    async fn fetch_mentions(&self) -> Result<Vec<Tweet>, TweetError> {
        Ok(self.tweets.clone())
    }
}
