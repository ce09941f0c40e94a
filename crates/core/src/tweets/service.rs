//! Storing, listing, and clearing tweets across every provider.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{error, info};
use tweetstore_shared::constants::SENDER_NAME;

use super::error::TweetError;
use super::mapper::StatusMapper;
use super::source::TweetSource;
use super::types::{StoredTweetStatus, Tweet};
use crate::storage::{Blob, ProviderContext, ProviderRegistry};

/// Tweet operations over the provider registry and one shared container.
pub struct TweetService {
    registry: Arc<ProviderRegistry>,
    container: String,
}

impl TweetService {
    /// Create a tweet service.
    #[must_use]
    pub fn new(registry: Arc<ProviderRegistry>, container: impl Into<String>) -> Self {
        Self {
            registry,
            container: container.into(),
        }
    }

    /// The container tweets are stored in.
    #[must_use]
    pub fn container(&self) -> &str {
        &self.container
    }

    /// The provider registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Fetch mentions once and store them in one provider, or in all of them.
    ///
    /// Returns the number of tweets stored per provider.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown provider, a failed fetch, or the first
    /// failed storage operation.
    pub async fn store_from(
        &self,
        source: &dyn TweetSource,
        provider: Option<&str>,
    ) -> Result<BTreeMap<String, usize>, TweetError> {
        let contexts = self.registry.select(provider)?;
        let tweets = source.fetch_mentions().await?;

        let mut stored = BTreeMap::new();
        for ctx in contexts {
            let count = self.store_tweets(ctx, &tweets).await?;
            stored.insert(ctx.name().to_string(), count);
        }
        Ok(stored)
    }

    /// Store tweets as blobs in one provider, creating the container if needed.
    ///
    /// # Errors
    ///
    /// Returns the first failed storage operation.
    pub async fn store_tweets(
        &self,
        ctx: &ProviderContext,
        tweets: &[Tweet],
    ) -> Result<usize, TweetError> {
        let store = ctx.store();
        store
            .create_container(&self.container)
            .await
            .map_err(|e| TweetError::storage(ctx.name(), e))?;

        for tweet in tweets {
            let blob = Blob::builder(tweet.id.clone())
                .user_metadata(SENDER_NAME, tweet.sender.clone())
                .payload(tweet.text.clone())
                .build();
            store
                .put_blob(&self.container, blob)
                .await
                .map_err(|e| TweetError::storage(ctx.name(), e))?;
        }

        info!(
            provider = ctx.name(),
            container = %self.container,
            count = tweets.len(),
            "Stored tweets"
        );
        Ok(tweets.len())
    }

    /// Status records for every stored tweet, ordered by provider then blob id.
    ///
    /// Providers whose container is missing contribute nothing; listing failures
    /// are logged and skipped.
    pub async fn statuses(&self) -> Vec<StoredTweetStatus> {
        let mut statuses = Vec::new();
        for ctx in self.registry.contexts() {
            statuses.extend(self.statuses_for(ctx).await);
        }
        statuses
    }

    async fn statuses_for(&self, ctx: &ProviderContext) -> Vec<StoredTweetStatus> {
        let store = ctx.store();

        let listing = match store.container_exists(&self.container).await {
            Ok(false) => return Vec::new(),
            Ok(true) => store.list(&self.container).await,
            Err(e) => Err(e),
        };
        let blobs = match listing {
            Ok(blobs) => blobs,
            Err(e) => {
                error!(
                    provider = ctx.name(),
                    container = %self.container,
                    error = %e,
                    "Error listing container"
                );
                return Vec::new();
            }
        };

        let mapper = StatusMapper::new(
            Arc::clone(store),
            ctx.name(),
            ctx.host(),
            self.container.clone(),
        );
        let mut statuses = Vec::with_capacity(blobs.len());
        for blob in &blobs {
            statuses.push(mapper.apply(blob).await);
        }
        statuses
    }

    /// Remove every stored tweet from one provider, or from all of them.
    ///
    /// Returns the number of blobs removed per provider.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown provider or the first failed clear.
    pub async fn clear(&self, provider: Option<&str>) -> Result<BTreeMap<String, usize>, TweetError> {
        let mut cleared = BTreeMap::new();
        for ctx in self.registry.select(provider)? {
            let removed = ctx
                .store()
                .clear_container(&self.container)
                .await
                .map_err(|e| TweetError::storage(ctx.name(), e))?;
            info!(provider = ctx.name(), removed, "Cleared tweets");
            cleared.insert(ctx.name().to_string(), removed);
        }
        Ok(cleared)
    }
}
