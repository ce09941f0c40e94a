//! Maps stored-blob metadata to display records.

use std::sync::Arc;
use std::time::Instant;

use tracing::error;
use tweetstore_shared::constants::SENDER_NAME;

use super::types::StoredTweetStatus;
use crate::storage::{BlobMetadata, BlobStore, StorageError};

/// Turns a listed blob into a [`StoredTweetStatus`].
///
/// The blob is fetched again so the record carries its payload, sender tag, and
/// the fetch latency. A failed fetch never propagates: the record gets the error
/// message as its status and empty sender and text.
pub struct StatusMapper {
    store: Arc<dyn BlobStore>,
    service: String,
    host: String,
    container: String,
}

impl StatusMapper {
    /// Create a mapper for one provider's container.
    pub fn new(
        store: Arc<dyn BlobStore>,
        service: impl Into<String>,
        host: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self {
            store,
            service: service.into(),
            host: host.into(),
            container: container.into(),
        }
    }

    /// Build the status record for one blob.
    pub async fn apply(&self, blob_metadata: &BlobMetadata) -> StoredTweetStatus {
        let id = blob_metadata.name.clone();

        let (sender, text, status) = match self.fetch(&id).await {
            Ok((sender, text, latency_ms)) => (sender, text, format!("{latency_ms}ms")),
            Err(e) => {
                error!(
                    error = %e,
                    "Error listing container {}//{}/{}",
                    self.service, self.container, id
                );
                (String::new(), String::new(), e.to_string())
            }
        };

        StoredTweetStatus::new(
            self.service.clone(),
            self.host.clone(),
            self.container.clone(),
            id,
            sender,
            text,
            Some(status),
        )
    }

    async fn fetch(&self, id: &str) -> Result<(String, String, u128), StorageError> {
        let start = Instant::now();
        let blob = self
            .store
            .get_blob(&self.container, id)
            .await?
            .ok_or_else(|| StorageError::not_found(format!("{}/{id}", self.container)))?;
        let latency_ms = start.elapsed().as_millis();

        let sender = blob
            .metadata
            .user_metadata
            .get(SENDER_NAME)
            .cloned()
            .unwrap_or_default();
        Ok((sender, blob.payload_as_string(), latency_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Blob, TransientBlobStore};
    use async_trait::async_trait;

    async fn create_store_and_container(container: &str) -> Arc<TransientBlobStore> {
        let store = Arc::new(TransientBlobStore::new());
        store.create_container(container).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_store_tweets() {
        let container = "test1";
        let store = create_store_and_container(container).await;
        let blob = Blob::builder("1")
            .user_metadata(SENDER_NAME, "frank")
            .payload("I love beans!")
            .build();
        store.put_blob(container, blob.clone()).await.unwrap();
        let host = "localhost";
        let service = "stub";

        let mapper = StatusMapper::new(store, service, host, container);
        let result = mapper.apply(&blob.metadata).await;

        let expected = StoredTweetStatus::new(
            service,
            host,
            container,
            "1",
            "frank",
            "I love beans!",
            None,
        );

        assert_eq!(result.without_status(), expected);
        let status = result.status.expect("status should be set");
        assert!(status.ends_with("ms"), "unexpected status {status}");
    }

    #[tokio::test]
    async fn test_missing_blob_becomes_error_status() {
        let store = create_store_and_container("test1").await;
        let mapper = StatusMapper::new(store, "stub", "localhost", "test1");

        let result = mapper.apply(&BlobMetadata::named("404")).await;

        assert_eq!(result.id, "404");
        assert_eq!(result.sender, "");
        assert_eq!(result.text, "");
        assert_eq!(result.status.as_deref(), Some("blob not found: test1/404"));
    }

    #[tokio::test]
    async fn test_missing_sender_tag_is_empty() {
        let store = create_store_and_container("test1").await;
        let blob = Blob::builder("7").payload("untagged").build();
        store.put_blob("test1", blob.clone()).await.unwrap();

        let mapper = StatusMapper::new(store, "stub", "localhost", "test1");
        let result = mapper.apply(&blob.metadata).await;

        assert_eq!(result.sender, "");
        assert_eq!(result.text, "untagged");
    }

    struct FailingStore;

    #[async_trait]
    impl BlobStore for FailingStore {
        async fn container_exists(&self, _container: &str) -> Result<bool, StorageError> {
            Ok(true)
        }

        async fn create_container(&self, _container: &str) -> Result<bool, StorageError> {
            Ok(false)
        }

        async fn put_blob(&self, _container: &str, _blob: Blob) -> Result<(), StorageError> {
            Ok(())
        }

        async fn get_blob(
            &self,
            _container: &str,
            _name: &str,
        ) -> Result<Option<Blob>, StorageError> {
            Err(StorageError::operation("connection reset"))
        }

        async fn list(&self, _container: &str) -> Result<Vec<BlobMetadata>, StorageError> {
            Ok(vec![BlobMetadata::named("1")])
        }

        async fn clear_container(&self, _container: &str) -> Result<usize, StorageError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_storage_failure_is_swallowed() {
        let mapper = StatusMapper::new(Arc::new(FailingStore), "stub", "localhost", "test1");

        let result = mapper.apply(&BlobMetadata::named("1")).await;

        assert_eq!(
            result,
            StoredTweetStatus::new(
                "stub",
                "localhost",
                "test1",
                "1",
                "",
                "",
                Some("storage operation failed: connection reset".to_string()),
            )
        );
    }
}
