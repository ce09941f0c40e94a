//! In-process blob store for the `transient` provider and for tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::blob::{Blob, BlobMetadata, BlobStore, validate_name};
use super::error::StorageError;

type Containers = HashMap<String, BTreeMap<String, Blob>>;

/// Memory-backed [`BlobStore`]. Keeps user metadata like a real provider.
#[derive(Debug, Default)]
pub struct TransientBlobStore {
    containers: RwLock<Containers>,
}

impl TransientBlobStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Containers>, StorageError> {
        self.containers
            .read()
            .map_err(|_| StorageError::operation("transient store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Containers>, StorageError> {
        self.containers
            .write()
            .map_err(|_| StorageError::operation("transient store lock poisoned"))
    }
}

#[async_trait]
impl BlobStore for TransientBlobStore {
    async fn container_exists(&self, container: &str) -> Result<bool, StorageError> {
        validate_name("container", container)?;
        Ok(self.read()?.contains_key(container))
    }

    async fn create_container(&self, container: &str) -> Result<bool, StorageError> {
        validate_name("container", container)?;
        let mut containers = self.write()?;
        if containers.contains_key(container) {
            return Ok(false);
        }
        containers.insert(container.to_string(), BTreeMap::new());
        Ok(true)
    }

    async fn put_blob(&self, container: &str, blob: Blob) -> Result<(), StorageError> {
        validate_name("blob", &blob.metadata.name)?;
        let mut containers = self.write()?;
        let blobs = containers
            .get_mut(container)
            .ok_or_else(|| StorageError::container_not_found(container))?;
        blobs.insert(blob.metadata.name.clone(), blob);
        Ok(())
    }

    async fn get_blob(&self, container: &str, name: &str) -> Result<Option<Blob>, StorageError> {
        let containers = self.read()?;
        let blobs = containers
            .get(container)
            .ok_or_else(|| StorageError::container_not_found(container))?;
        Ok(blobs.get(name).cloned())
    }

    async fn list(&self, container: &str) -> Result<Vec<BlobMetadata>, StorageError> {
        let containers = self.read()?;
        let blobs = containers
            .get(container)
            .ok_or_else(|| StorageError::container_not_found(container))?;
        Ok(blobs.values().map(|blob| blob.metadata.clone()).collect())
    }

    async fn clear_container(&self, container: &str) -> Result<usize, StorageError> {
        let mut containers = self.write()?;
        Ok(containers.get_mut(container).map_or(0, |blobs| {
            let removed = blobs.len();
            blobs.clear();
            removed
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_requires_container() {
        let store = TransientBlobStore::new();
        let blob = Blob::builder("1").payload("hi").build();

        let err = store.put_blob("tweets", blob).await.unwrap_err();
        assert!(matches!(err, StorageError::ContainerNotFound { .. }));
    }

    #[tokio::test]
    async fn test_round_trip_keeps_user_metadata() {
        let store = TransientBlobStore::new();
        assert!(store.create_container("tweets").await.unwrap());
        assert!(!store.create_container("tweets").await.unwrap());

        let blob = Blob::builder("42")
            .user_metadata("sendername", "frank")
            .payload("I love beans!")
            .build();
        store.put_blob("tweets", blob.clone()).await.unwrap();

        assert_eq!(store.get_blob("tweets", "42").await.unwrap(), Some(blob));
        assert_eq!(store.get_blob("tweets", "43").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_sorted_and_clear() {
        let store = TransientBlobStore::new();
        store.create_container("tweets").await.unwrap();
        for id in ["3", "1", "2"] {
            store
                .put_blob("tweets", Blob::builder(id).payload(id.to_string()).build())
                .await
                .unwrap();
        }

        let names: Vec<String> = store
            .list("tweets")
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["1", "2", "3"]);

        assert_eq!(store.clear_container("tweets").await.unwrap(), 3);
        assert!(store.list("tweets").await.unwrap().is_empty());
        assert!(store.container_exists("tweets").await.unwrap());
        assert_eq!(store.clear_container("absent").await.unwrap(), 0);
    }
}
