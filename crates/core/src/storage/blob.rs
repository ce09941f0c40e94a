//! Blob types and the storage contract every provider implements.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;

use super::error::StorageError;

/// Metadata of a stored blob.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobMetadata {
    /// Blob name (key within its container).
    pub name: String,
    /// User-supplied metadata tags.
    pub user_metadata: HashMap<String, String>,
    /// Payload size in bytes, when known.
    pub content_length: Option<u64>,
}

impl BlobMetadata {
    /// Metadata carrying only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A blob: metadata plus payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// Blob metadata.
    pub metadata: BlobMetadata,
    /// Raw payload.
    pub payload: Bytes,
}

impl Blob {
    /// Start building a blob with the given name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> BlobBuilder {
        BlobBuilder {
            metadata: BlobMetadata::named(name),
            payload: Bytes::new(),
        }
    }

    /// Payload decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn payload_as_string(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// Builder for [`Blob`].
#[derive(Debug)]
pub struct BlobBuilder {
    metadata: BlobMetadata,
    payload: Bytes,
}

impl BlobBuilder {
    /// Add a user metadata tag.
    #[must_use]
    pub fn user_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.user_metadata.insert(key.into(), value.into());
        self
    }

    /// Set the payload.
    #[must_use]
    pub fn payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Finish the blob.
    #[must_use]
    pub fn build(mut self) -> Blob {
        self.metadata.content_length = Some(self.payload.len() as u64);
        Blob {
            metadata: self.metadata,
            payload: self.payload,
        }
    }
}

/// Container/key blob storage, implemented once per provider kind.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Check whether a container exists.
    async fn container_exists(&self, container: &str) -> Result<bool, StorageError>;

    /// Create a container. Returns `false` if it already existed.
    async fn create_container(&self, container: &str) -> Result<bool, StorageError>;

    /// Store a blob, replacing any blob of the same name.
    async fn put_blob(&self, container: &str, blob: Blob) -> Result<(), StorageError>;

    /// Fetch a blob with its user metadata. `None` if it does not exist.
    async fn get_blob(&self, container: &str, name: &str) -> Result<Option<Blob>, StorageError>;

    /// List the blobs of a container, sorted by name.
    async fn list(&self, container: &str) -> Result<Vec<BlobMetadata>, StorageError>;

    /// Remove every blob from a container. Returns the number removed.
    async fn clear_container(&self, container: &str) -> Result<usize, StorageError>;

    /// Release cached connections. The store stays usable and reconnects lazily.
    fn close(&self) {}
}

/// Reject container and blob names that would escape their namespace.
pub(crate) fn validate_name(kind: &str, name: &str) -> Result<(), StorageError> {
    if name.is_empty() || name.contains('/') || name == "." || name == ".." {
        return Err(StorageError::InvalidKey(format!("{kind} name '{name}'")));
    }
    Ok(())
}
