//! Blob storage backed by Apache OpenDAL.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use opendal::{EntryMode, ErrorKind, Operator, services};
use tracing::debug;

use super::blob::{Blob, BlobMetadata, BlobStore, validate_name};
use super::config::StorageProvider;
use super::error::StorageError;

/// Directory holding metadata sidecars for providers without native user metadata.
const META_DIR: &str = ".meta";

/// Blob storage for one provider, built on OpenDAL operators.
///
/// Bucket-scoped providers (S3, Azure) get one operator per container, with the
/// container used as the bucket. Root-scoped providers (filesystem) share one
/// operator and keep each container in a top-level directory.
///
/// Providers without native user metadata keep tags in a JSON sidecar under
/// `<container>/.meta/<name>.json`.
pub struct StorageService {
    provider: StorageProvider,
    /// Operator for root-scoped providers.
    root: Option<Operator>,
    /// Operators for bucket-scoped providers, keyed by container.
    buckets: DashMap<String, Operator>,
}

impl StorageService {
    /// Create a new storage service from provider configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_provider(provider: StorageProvider) -> Result<Self, StorageError> {
        let root = match &provider {
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Some(
                    Operator::new(builder)
                        .map_err(|e| StorageError::configuration(e.to_string()))?
                        .finish(),
                )
            }
            StorageProvider::Transient => {
                return Err(StorageError::configuration(
                    "transient provider is served by TransientBlobStore",
                ));
            }
            StorageProvider::S3 { .. } | StorageProvider::AzureBlob { .. } => None,
        };

        Ok(Self {
            provider,
            root,
            buckets: DashMap::new(),
        })
    }

    /// Create an OpenDAL operator bound to a bucket-scoped container.
    fn create_bucket_operator(&self, container: &str) -> Result<Operator, StorageError> {
        match &self.provider {
            StorageProvider::S3 {
                endpoint,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let mut builder = services::S3::default()
                    .bucket(container)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);
                if let Some(endpoint) = endpoint {
                    builder = builder.endpoint(endpoint);
                }

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                endpoint,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .endpoint(endpoint)
                    .container(container);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
            StorageProvider::LocalFs { .. } | StorageProvider::Transient => Err(
                StorageError::configuration("provider is not bucket-scoped"),
            ),
        }
    }

    /// Resolve the operator and path prefix for a container.
    fn locate(&self, container: &str) -> Result<(Operator, String), StorageError> {
        validate_name("container", container)?;

        if let Some(root) = &self.root {
            return Ok((root.clone(), format!("{container}/")));
        }

        if let Some(op) = self.buckets.get(container) {
            return Ok((op.clone(), String::new()));
        }
        let op = self.create_bucket_operator(container)?;
        self.buckets.insert(container.to_string(), op.clone());
        Ok((op, String::new()))
    }

    /// Path of the metadata sidecar for a blob.
    fn sidecar_path(prefix: &str, name: &str) -> String {
        format!("{prefix}{META_DIR}/{name}.json")
    }

    fn supports_user_metadata(op: &Operator) -> bool {
        op.info().full_capability().write_with_user_metadata
    }

    /// Read user metadata from a sidecar. A missing sidecar means no tags.
    async fn read_sidecar(
        op: &Operator,
        prefix: &str,
        name: &str,
    ) -> Result<HashMap<String, String>, StorageError> {
        let path = Self::sidecar_path(prefix, name);
        match op.read(&path).await {
            Ok(buf) => serde_json::from_slice(&buf.to_bytes())
                .map_err(|e| StorageError::operation(format!("metadata for '{name}': {e}"))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(StorageError::from(e)),
        }
    }

    /// Get the storage provider kind.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Get the provider configuration.
    #[must_use]
    pub fn provider(&self) -> &StorageProvider {
        &self.provider
    }
}

#[async_trait]
impl BlobStore for StorageService {
    async fn container_exists(&self, container: &str) -> Result<bool, StorageError> {
        let (op, prefix) = self.locate(container)?;

        if prefix.is_empty() {
            return match op.check().await {
                Ok(()) => Ok(true),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
                Err(e) => Err(StorageError::from(e)),
            };
        }

        match op.stat(&prefix).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::from(e)),
        }
    }

    async fn create_container(&self, container: &str) -> Result<bool, StorageError> {
        if self.container_exists(container).await? {
            return Ok(false);
        }

        let (op, prefix) = self.locate(container)?;
        if prefix.is_empty() {
            // Buckets are provisioned outside the application.
            return Err(StorageError::container_not_found(container));
        }

        op.create_dir(&prefix).await?;
        debug!(provider = self.provider_name(), container, "Container created");
        Ok(true)
    }

    async fn put_blob(&self, container: &str, blob: Blob) -> Result<(), StorageError> {
        validate_name("blob", &blob.metadata.name)?;
        let (op, prefix) = self.locate(container)?;
        let path = format!("{prefix}{}", blob.metadata.name);

        if Self::supports_user_metadata(&op) {
            op.write_with(&path, blob.payload)
                .user_metadata(blob.metadata.user_metadata)
                .await?;
            return Ok(());
        }

        op.write(&path, blob.payload).await?;
        let sidecar = Self::sidecar_path(&prefix, &blob.metadata.name);
        if blob.metadata.user_metadata.is_empty() {
            op.delete(&sidecar).await?;
        } else {
            let tags = serde_json::to_vec(&blob.metadata.user_metadata)
                .map_err(|e| StorageError::operation(e.to_string()))?;
            op.write(&sidecar, tags).await?;
            debug!(provider = self.provider_name(), path = %sidecar, "Wrote metadata sidecar");
        }
        Ok(())
    }

    async fn get_blob(&self, container: &str, name: &str) -> Result<Option<Blob>, StorageError> {
        validate_name("blob", name)?;
        let (op, prefix) = self.locate(container)?;
        let path = format!("{prefix}{name}");

        let meta = match op.stat(&path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::from(e)),
        };
        let payload = op.read(&path).await?.to_bytes();
        let user_metadata = if Self::supports_user_metadata(&op) {
            meta.user_metadata().cloned().unwrap_or_default()
        } else {
            Self::read_sidecar(&op, &prefix, name).await?
        };

        Ok(Some(Blob {
            metadata: BlobMetadata {
                name: name.to_string(),
                user_metadata,
                content_length: Some(meta.content_length()),
            },
            payload,
        }))
    }

    async fn list(&self, container: &str) -> Result<Vec<BlobMetadata>, StorageError> {
        let (op, prefix) = self.locate(container)?;
        let list_path = if prefix.is_empty() { "/" } else { prefix.as_str() };

        let entries = match op.list(list_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::container_not_found(container));
            }
            Err(e) => return Err(StorageError::from(e)),
        };

        let mut blobs: Vec<BlobMetadata> = entries
            .into_iter()
            .filter(|entry| entry.metadata().mode() == EntryMode::FILE)
            .map(|entry| BlobMetadata {
                name: entry.name().to_string(),
                user_metadata: HashMap::new(),
                content_length: Some(entry.metadata().content_length()),
            })
            .collect();
        blobs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(blobs)
    }

    async fn clear_container(&self, container: &str) -> Result<usize, StorageError> {
        let (op, prefix) = self.locate(container)?;
        let blobs = match self.list(container).await {
            Ok(blobs) => blobs,
            Err(StorageError::ContainerNotFound { .. }) => return Ok(0),
            Err(e) => return Err(e),
        };

        let sidecars = !Self::supports_user_metadata(&op);
        for blob in &blobs {
            op.delete(&format!("{prefix}{}", blob.name)).await?;
            if sidecars {
                op.delete(&Self::sidecar_path(&prefix, &blob.name)).await?;
            }
        }
        debug!(
            provider = self.provider_name(),
            container,
            removed = blobs.len(),
            "Container cleared"
        );
        Ok(blobs.len())
    }

    fn close(&self) {
        let released = self.buckets.len();
        self.buckets.clear();
        debug!(provider = self.provider_name(), released, "Released bucket operators");
    }
}

/// Extension trait for pipe operator.
trait Pipe: Sized {
    fn pipe<F, R>(self, f: F) -> R
    where
        F: FnOnce(Self) -> R,
    {
        f(self)
    }
}

impl<T> Pipe for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use tweetstore_shared::constants::SENDER_NAME;

    fn fs_service(dir: &tempfile::TempDir) -> StorageService {
        StorageService::from_provider(StorageProvider::local_fs(dir.path()))
            .expect("should create service")
    }

    #[test]
    fn test_transient_provider_rejected() {
        let result = StorageService::from_provider(StorageProvider::Transient);
        assert!(matches!(result, Err(StorageError::Configuration(_))));
    }

    #[test]
    fn test_bucket_scoped_operator_is_cached() {
        let provider = StorageProvider::s3(
            Some("http://localhost:9000".into()),
            "key",
            "secret",
            "us-east-1",
        );
        let service = StorageService::from_provider(provider).expect("should create service");

        service.locate("tweets").expect("operator");
        service.locate("tweets").expect("operator");
        assert_eq!(service.buckets.len(), 1);

        service.close();
        assert!(service.buckets.is_empty());
    }

    #[tokio::test]
    async fn test_fs_container_lifecycle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = fs_service(&dir);

        assert!(!service.container_exists("tweets").await.unwrap());
        assert!(service.create_container("tweets").await.unwrap());
        assert!(service.container_exists("tweets").await.unwrap());
        assert!(!service.create_container("tweets").await.unwrap());
    }

    #[tokio::test]
    async fn test_fs_put_list_get_clear() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = fs_service(&dir);
        service.create_container("tweets").await.unwrap();

        for (id, text) in [("2", "second"), ("1", "first")] {
            let blob = Blob::builder(id)
                .user_metadata(SENDER_NAME, "frank")
                .payload(text)
                .build();
            service.put_blob("tweets", blob).await.unwrap();
        }

        let names: Vec<String> = service
            .list("tweets")
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["1", "2"]);

        let blob = service.get_blob("tweets", "1").await.unwrap().expect("blob");
        assert_eq!(blob.payload_as_string(), "first");
        assert_eq!(
            blob.metadata.user_metadata.get(SENDER_NAME).map(String::as_str),
            Some("frank")
        );
        assert!(service.get_blob("tweets", "3").await.unwrap().is_none());

        assert_eq!(service.clear_container("tweets").await.unwrap(), 2);
        assert!(service.list("tweets").await.unwrap().is_empty());
        assert!(!dir.path().join("tweets/.meta/1.json").exists());
    }

    #[tokio::test]
    async fn test_fs_overwrite_without_tags_drops_sidecar() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = fs_service(&dir);
        service.create_container("tweets").await.unwrap();

        let tagged = Blob::builder("1")
            .user_metadata(SENDER_NAME, "frank")
            .payload("I love beans!")
            .build();
        service.put_blob("tweets", tagged).await.unwrap();
        let plain = Blob::builder("1").payload("edited").build();
        service.put_blob("tweets", plain).await.unwrap();

        let blob = service.get_blob("tweets", "1").await.unwrap().expect("blob");
        assert!(blob.metadata.user_metadata.is_empty());
        assert_eq!(blob.payload_as_string(), "edited");
    }

    #[tokio::test]
    async fn test_fs_clear_missing_container_is_noop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = fs_service(&dir);
        assert_eq!(service.clear_container("absent").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_names_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = fs_service(&dir);

        let err = service.container_exists("../etc").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));

        let blob = Blob::builder("a/b").payload("x").build();
        let err = service.put_blob("tweets", blob).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}
