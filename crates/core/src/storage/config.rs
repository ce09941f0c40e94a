//! Storage provider configuration types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tweetstore_shared::ProviderSettings;

use super::error::StorageError;

/// Default S3 region when none is configured.
const DEFAULT_S3_REGION: &str = "us-east-1";

/// Storage provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage: AWS S3, Cloudflare R2, MinIO.
    S3 {
        /// S3 endpoint URL. AWS when absent.
        endpoint: Option<String>,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
    },
    /// Azure Blob Storage
    AzureBlob {
        /// Azure storage account name.
        account: String,
        /// Azure storage access key.
        access_key: String,
        /// Blob service endpoint.
        endpoint: String,
    },
    /// Local filesystem.
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// In-process memory store. Contents are lost on shutdown.
    Transient,
}

impl StorageProvider {
    /// Create S3-compatible provider.
    #[must_use]
    pub fn s3(
        endpoint: Option<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint,
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create local filesystem provider.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Resolve a provider from its configured name and settings.
    ///
    /// Names follow the usual provider ids: `aws-s3` (or `s3`), `azureblob`,
    /// `filesystem`, and `transient`.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown provider names or missing credentials.
    pub fn from_settings(name: &str, settings: &ProviderSettings) -> Result<Self, StorageError> {
        let required = |value: &Option<String>, field: &str| {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| StorageError::configuration(format!("{name}.{field} is required")))
        };

        match name {
            "aws-s3" | "s3" => Ok(Self::s3(
                settings.endpoint.clone(),
                required(&settings.identity, "identity")?,
                required(&settings.credential, "credential")?,
                settings
                    .region
                    .clone()
                    .unwrap_or_else(|| DEFAULT_S3_REGION.to_string()),
            )),
            "azureblob" => {
                let account = required(&settings.identity, "identity")?;
                let endpoint = settings
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| format!("https://{account}.blob.core.windows.net"));
                Ok(Self::AzureBlob {
                    account,
                    access_key: required(&settings.credential, "credential")?,
                    endpoint,
                })
            }
            "filesystem" => Ok(Self::local_fs(
                settings
                    .root
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("./blobstore")),
            )),
            "transient" => Ok(Self::Transient),
            other => Err(StorageError::configuration(format!(
                "unknown storage provider '{other}'"
            ))),
        }
    }

    /// Whether the provider works without identity/credential settings.
    #[must_use]
    pub fn is_credential_free(name: &str) -> bool {
        matches!(name, "filesystem" | "transient")
    }

    /// Get the provider kind name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::AzureBlob { .. } => "azure_blob",
            Self::LocalFs { .. } => "local",
            Self::Transient => "transient",
        }
    }

    /// Whether containers map to buckets rather than directories under one root.
    #[must_use]
    pub fn is_bucket_scoped(&self) -> bool {
        matches!(self, Self::S3 { .. } | Self::AzureBlob { .. })
    }

    /// Host name of the provider's endpoint, `localhost` for local providers.
    #[must_use]
    pub fn host(&self) -> String {
        match self {
            Self::S3 {
                endpoint: Some(endpoint),
                ..
            }
            | Self::AzureBlob { endpoint, .. } => endpoint_host(endpoint),
            Self::S3 { region, .. } => format!("s3.{region}.amazonaws.com"),
            Self::LocalFs { .. } | Self::Transient => "localhost".to_string(),
        }
    }
}

/// Extract the host part of an endpoint URL.
fn endpoint_host(endpoint: &str) -> String {
    let without_scheme = endpoint
        .split_once("://")
        .map_or(endpoint, |(_, rest)| rest);
    let authority = without_scheme.split('/').next().unwrap_or(without_scheme);
    let host = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    let host = if host.starts_with('[') {
        host.split_inclusive(']').next().unwrap_or(host)
    } else {
        host.split(':').next().unwrap_or(host)
    };
    host.to_string()
}
