//! Provider registry: one storage context per configured provider name.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, trace};
use tweetstore_shared::ProviderSettings;

use super::blob::BlobStore;
use super::config::StorageProvider;
use super::error::StorageError;
use super::service::StorageService;
use super::transient::TransientBlobStore;

/// Storage handle for one configured provider.
#[derive(Clone)]
pub struct ProviderContext {
    name: String,
    host: String,
    store: Arc<dyn BlobStore>,
}

impl ProviderContext {
    /// Wrap a blob store under a provider name.
    pub fn new(name: impl Into<String>, host: impl Into<String>, store: Arc<dyn BlobStore>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            store,
        }
    }

    /// Build the context for a provider configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider's operator cannot be created.
    pub fn from_provider(name: &str, provider: StorageProvider) -> Result<Self, StorageError> {
        let host = provider.host();
        let store: Arc<dyn BlobStore> = match provider {
            StorageProvider::Transient => Arc::new(TransientBlobStore::new()),
            other => Arc::new(StorageService::from_provider(other)?),
        };
        Ok(Self::new(name, host, store))
    }

    /// Provider name, as configured.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Endpoint host shown in listings.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The provider's blob store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }
}

impl std::fmt::Debug for ProviderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderContext")
            .field("name", &self.name)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

/// Read-only map of provider name to storage context, built once at startup.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    contexts: BTreeMap<String, ProviderContext>,
}

impl ProviderRegistry {
    /// Build the registry from configured provider settings.
    ///
    /// A provider is available when it has both identity and credential, or when
    /// its kind needs none. An allow-list further restricts the available set.
    ///
    /// # Errors
    ///
    /// Returns an error if no provider remains or a provider fails to initialize.
    pub fn from_settings(
        providers: &BTreeMap<String, ProviderSettings>,
        allowed: Option<&[String]>,
    ) -> Result<Self, StorageError> {
        let names = available_providers(providers, allowed);
        if names.is_empty() {
            return Err(StorageError::configuration(
                "no credentials available for any requested context",
            ));
        }

        let mut contexts = BTreeMap::new();
        for name in names {
            let settings = &providers[&name];
            let provider = StorageProvider::from_settings(&name, settings)?;
            info!(provider = %name, kind = provider.name(), "Storage context created");
            contexts.insert(name.clone(), ProviderContext::from_provider(&name, provider)?);
        }

        Ok(Self { contexts })
    }

    /// Build a registry from ready-made contexts.
    pub fn from_contexts(contexts: impl IntoIterator<Item = ProviderContext>) -> Self {
        Self {
            contexts: contexts
                .into_iter()
                .map(|ctx| (ctx.name.clone(), ctx))
                .collect(),
        }
    }

    /// Look up a provider by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ProviderContext> {
        self.contexts.get(name)
    }

    /// Provider names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.contexts.keys().map(String::as_str)
    }

    /// All contexts, sorted by provider name.
    pub fn contexts(&self) -> impl Iterator<Item = &ProviderContext> {
        self.contexts.values()
    }

    /// One named provider, or all of them when no name is given.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UnknownProvider`] for a name that is not registered.
    pub fn select(&self, name: Option<&str>) -> Result<Vec<&ProviderContext>, StorageError> {
        match name {
            Some(name) => self
                .get(name)
                .map(|ctx| vec![ctx])
                .ok_or_else(|| StorageError::UnknownProvider(name.to_string())),
            None => Ok(self.contexts().collect()),
        }
    }

    /// Number of providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// Whether the registry has no providers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Release the cached connections of every storage context.
    pub fn close(&self) {
        trace!("About to close contexts.");
        for ctx in self.contexts.values() {
            trace!(provider = %ctx.name, "Closing context");
            ctx.store.close();
        }
        trace!("Contexts closed.");
    }
}

/// Names of providers with usable credentials, filtered by the allow-list.
#[must_use]
pub fn available_providers(
    providers: &BTreeMap<String, ProviderSettings>,
    allowed: Option<&[String]>,
) -> Vec<String> {
    providers
        .iter()
        .filter(|(name, settings)| {
            settings.has_credentials() || StorageProvider::is_credential_free(name)
        })
        .filter(|(name, _)| allowed.is_none_or(|list| list.iter().any(|a| a == *name)))
        .map(|(name, _)| name.clone())
        .collect()
}
