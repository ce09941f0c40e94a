//! Platform services handed to the application at startup.

use std::collections::HashMap;
use std::sync::Arc;

use crate::queue::TaskQueue;

/// The application's base URL and its named task queues.
pub struct PlatformServices {
    base_url: String,
    queues: HashMap<String, Arc<dyn TaskQueue>>,
}

impl PlatformServices {
    /// Services for an application reachable at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            queues: HashMap::new(),
        }
    }

    /// Register a queue under its own name.
    #[must_use]
    pub fn with_queue(mut self, queue: Arc<dyn TaskQueue>) -> Self {
        self.queues.insert(queue.name().to_string(), queue);
        self
    }

    /// The application's base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Look up a queue by name.
    #[must_use]
    pub fn task_queue(&self, name: &str) -> Option<Arc<dyn TaskQueue>> {
        self.queues.get(name).cloned()
    }

    /// Destroy every registered queue.
    pub async fn destroy(&self) {
        for queue in self.queues.values() {
            queue.destroy().await;
        }
    }
}

impl std::fmt::Debug for PlatformServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.queues.keys().collect();
        names.sort();
        f.debug_struct("PlatformServices")
            .field("base_url", &self.base_url)
            .field("queues", &names)
            .finish()
    }
}
