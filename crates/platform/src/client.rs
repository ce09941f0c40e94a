//! HTTP client for requests the application sends to itself.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use tweetstore_shared::constants::INTERNAL_TOKEN_HEADER;

use crate::error::QueueError;
use crate::queue::{Task, TaskMethod};

/// Sends internal requests to the application's base URL, carrying the
/// internal token when one is configured.
#[derive(Debug, Clone)]
pub struct InternalClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl InternalClient {
    /// Create a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, QueueError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(format!("tweetstore-platform/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Deliver a task and require a success status.
    pub async fn send(&self, task: &Task) -> Result<(), QueueError> {
        let url = format!("{}{}", self.base_url, task.path);
        debug!(method = ?task.method, url = %url, "Delivering internal request");

        let mut req = match task.method {
            TaskMethod::Get => self.client.get(&url).query(&task.params),
            TaskMethod::Post => self.client.post(&url).form(&task.params),
        };
        if let Some(token) = &self.token {
            req = req.header(INTERNAL_TOKEN_HEADER, token);
        }

        let response = req.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(QueueError::Delivery {
                path: task.path.clone(),
                status: status.as_u16(),
            })
        }
    }
}
