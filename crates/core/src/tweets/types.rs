//! Tweet and stored-tweet display types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tweet as fetched from the social-media API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    /// Tweet id, used as the blob name.
    pub id: String,
    /// Tweet text, stored as the payload.
    pub text: String,
    /// Username of the sender, stored as user metadata.
    pub sender: String,
    /// When the tweet was posted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Display record for one stored tweet.
///
/// Built fresh per request and never mutated. Equality is field equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoredTweetStatus {
    /// Provider name.
    pub service: String,
    /// Provider endpoint host.
    pub host: String,
    /// Container the tweet is stored in.
    pub container: String,
    /// Blob name (tweet id).
    pub id: String,
    /// Sender tag, empty when the fetch failed.
    pub sender: String,
    /// Tweet text, empty when the fetch failed.
    pub text: String,
    /// Fetch latency (`"<n>ms"`) or the error message.
    pub status: Option<String>,
}

impl StoredTweetStatus {
    /// Create a status record.
    #[must_use]
    pub fn new(
        service: impl Into<String>,
        host: impl Into<String>,
        container: impl Into<String>,
        id: impl Into<String>,
        sender: impl Into<String>,
        text: impl Into<String>,
        status: Option<String>,
    ) -> Self {
        Self {
            service: service.into(),
            host: host.into(),
            container: container.into(),
            id: id.into(),
            sender: sender.into(),
            text: text.into(),
            status,
        }
    }

    /// Copy of this record with the status dropped, for comparisons that
    /// ignore timing.
    #[must_use]
    pub fn without_status(&self) -> Self {
        Self {
            status: None,
            ..self.clone()
        }
    }
}
