//! Twitter API v2 response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tweetstore_core::tweets::Tweet;

/// Standard Twitter API v2 response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterResponse<T> {
    /// The primary data
    #[serde(default)]
    pub data: Option<T>,

    /// Included expansions
    #[serde(default)]
    pub includes: Option<Includes>,
}

/// Included expansions in Twitter API responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Includes {
    /// Expanded user objects
    #[serde(default)]
    pub users: Vec<TwitterUser>,
}

/// A tweet object as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterTweet {
    /// Tweet ID
    pub id: String,

    /// Tweet text content
    pub text: String,

    /// Author user ID
    #[serde(default)]
    pub author_id: Option<String>,

    /// Creation timestamp (ISO 8601)
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A user object as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterUser {
    /// User ID
    pub id: String,

    /// Display name
    pub name: String,

    /// Username (handle without @)
    pub username: String,
}

/// Error body returned on non-success statuses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl TwitterResponse<Vec<TwitterTweet>> {
    /// Convert a mentions page into core tweets, resolving each author id to
    /// a username through the `includes.users` expansion.
    ///
    /// Authors missing from the expansion fall back to their raw id.
    #[must_use]
    pub fn into_tweets(self) -> Vec<Tweet> {
        let users = self.includes.map(|i| i.users).unwrap_or_default();
        let username = |author_id: &str| {
            users
                .iter()
                .find(|u| u.id == author_id)
                .map_or_else(|| author_id.to_string(), |u| u.username.clone())
        };

        self.data
            .unwrap_or_default()
            .into_iter()
            .map(|t| Tweet {
                sender: t.author_id.as_deref().map(&username).unwrap_or_default(),
                created_at: t.created_at.as_deref().and_then(parse_timestamp),
                id: t.id,
                text: t.text,
            })
            .collect()
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}
