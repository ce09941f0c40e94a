//! Twitter API v2 client for tweetstore.
//!
//! Fetches the configured account's mentions with OAuth 1.0a user-context
//! signing and hands them to the core as [`tweetstore_core::tweets::Tweet`]s.

mod client;
mod error;
mod oauth;
mod types;

pub use client::TwitterClient;
pub use error::{TwitterError, TwitterResult};
pub use oauth::OAuthSigner;
pub use types::{Includes, TwitterResponse, TwitterTweet, TwitterUser};
