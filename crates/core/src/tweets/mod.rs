//! Tweets stored as metadata-tagged blobs.
//!
//! This module provides:
//! - The tweet source contract
//! - Storing fetched tweets into each provider
//! - Mapping stored blobs back to display records
//! - Clearing the tweet container

mod error;
mod mapper;
mod service;
mod source;
mod types;

pub use error::TweetError;
pub use mapper::StatusMapper;
pub use service::TweetService;
pub use source::{StaticTweetSource, TweetSource};
pub use types::{StoredTweetStatus, Tweet};
