//! Shared configuration, errors, and constants for tweetstore.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management
//! - Names shared between the storing and listing sides

pub mod config;
pub mod constants;
pub mod error;

pub use config::{AppConfig, ProviderSettings, ScheduleConfig, ServerConfig, StoreConfig, TwitterSettings};
pub use error::{AppError, AppResult};
