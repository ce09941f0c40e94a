//! Core logic for tweetstore.
//!
//! This crate contains the storage and tweet logic with ZERO web dependencies.
//!
//! # Modules
//!
//! - `storage` - Multi-provider blob storage and the provider registry
//! - `tweets` - Storing tweets as blobs and mapping them back to display records

pub mod storage;
pub mod tweets;
