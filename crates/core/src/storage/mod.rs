//! Multi-provider blob storage using Apache OpenDAL.
//!
//! This module provides vendor-agnostic object storage with support for:
//! - S3-compatible: AWS S3, Cloudflare R2, MinIO
//! - Azure Blob Storage
//! - Local filesystem
//! - Transient in-process storage
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 ProviderRegistry (name → context)               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │        BlobStore: put / get / list / clear by container+key      │
//! ├────────────────────────────────┬────────────────────────────────┤
//! │ StorageService (OpenDAL)       │ TransientBlobStore (memory)    │
//! └────────────────────────────────┴────────────────────────────────┘
//! ```

mod blob;
mod config;
mod error;
mod registry;
mod service;
mod transient;

pub use blob::{Blob, BlobBuilder, BlobMetadata, BlobStore};
pub use config::StorageProvider;
pub use error::StorageError;
pub use registry::{ProviderContext, ProviderRegistry, available_providers};
pub use service::StorageService;
pub use transient::TransientBlobStore;
