//! Request middleware.

pub mod internal;

pub use internal::require_internal_token;
