//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache operations.
///
/// Reads never fail: "not found" and "expired" are reported as `None`.
/// A failed mutation leaves the store exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key is not physically present in the store
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Rename target is already occupied
    #[error("Key already exists: {0}")]
    KeyAlreadyExists(String),

    /// Stored value does not support numeric addition
    #[error("Value at key {key} is not numeric (stored type: {type_name})")]
    NotNumeric {
        key: String,
        type_name: &'static str,
    },
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
