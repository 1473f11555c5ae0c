//! TTL Store - an in-process key-value cache
//!
//! Thread-safe storage for values of any type with per-entry TTL, lazy
//! expiration on read and an optional background sweeper.

pub mod cache;
pub mod config;
pub mod error;
mod tasks;

pub use cache::{CacheStats, CacheValue, Delta, Ttl, TtlStore};
pub use config::Config;
pub use error::{CacheError, Result};
