//! Cache Module
//!
//! Provides the in-memory store with TTL expiration and background sweeping.
//!
//! Entries are internal; values are only reachable through [`CacheValue`].
//!
//! ```compile_fail
//! use ttl_store::cache::CacheEntry;
//! ```

mod entry;
mod stats;
mod store;
mod value;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::Ttl;
pub use stats::CacheStats;
pub use store::TtlStore;
pub use value::{CacheValue, Delta};

pub(crate) use entry::CacheEntry;
pub(crate) use store::StoreCore;
