//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::cache::CacheValue;

// == Ttl ==
/// Lifetime requested for an entry on `set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ttl {
    /// Use the store's default TTL.
    #[default]
    Default,
    /// Never expire.
    Never,
    /// Expire once this much time has passed. A zero duration means
    /// [`Ttl::Default`].
    After(Duration),
}

impl Ttl {
    /// Resolves to the concrete lifetime, or `None` for "never expires".
    ///
    /// A zero default TTL means entries written with [`Ttl::Default`] never
    /// expire.
    pub fn resolve(self, default_ttl: Duration) -> Option<Duration> {
        let ttl = match self {
            Ttl::Never => return None,
            Ttl::Default => default_ttl,
            Ttl::After(ttl) if ttl.is_zero() => default_ttl,
            Ttl::After(ttl) => ttl,
        };
        (!ttl.is_zero()).then_some(ttl)
    }
}

impl From<Duration> for Ttl {
    fn from(ttl: Duration) -> Self {
        if ttl.is_zero() {
            Ttl::Default
        } else {
            Ttl::After(ttl)
        }
    }
}

impl From<Option<Duration>> for Ttl {
    /// `None` never expires.
    fn from(ttl: Option<Duration>) -> Self {
        ttl.map_or(Ttl::Never, Ttl::from)
    }
}

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry {
    /// The stored value
    pub value: CacheValue,
    /// Wall-clock time of insertion or last overwrite
    pub created_at: DateTime<Utc>,
    /// Monotonic expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry with an optional lifetime.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl` - Resolved lifetime, `None` for never expires
    pub fn new(value: CacheValue, ttl: Option<Duration>) -> Self {
        let now = Instant::now();
        Self {
            value,
            created_at: Utc::now(),
            expires_at: ttl.and_then(|ttl| now.checked_add(ttl)),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is strictly past its
    /// expiration instant. Entries without one never expire.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Same as [`is_expired`](Self::is_expired) against a fixed instant, so a
    /// whole scan can share one clock reading.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now > expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the entry has expired
    /// - `Some(remaining)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }
}
