//! Cache Store Module
//!
//! Main cache engine: a reader/writer-locked map with lazy TTL expiration and
//! an optional background sweeper.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::cache::stats::StatsRecorder;
use crate::cache::{CacheEntry, CacheStats, CacheValue, Delta, Ttl};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tasks::Sweeper;

// == Store Core ==
/// State shared between the store handle and its sweep task.
#[derive(Debug, Default)]
pub(crate) struct StoreCore {
    entries: RwLock<HashMap<String, CacheEntry>>,
    stats: StatsRecorder,
}

impl StoreCore {
    // == Purge Expired ==
    /// Runs one sweep pass and returns the number of entries removed.
    ///
    /// Expired keys are collected under the shared lock, then removed under
    /// the exclusive lock. Each key is re-checked before removal, so an entry
    /// overwritten between the two phases survives until a later pass.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<String> = self
            .entries
            .read()
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        let mut removed = 0;
        if !expired.is_empty() {
            let mut entries = self.entries.write();
            for key in &expired {
                if entries.get(key).is_some_and(|entry| entry.is_expired_at(now)) {
                    entries.remove(key);
                    removed += 1;
                }
            }
        }

        self.stats.record_sweep(removed);
        removed
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.read().len())
    }
}

// == TTL Store ==
/// Thread-safe key-value cache with per-entry TTL.
///
/// All methods take `&self`; share the store between threads with an `Arc`.
/// Reads (`get`, `get_all`) hide expired entries, while `exist` and `count`
/// report raw structural presence until an entry is swept or deleted.
///
/// Dropping the store stops its sweeper.
pub struct TtlStore {
    core: Arc<StoreCore>,
    default_ttl: Duration,
    sweeper: Option<Sweeper>,
}

impl TtlStore {
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// A non-zero `sweep_interval` starts the background sweeper: as a task
    /// on the current Tokio runtime, or on a dedicated thread outside one.
    /// Zero leaves expiration purely lazy.
    ///
    /// # Arguments
    /// * `default_ttl` - TTL applied to entries written with [`Ttl::Default`],
    ///   zero meaning never expire
    /// * `sweep_interval` - Time between sweep passes, zero to disable
    pub fn new(default_ttl: Duration, sweep_interval: Duration) -> Self {
        Self::from_config(&Config {
            default_ttl,
            sweep_interval,
        })
    }

    /// Creates a store from configuration.
    pub fn from_config(config: &Config) -> Self {
        let core = Arc::new(StoreCore::default());
        let sweeper = config
            .sweeping_enabled()
            .then(|| Sweeper::spawn(core.clone(), config.sweep_interval));

        Self {
            core,
            default_ttl: config.default_ttl,
            sweeper,
        }
    }

    /// TTL applied to entries written with [`Ttl::Default`].
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns true while a background sweeper is attached to this store.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper.as_ref().is_some_and(Sweeper::is_running)
    }

    // == Set ==
    /// Stores a value, replacing any previous value and TTL under `key`.
    ///
    /// `ttl` accepts a [`Ttl`] or a [`Duration`], where a zero duration
    /// means "use the default TTL".
    pub fn set<V: Any + Send + Sync>(
        &self,
        key: impl Into<String>,
        value: V,
        ttl: impl Into<Ttl>,
    ) {
        self.set_value(key, CacheValue::new(value), ttl);
    }

    /// Stores an already wrapped value, e.g. one returned by [`get`](Self::get).
    pub fn set_value(&self, key: impl Into<String>, value: CacheValue, ttl: impl Into<Ttl>) {
        let key = key.into();
        let ttl = ttl.into().resolve(self.default_ttl);
        let entry = CacheEntry::new(value, ttl);

        trace!(key = %key, ttl = ?ttl, "set");
        self.core.entries.write().insert(key, entry);
    }

    // == Get ==
    /// Retrieves a live value by key.
    ///
    /// Returns `None` if the key is absent or expired. Expired entries stay
    /// in place until swept or deleted.
    pub fn get(&self, key: &str) -> Option<CacheValue> {
        self.lookup(key, |value| Some(value.clone()))
    }

    /// Retrieves a live value and clones it out as a `T`.
    ///
    /// Returns `None` if the key is absent, expired, or holds another type.
    /// A type mismatch counts as a miss.
    pub fn get_as<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.lookup(key, |value| value.downcast_ref::<T>().cloned())
    }

    /// Reads a live entry through `read`, recording a hit when it yields a
    /// value and a miss otherwise.
    fn lookup<R>(&self, key: &str, read: impl FnOnce(&CacheValue) -> Option<R>) -> Option<R> {
        let entries = self.core.entries.read();
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.core.stats.record_expired_read();
                None
            }
            Some(entry) => {
                let found = read(&entry.value);
                if found.is_some() {
                    self.core.stats.record_hit();
                } else {
                    self.core.stats.record_miss();
                }
                found
            }
            None => {
                self.core.stats.record_miss();
                None
            }
        }
    }

    // == Get All ==
    /// Snapshot of every live entry, taken under a single read lock.
    pub fn get_all(&self) -> HashMap<String, CacheValue> {
        let now = Instant::now();
        self.core
            .entries
            .read()
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }

    // == Delete ==
    /// Removes an entry by key, expired or not.
    ///
    /// # Errors
    /// [`CacheError::KeyNotFound`] if the key is not present.
    pub fn delete(&self, key: &str) -> Result<()> {
        match self.core.entries.write().remove(key) {
            Some(_) => {
                trace!(key = %key, "delete");
                Ok(())
            }
            None => Err(CacheError::KeyNotFound(key.to_string())),
        }
    }

    // == Count ==
    /// Number of entries physically present, including expired entries that
    /// have not been swept yet.
    pub fn count(&self) -> usize {
        self.core.entries.read().len()
    }

    // == Rename Key ==
    /// Moves the entry under `old_key` to `new_key`, keeping its value,
    /// creation time and expiration.
    ///
    /// Both checks and the move happen under one write lock.
    ///
    /// # Errors
    /// - [`CacheError::KeyNotFound`] if `old_key` is not present
    /// - [`CacheError::KeyAlreadyExists`] if `new_key` is present, including
    ///   when it equals `old_key`
    pub fn rename_key(&self, old_key: &str, new_key: impl Into<String>) -> Result<()> {
        let new_key = new_key.into();
        let mut entries = self.core.entries.write();

        if !entries.contains_key(old_key) {
            return Err(CacheError::KeyNotFound(old_key.to_string()));
        }
        if entries.contains_key(&new_key) {
            return Err(CacheError::KeyAlreadyExists(new_key));
        }

        if let Some(entry) = entries.remove(old_key) {
            debug!(from = %old_key, to = %new_key, "Renamed key");
            entries.insert(new_key, entry);
        }
        Ok(())
    }

    // == Increment ==
    /// Adds `delta` to the numeric value under `key`, in place.
    ///
    /// The delta is converted to the stored type, integers wrap on overflow,
    /// and the stored type, creation time and expiration are unchanged.
    ///
    /// # Errors
    /// - [`CacheError::KeyNotFound`] if the key is not present
    /// - [`CacheError::NotNumeric`] if the stored value is not a primitive
    ///   integer or float
    pub fn increment(&self, key: &str, delta: impl Into<Delta>) -> Result<()> {
        let mut entries = self.core.entries.write();
        let entry = entries
            .get_mut(key)
            .ok_or_else(|| CacheError::KeyNotFound(key.to_string()))?;

        let type_name = entry.value.type_name();
        entry.value = entry
            .value
            .incremented(delta.into())
            .ok_or_else(|| CacheError::NotNumeric {
                key: key.to_string(),
                type_name,
            })?;
        Ok(())
    }

    // == Exist ==
    /// Returns true if `key` is physically present, expired or not.
    pub fn exist(&self, key: &str) -> bool {
        self.core.entries.read().contains_key(key)
    }

    // == Flush All ==
    /// Discards every entry.
    pub fn flush_all(&self) {
        let dropped = std::mem::take(&mut *self.core.entries.write());
        debug!(entries = dropped.len(), "Flushed cache");
    }

    // == Purge Expired ==
    /// Runs one sweep pass now and returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        self.core.purge_expired()
    }

    // == Metadata ==
    /// Wall-clock time a live entry was inserted or last overwritten.
    pub fn created_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.core
            .entries
            .read()
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.created_at)
    }

    /// Remaining lifetime of a live entry.
    ///
    /// Returns `None` if the key is absent or expired, `Some(None)` if the
    /// entry never expires.
    pub fn ttl_remaining(&self, key: &str) -> Option<Option<Duration>> {
        self.core
            .entries
            .read()
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(CacheEntry::ttl_remaining)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.core.stats()
    }

    #[cfg(test)]
    pub(crate) fn core(&self) -> Arc<StoreCore> {
        self.core.clone()
    }

    // == Shutdown ==
    /// Stops the background sweeper and waits for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.shutdown().await;
        }
    }
}

impl Drop for TtlStore {
    fn drop(&mut self) {
        if let Some(sweeper) = &self.sweeper {
            sweeper.cancel();
        }
    }
}

impl fmt::Debug for TtlStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlStore")
            .field("entries", &self.count())
            .field("default_ttl", &self.default_ttl)
            .field("sweeping", &self.is_sweeping())
            .finish()
    }
}
