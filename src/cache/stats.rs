//! Cache Statistics Module
//!
//! Tracks read outcomes and sweep activity.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

// == Cache Stats ==
/// Point-in-time snapshot of cache metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of reads that found a live entry
    pub hits: u64,
    /// Number of reads that found nothing (absent or expired)
    pub misses: u64,
    /// Subset of misses where the key was present but expired
    pub expired_reads: u64,
    /// Number of sweep passes run, background or manual
    pub sweeps: u64,
    /// Number of entries physically removed by sweeps
    pub swept_entries: u64,
    /// When the last sweep pass finished
    pub last_sweep_at: Option<DateTime<Utc>>,
    /// Entries physically present, expired or not
    pub total_entries: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Stats Recorder ==
/// Live counters, updated from behind the store's shared lock.
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    expired_reads: AtomicU64,
    sweeps: AtomicU64,
    swept_entries: AtomicU64,
    last_sweep_at: Mutex<Option<DateTime<Utc>>>,
}

impl StatsRecorder {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts as a miss too.
    pub fn record_expired_read(&self) {
        self.record_miss();
        self.expired_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sweep(&self, removed: usize) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        self.swept_entries.fetch_add(removed as u64, Ordering::Relaxed);
        *self.last_sweep_at.lock() = Some(Utc::now());
    }

    pub fn snapshot(&self, total_entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired_reads: self.expired_reads.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
            swept_entries: self.swept_entries.load(Ordering::Relaxed),
            last_sweep_at: *self.last_sweep_at.lock(),
            total_entries,
        }
    }
}
