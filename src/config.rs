//! Configuration Module
//!
//! Construction parameters for a [`TtlStore`](crate::TtlStore). The
//! environment is only consulted when the caller asks for [`Config::from_env`].

use std::env;
use std::time::Duration;

/// Store configuration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// TTL applied to entries written with [`Ttl::Default`](crate::Ttl::Default).
    /// Zero means such entries never expire.
    pub default_ttl: Duration,
    /// Interval between background sweep passes. Zero disables sweeping.
    pub sweep_interval: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 0, never expire)
    /// - `SWEEP_INTERVAL_MS` - Sweep frequency in milliseconds (default: 0, disabled)
    pub fn from_env() -> Self {
        Self {
            default_ttl: Duration::from_millis(
                env::var("DEFAULT_TTL_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0),
            ),
            sweep_interval: Duration::from_millis(
                env::var("SWEEP_INTERVAL_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0),
            ),
        }
    }

    /// Sets the TTL used for entries written with the default TTL.
    pub fn with_default_ttl(mut self, default_ttl: Duration) -> Self {
        self.default_ttl = default_ttl;
        self
    }

    /// Sets the background sweep interval.
    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }

    /// Returns true if this configuration starts a background sweeper.
    pub fn sweeping_enabled(&self) -> bool {
        !self.sweep_interval.is_zero()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: Duration::ZERO,
            sweep_interval: Duration::ZERO,
        }
    }
}
