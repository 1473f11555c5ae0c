//! TTL Sweep Task
//!
//! Background loop that periodically removes expired cache entries until its
//! cancellation token fires. The loop runs as a task on the caller's Tokio
//! runtime, or on a dedicated thread with its own runtime when there is none.

use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tokio::runtime::{Builder, Handle};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::cache::StoreCore;

/// Runs a sweep pass on `core` every `interval` until `token` is cancelled.
///
/// The first pass happens one full interval after start. A pass that overruns
/// delays the following ones instead of bursting to catch up.
async fn run_sweep_loop(core: Arc<StoreCore>, interval: Duration, token: CancellationToken) {
    info!(interval = ?interval, "Starting TTL sweep task");

    let mut ticker = interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                let removed = core.purge_expired();
                if removed > 0 {
                    info!(removed, "TTL sweep: removed expired entries");
                } else {
                    debug!("TTL sweep: no expired entries found");
                }
            }
        }
    }

    info!("TTL sweep task stopped");
}

/// Spawns the sweep loop as a task on `handle`.
///
/// # Arguments
/// * `handle` - Runtime the task is spawned onto
/// * `core` - Shared store state to sweep
/// * `interval` - Time between sweep passes
/// * `token` - Cancellation signal, fired at store teardown
pub(crate) fn spawn_sweep_task(
    handle: &Handle,
    core: Arc<StoreCore>,
    interval: Duration,
    token: CancellationToken,
) -> JoinHandle<()> {
    handle.spawn(run_sweep_loop(core, interval, token))
}

/// Spawns the sweep loop on a dedicated thread driving a current-thread
/// runtime with only the timer enabled.
pub(crate) fn spawn_sweep_thread(
    core: Arc<StoreCore>,
    interval: Duration,
    token: CancellationToken,
) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("ttl-sweeper".to_string())
        .spawn(move || {
            match Builder::new_current_thread().enable_time().build() {
                Ok(runtime) => runtime.block_on(run_sweep_loop(core, interval, token)),
                Err(err) => error!(%err, "Failed to build TTL sweep runtime"),
            }
        })
}

// == Sweeper ==
#[derive(Debug)]
enum Driver {
    Task(JoinHandle<()>),
    Thread(thread::JoinHandle<()>),
    /// The sweep thread could not be started; expiration stays lazy.
    Idle,
}

/// Owning handle for a running sweep loop.
#[derive(Debug)]
pub(crate) struct Sweeper {
    token: CancellationToken,
    driver: Driver,
}

impl Sweeper {
    /// Starts sweeping on the current Tokio runtime, or on a dedicated thread
    /// when called outside one.
    pub fn spawn(core: Arc<StoreCore>, interval: Duration) -> Self {
        let token = CancellationToken::new();
        let driver = match Handle::try_current() {
            Ok(runtime) => {
                Driver::Task(spawn_sweep_task(&runtime, core, interval, token.clone()))
            }
            Err(_) => match spawn_sweep_thread(core, interval, token.clone()) {
                Ok(handle) => Driver::Thread(handle),
                Err(err) => {
                    error!(%err, "Failed to spawn TTL sweep thread, expiration stays lazy");
                    Driver::Idle
                }
            },
        };
        Self { token, driver }
    }

    pub fn is_running(&self) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        match &self.driver {
            Driver::Task(handle) => !handle.is_finished(),
            Driver::Thread(handle) => !handle.is_finished(),
            Driver::Idle => false,
        }
    }

    /// Signals the loop to stop without waiting for it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Signals the loop to stop and waits for it to exit.
    pub async fn shutdown(self) {
        self.token.cancel();
        match self.driver {
            // Only fails if the task panicked or the runtime is shutting down
            Driver::Task(handle) => {
                let _ = handle.await;
            }
            // The thread exits as soon as its select observes the token
            Driver::Thread(handle) => {
                let _ = handle.join();
            }
            Driver::Idle => {}
        }
    }

    #[cfg(test)]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    #[cfg(test)]
    pub fn runs_on_thread(&self) -> bool {
        matches!(self.driver, Driver::Thread(_))
    }
}
