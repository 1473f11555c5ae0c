//! Background Tasks Module
//!
//! Contains background tasks that run alongside a store.
//!
//! # Tasks
//! - TTL Sweep: Removes expired entries at the configured interval

mod sweep;

pub(crate) use sweep::Sweeper;
