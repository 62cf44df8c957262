//! # smartpool-core
//!
//! Core types for the smartpool self-sizing worker pool.
//!
//! This crate is thread-free: it defines the value types, configuration,
//! counters and diagnostics shared by the runtime, but spawns nothing.
//! All threading lives in `smartpool-runtime`.
//!
//! ## Modules
//!
//! - `task` - task record (closure + optional due instant)
//! - `config` - pool configuration builder
//! - `counters` - atomic load counters sampled by the monitor
//! - `error` - error types
//! - `log` - leveled stderr logging macros
//! - `env` - environment variable utilities

pub mod config;
pub mod counters;
pub mod env;
pub mod error;
pub mod log;
pub mod task;

// Re-exports for convenience
pub use config::{PoolConfig, ShutdownMode};
pub use counters::PoolCounters;
pub use env::{env_get, env_get_bool};
pub use error::{PoolError, PoolResult};
pub use log::LogLevel;
pub use task::{Task, TaskRecord};

/// Pool-wide constants
pub mod constants {
    use std::time::Duration;

    /// Default minimum number of worker threads
    pub const MIN_POOL_THREADS: u32 = 8;

    /// Default maximum number of worker threads
    pub const MAX_POOL_THREADS: u32 = 1000;

    /// Sentinel for "pick the minimum from the host CPU count"
    ///
    /// Resolves to `min(hardware_concurrency * 2, max_threads)` at
    /// construction time.
    pub const AUTO_MIN_THREADS: u32 = u32::MAX;

    /// Default backlog window before the pool grows
    pub const RESIZE_UP_TOLERANCE: Duration = Duration::from_millis(100);

    /// Default idle window before the pool shrinks
    pub const RESIZE_DOWN_TOLERANCE: Duration = Duration::from_millis(120_000);

    /// Growth factor applied to the thread count when the pool resizes up
    pub const RESIZE_UP_FACTOR: f64 = 1.5;

    /// Shrink divisor applied to the thread count when the pool resizes down
    pub const RESIZE_DOWN_FACTOR: f64 = 2.0;

    /// Monitor sample interval
    pub const MONITOR_TICK: Duration = Duration::from_millis(1);

    /// Back-off used by a worker when the queue head is not yet due,
    /// and by the shutdown drain loop
    pub const WORKER_IDLE_TICK: Duration = Duration::from_millis(2);

    /// Lower bound on the number of consecutive monitor samples required
    /// before a resize fires
    pub const MIN_RESIZE_STEPS: u32 = 2;
}
