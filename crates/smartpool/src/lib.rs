//! # smartpool - a self-sizing worker pool
//!
//! Executes caller-supplied tasks on a bounded, dynamically-resized set of
//! worker threads. Smart in the sense that the pool sizes itself: it grows
//! under sustained backlog and shrinks again after a long idle spell,
//! always staying within the configured minimum and maximum.
//!
//! ## Features
//!
//! - **Immediate and deferred dispatch**: `schedule`, `schedule_at`,
//!   `schedule_after`
//! - **Self-sizing**: a monitor thread samples load every millisecond and
//!   resizes multiplicatively, with anti-thrash hysteresis (fast up, slow
//!   down)
//! - **Panic isolation**: a panicking task never takes its worker down
//! - **Drain policies**: drop still-queued tasks on shutdown, or run every
//!   last one before returning
//!
//! ## Quick Start
//!
//! ```ignore
//! use smartpool::{Pool, PoolConfig, ShutdownMode};
//! use std::time::Duration;
//!
//! fn main() {
//!     let pool = Pool::new(
//!         PoolConfig::new()
//!             .min_threads(4)
//!             .max_threads(64)
//!             .on_shutdown(ShutdownMode::WaitForPending),
//!     )
//!     .expect("pool bounds are valid");
//!
//!     pool.schedule(|| println!("right away"));
//!     pool.schedule_after(|| println!("half a second later"), Duration::from_millis(500));
//!
//!     // Dropping the pool drains it per the shutdown mode and joins
//!     // every worker.
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                       Pool facade                       │
//! │        schedule / schedule_at / schedule_after          │
//! └─────────────────────────────────────────────────────────┘
//!                │ push + signal                 ▲ sample
//!                ▼                               │
//! ┌──────────────────────────────┐   ┌──────────────────────┐
//! │          TaskQueue           │   │       Monitor        │
//! │   FIFO, delayed records      │   │  1 ms tick, grows /  │
//! │   recirculate until due      │   │  shrinks the set     │
//! └──────────────────────────────┘   └──────────────────────┘
//!                │ pop                           │ grow/shrink
//!                ▼                               ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                       WorkerSet                         │
//! │      worker threads: park, fetch, run, repeat           │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees and non-guarantees
//!
//! Ready tasks are dequeued FIFO. A deferred task never starts before its
//! due instant, but may start a few milliseconds after it; this is not a
//! high-resolution timer service. There is no guarantee about which worker
//! runs a task, no task priority, and no way to interrupt a task that has
//! already started. Task errors are not reported back; wrap the closure in
//! a channel or promise if the result matters.

// Re-export core types
pub use smartpool_core::config::{PoolConfig, ShutdownMode};
pub use smartpool_core::constants;
pub use smartpool_core::constants::AUTO_MIN_THREADS;
pub use smartpool_core::error::{PoolError, PoolResult};
pub use smartpool_core::task::{Task, TaskRecord};

// Re-export logging controls
pub use smartpool_core::log::{self, LogLevel};
pub use smartpool_core::{sp_debug, sp_error, sp_info, sp_log, sp_trace, sp_warn};

// Re-export env utilities
pub use smartpool_core::env::{env_get, env_get_bool};

// The pool itself
pub use smartpool_runtime::Pool;
