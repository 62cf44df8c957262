//! Atomic load counters sampled by the monitor.
//!
//! `threads` mirrors the worker-set length and `active` counts closures in
//! flight. Both are kept as standalone atomics because the monitor reads
//! them every millisecond and must not touch either pool lock to do so.

use std::sync::atomic::{AtomicU32, Ordering};

/// Lock-free view of pool load
#[derive(Debug, Default)]
pub struct PoolCounters {
    active: AtomicU32,
    threads: AtomicU32,
}

impl PoolCounters {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of task closures currently executing
    #[inline]
    pub fn active(&self) -> u32 {
        self.active.load(Ordering::Acquire)
    }

    /// Number of worker threads in the pool
    #[inline]
    pub fn threads(&self) -> u32 {
        self.threads.load(Ordering::Acquire)
    }

    /// A worker is about to invoke a task closure
    #[inline]
    pub fn task_started(&self) {
        self.active.fetch_add(1, Ordering::AcqRel);
    }

    /// The task closure returned, normally or by panic
    #[inline]
    pub fn task_finished(&self) {
        self.active.fetch_sub(1, Ordering::AcqRel);
    }

    /// A worker joined the set
    #[inline]
    pub fn thread_added(&self) {
        self.threads.fetch_add(1, Ordering::AcqRel);
    }

    /// A worker left the set
    #[inline]
    pub fn thread_removed(&self) {
        self.threads.fetch_sub(1, Ordering::AcqRel);
    }
}
