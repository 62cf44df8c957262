//! Pool configuration

use crate::constants::{
    AUTO_MIN_THREADS, MAX_POOL_THREADS, MIN_POOL_THREADS, RESIZE_DOWN_TOLERANCE,
    RESIZE_UP_TOLERANCE,
};
use crate::error::{PoolError, PoolResult};
use std::time::Duration;

/// What happens to queued tasks when the pool is dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownMode {
    /// Discard tasks still waiting in the queue; running tasks complete
    CancelPending,

    /// Run every queued task to completion before tearing down
    WaitForPending,
}

/// Pool construction parameters
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Minimum thread count. [`AUTO_MIN_THREADS`] resolves to twice the
    /// hardware concurrency, capped at `max_threads`.
    pub min_threads: u32,

    /// Maximum thread count the monitor may grow to
    pub max_threads: u32,

    /// Sustained-backlog window before the pool grows
    pub resize_up_tolerance: Duration,

    /// Sustained-idle window before the pool shrinks
    pub resize_down_tolerance: Duration,

    /// Drain policy applied on drop
    pub on_shutdown: ShutdownMode,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_threads: MIN_POOL_THREADS,
            max_threads: MAX_POOL_THREADS,
            resize_up_tolerance: RESIZE_UP_TOLERANCE,
            resize_down_tolerance: RESIZE_DOWN_TOLERANCE,
            on_shutdown: ShutdownMode::CancelPending,
        }
    }
}

impl PoolConfig {
    /// Create a configuration with the default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum thread count
    pub fn min_threads(mut self, n: u32) -> Self {
        self.min_threads = n;
        self
    }

    /// Derive the minimum thread count from the host CPU count
    pub fn auto_min_threads(mut self) -> Self {
        self.min_threads = AUTO_MIN_THREADS;
        self
    }

    /// Set the maximum thread count
    pub fn max_threads(mut self, n: u32) -> Self {
        self.max_threads = n;
        self
    }

    /// Set the backlog window before the pool grows
    pub fn resize_up_tolerance(mut self, d: Duration) -> Self {
        self.resize_up_tolerance = d;
        self
    }

    /// Set the idle window before the pool shrinks
    pub fn resize_down_tolerance(mut self, d: Duration) -> Self {
        self.resize_down_tolerance = d;
        self
    }

    /// Set the drain policy applied on drop
    pub fn on_shutdown(mut self, mode: ShutdownMode) -> Self {
        self.on_shutdown = mode;
        self
    }

    /// Resolve the [`AUTO_MIN_THREADS`] sentinel against the host CPU count.
    ///
    /// Falls back to a single thread when the CPU count is unavailable.
    pub fn resolved_min(&self) -> u32 {
        if self.min_threads != AUTO_MIN_THREADS {
            return self.min_threads;
        }

        let cpus = std::thread::available_parallelism()
            .map(|n| n.get() as u32)
            .unwrap_or(0);
        let candidate = if cpus == 0 { 1 } else { cpus * 2 };
        candidate.min(self.max_threads)
    }

    /// Validate the configuration
    pub fn validate(&self) -> PoolResult<()> {
        let min = self.resolved_min();
        if self.max_threads < min {
            return Err(PoolError::InvalidBounds {
                min,
                max: self.max_threads,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PoolConfig::default();
        assert_eq!(config.min_threads, MIN_POOL_THREADS);
        assert_eq!(config.max_threads, MAX_POOL_THREADS);
        assert_eq!(config.on_shutdown, ShutdownMode::CancelPending);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let config = PoolConfig::new()
            .min_threads(2)
            .max_threads(16)
            .resize_up_tolerance(Duration::from_millis(50))
            .resize_down_tolerance(Duration::from_secs(5))
            .on_shutdown(ShutdownMode::WaitForPending);

        assert_eq!(config.min_threads, 2);
        assert_eq!(config.max_threads, 16);
        assert_eq!(config.resize_up_tolerance, Duration::from_millis(50));
        assert_eq!(config.on_shutdown, ShutdownMode::WaitForPending);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let config = PoolConfig::new().min_threads(8).max_threads(4);
        assert_eq!(
            config.validate(),
            Err(PoolError::InvalidBounds { min: 8, max: 4 })
        );
    }

    #[test]
    fn test_auto_min_resolves_within_max() {
        let config = PoolConfig::new().auto_min_threads().max_threads(4);
        let min = config.resolved_min();
        assert!(min >= 1);
        assert!(min <= 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_auto_min_tracks_cpu_count() {
        let config = PoolConfig::new().auto_min_threads();
        if let Ok(cpus) = std::thread::available_parallelism() {
            assert_eq!(config.resolved_min(), (cpus.get() as u32) * 2);
        }
    }
}
