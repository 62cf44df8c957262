//! Error types for pool construction and worker management

use core::fmt;

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors that can occur while building or resizing a pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// `max_threads` is smaller than the resolved `min_threads`
    InvalidBounds { min: u32, max: u32 },

    /// The OS refused to spawn a worker thread
    WorkerSpawnFailed,

    /// The OS refused to spawn the monitor thread
    MonitorSpawnFailed,
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::InvalidBounds { min, max } => {
                write!(f, "invalid pool bounds: min {} exceeds max {}", min, max)
            }
            PoolError::WorkerSpawnFailed => write!(f, "failed to spawn worker thread"),
            PoolError::MonitorSpawnFailed => write!(f, "failed to spawn monitor thread"),
        }
    }
}

impl std::error::Error for PoolError {}
