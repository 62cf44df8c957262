//! # smartpool-runtime
//!
//! Threaded implementation of the self-sizing worker pool: the task queue,
//! the worker fetch loop, worker-set membership, and the monitor thread
//! that resizes the pool under load.
//!
//! The only public item is [`Pool`]; everything else is internal plumbing.
//! Applications normally depend on the `smartpool` facade crate instead.

mod monitor;
mod pool;
mod queue;
mod set;
mod worker;

pub use pool::Pool;
