//! Basic smartpool example
//!
//! Demonstrates immediate and deferred scheduling, and the wait-for-pending
//! drain policy on shutdown.

use smartpool::{Pool, PoolConfig, ShutdownMode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn main() {
    println!("=== smartpool basic example ===\n");

    let config = PoolConfig::new()
        .min_threads(2)
        .max_threads(4)
        .on_shutdown(ShutdownMode::WaitForPending);

    let pool = Pool::new(config).expect("pool bounds are valid");
    println!(
        "Pool up: {} workers, {} active, {} pending\n",
        pool.pool_size(),
        pool.active_tasks(),
        pool.pending_tasks()
    );

    let completed = Arc::new(AtomicUsize::new(0));

    // A handful of immediate tasks
    for i in 0..8 {
        let completed = Arc::clone(&completed);
        pool.schedule(move || {
            println!("[task {}] running on {:?}", i, std::thread::current().name());
            std::thread::sleep(Duration::from_millis(20));
            completed.fetch_add(1, Ordering::SeqCst);
        });
    }

    // One deferred task
    {
        let completed = Arc::clone(&completed);
        pool.schedule_after(
            move || {
                println!("[deferred] 150 ms later");
                completed.fetch_add(1, Ordering::SeqCst);
            },
            Duration::from_millis(150),
        );
    }

    println!(
        "Scheduled 9 tasks: {} active, {} pending",
        pool.active_tasks(),
        pool.pending_tasks()
    );

    // Dropping the pool waits for every task (WaitForPending)
    drop(pool);

    println!("\nAll done: {} tasks completed", completed.load(Ordering::SeqCst));
}
