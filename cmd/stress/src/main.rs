//! Stress test - watch the pool resize under load
//!
//! Floods the pool with short sleeping tasks, prints the pool size while
//! the monitor grows it, then waits out the idle window and prints the
//! size again after the shrink.

use smartpool::{Pool, PoolConfig, ShutdownMode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn main() {
    println!("=== smartpool stress test ===\n");

    let num_tasks: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(500);

    let config = PoolConfig::new()
        .min_threads(2)
        .max_threads(64)
        .resize_up_tolerance(Duration::from_millis(50))
        .resize_down_tolerance(Duration::from_millis(2000))
        .on_shutdown(ShutdownMode::WaitForPending);

    let pool = Pool::new(config).expect("pool bounds are valid");
    println!("Pool up with {} workers, scheduling {} tasks", pool.pool_size(), num_tasks);

    let completed = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    for _ in 0..num_tasks {
        let completed = Arc::clone(&completed);
        pool.schedule(move || {
            std::thread::sleep(Duration::from_millis(25));
            completed.fetch_add(1, Ordering::SeqCst);
        });
    }

    // Watch the monitor grow the pool while the backlog drains
    while completed.load(Ordering::SeqCst) < num_tasks {
        println!(
            "t={:>5} ms  size={:<3} active={:<3} pending={}",
            start.elapsed().as_millis(),
            pool.pool_size(),
            pool.active_tasks(),
            pool.pending_tasks()
        );
        std::thread::sleep(Duration::from_millis(200));
    }

    let busy_time = start.elapsed();
    println!(
        "\nAll {} tasks done in {:?}, peak-ish size {}",
        num_tasks,
        busy_time,
        pool.pool_size()
    );

    // Idle past the down tolerance and watch it shrink back
    println!("\nIdling so the pool shrinks...");
    std::thread::sleep(Duration::from_millis(5500));
    println!("Pool size after idle: {}", pool.pool_size());
}
