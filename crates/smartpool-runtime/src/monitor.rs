//! Monitor thread: samples load every millisecond and resizes the pool.
//!
//! The policy is a hysteresis filter over per-tick load classifications.
//! A tick reads `up` when every thread is running a task and work is still
//! queued, `down` when fewer than a quarter of the threads are running
//! anything, and `none` otherwise. Only an unbroken run of same-direction
//! ticks, as long as the configured tolerance, triggers a resize; any
//! disagreement resets the run. The up tolerance is short and the down
//! tolerance long, so the pool reacts to backlog quickly but gives up
//! threads reluctantly.
//!
//! Resizes are multiplicative: grow to `ceil(threads * 1.5)` capped at the
//! maximum, shrink to `floor(threads / 2)` floored at the minimum.

use crate::pool::PoolShared;
use crate::set::WorkerSet;
use smartpool_core::constants::{
    MIN_RESIZE_STEPS, MONITOR_TICK, RESIZE_DOWN_FACTOR, RESIZE_UP_FACTOR,
};
use smartpool_core::error::{PoolError, PoolResult};
use smartpool_core::{sp_debug, sp_warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Verdict of a single load sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    None,
    Up,
    Down,
}

/// Resize decision emitted by the hysteresis filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResizeAction {
    Grow,
    Shrink,
}

/// Classify one sample of the counters
fn classify(active: u32, threads: u32, pending: u32) -> Direction {
    if active == threads && pending > 0 {
        // every thread is occupied and work is waiting
        Direction::Up
    } else if active < threads / 4 {
        // over three quarters of the pool is idle
        Direction::Down
    } else {
        Direction::None
    }
}

/// Next pool size when growing. Floored at 1 so an empty pool can
/// bootstrap its first worker.
fn grow_target(threads: u32, max_threads: u32) -> u32 {
    let scaled = (threads as f64 * RESIZE_UP_FACTOR).ceil() as u32;
    scaled.max(1).min(max_threads)
}

/// Next pool size when shrinking
fn shrink_target(threads: u32, min_threads: u32) -> u32 {
    let scaled = (threads as f64 / RESIZE_DOWN_FACTOR).floor() as u32;
    scaled.max(min_threads)
}

/// Convert a tolerance window into a number of monitor ticks, with the
/// floor the policy requires
fn tolerance_steps(tolerance: Duration) -> u32 {
    (tolerance.as_millis() as u32).max(MIN_RESIZE_STEPS)
}

/// Hysteresis filter: emits an action only after enough consecutive
/// samples agree on a direction. Emitting resets the filter.
struct Hysteresis {
    direction: Direction,
    steps: u32,
    up_steps: u32,
    down_steps: u32,
}

impl Hysteresis {
    fn new(up_steps: u32, down_steps: u32) -> Self {
        Self {
            direction: Direction::None,
            steps: 0,
            up_steps,
            down_steps,
        }
    }

    fn observe(&mut self, sample: Direction) -> Option<ResizeAction> {
        if sample != self.direction {
            self.direction = sample;
            self.steps = 0;
            return None;
        }

        self.steps = self.steps.saturating_add(1);

        let action = match self.direction {
            Direction::Up if self.steps == self.up_steps => Some(ResizeAction::Grow),
            Direction::Down if self.steps == self.down_steps => Some(ResizeAction::Shrink),
            _ => None,
        };

        if action.is_some() {
            // The counter resets even when the resize turns out to be a
            // no-op (already at the floor or ceiling).
            self.direction = Direction::None;
            self.steps = 0;
        }

        action
    }
}

/// Handle to the dedicated monitor thread
pub(crate) struct MonitorThread {
    handle: Option<JoinHandle<()>>,
}

impl MonitorThread {
    /// Spawn the monitor. It exits when the pool starts retiring; signal
    /// `monitor_cv` to make that prompt.
    pub(crate) fn start(
        shared: Arc<PoolShared>,
        set: Arc<WorkerSet>,
        up_tolerance: Duration,
        down_tolerance: Duration,
    ) -> PoolResult<Self> {
        let up_steps = tolerance_steps(up_tolerance);
        let down_steps = tolerance_steps(down_tolerance);

        let handle = thread::Builder::new()
            .name("smartpool-monitor".to_string())
            .spawn(move || monitor_loop(shared, set, up_steps, down_steps))
            .map_err(|err| {
                sp_warn!("failed to spawn monitor thread: {}", err);
                PoolError::MonitorSpawnFailed
            })?;

        Ok(Self {
            handle: Some(handle),
        })
    }

    pub(crate) fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn monitor_loop(shared: Arc<PoolShared>, set: Arc<WorkerSet>, up_steps: u32, down_steps: u32) {
    let mut hysteresis = Hysteresis::new(up_steps, down_steps);

    // The membership lock is held across the whole loop and released only
    // inside the timed wait, the same way the workers hold the queue lock
    // around their waits.
    let mut members = set.lock();

    while !shared.is_retiring() {
        let active = shared.counters.active();
        let threads = shared.counters.threads();
        let pending = shared.queue.len_hint();

        match hysteresis.observe(classify(active, threads, pending)) {
            Some(ResizeAction::Grow) => {
                let target = grow_target(threads, shared.max_threads);
                sp_debug!("monitor: sustained backlog, growing {} -> {}", threads, target);
                if let Err(err) = WorkerSet::grow_locked(&mut members, &shared, target) {
                    sp_warn!("monitor: grow failed: {}", err);
                }
            }
            Some(ResizeAction::Shrink) => {
                let target = shrink_target(threads, shared.min_threads);
                if target < threads {
                    sp_debug!("monitor: pool idle, shrinking {} -> {}", threads, target);
                    WorkerSet::shrink_idle_locked(&mut members, &shared, threads - target);
                }
            }
            None => {}
        }

        let (guard, _) = set.monitor_cv.wait_timeout(members, MONITOR_TICK).unwrap();
        members = guard;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_backlog_means_up() {
        assert_eq!(classify(2, 2, 5), Direction::Up);
        assert_eq!(classify(8, 8, 1), Direction::Up);
        // a bootstrapping pool with no threads but queued work grows too
        assert_eq!(classify(0, 0, 3), Direction::Up);
    }

    #[test]
    fn test_classify_full_but_drained_is_none() {
        assert_eq!(classify(2, 2, 0), Direction::None);
    }

    #[test]
    fn test_classify_mostly_idle_means_down() {
        assert_eq!(classify(0, 8, 0), Direction::Down);
        assert_eq!(classify(1, 8, 0), Direction::Down);
    }

    #[test]
    fn test_classify_small_pools_never_shrink() {
        // integer division: a quarter of fewer than five threads is zero
        assert_eq!(classify(0, 2, 0), Direction::None);
        assert_eq!(classify(0, 4, 0), Direction::None);
        assert_eq!(classify(0, 5, 0), Direction::Down);
    }

    #[test]
    fn test_classify_moderate_load_is_none() {
        assert_eq!(classify(3, 8, 0), Direction::None);
        assert_eq!(classify(7, 8, 4), Direction::None);
    }

    #[test]
    fn test_grow_target_scaling() {
        assert_eq!(grow_target(2, 8), 3);
        assert_eq!(grow_target(3, 8), 5); // ceil(4.5)
        assert_eq!(grow_target(6, 8), 8); // capped
        assert_eq!(grow_target(8, 8), 8);
        assert_eq!(grow_target(0, 8), 1); // bootstrap floor
    }

    #[test]
    fn test_shrink_target_scaling() {
        assert_eq!(shrink_target(8, 2), 4);
        assert_eq!(shrink_target(4, 2), 2);
        assert_eq!(shrink_target(2, 2), 2); // already at the floor
        assert_eq!(shrink_target(5, 1), 2); // floor(2.5)
    }

    #[test]
    fn test_tolerance_steps_floor() {
        assert_eq!(tolerance_steps(Duration::from_millis(0)), 2);
        assert_eq!(tolerance_steps(Duration::from_millis(1)), 2);
        assert_eq!(tolerance_steps(Duration::from_millis(100)), 100);
    }

    #[test]
    fn test_hysteresis_fires_after_tolerance() {
        let mut h = Hysteresis::new(3, 5);

        // the first Up sample flips the direction and resets the count
        assert_eq!(h.observe(Direction::Up), None);
        assert_eq!(h.observe(Direction::Up), None);
        assert_eq!(h.observe(Direction::Up), None);
        assert_eq!(h.observe(Direction::Up), Some(ResizeAction::Grow));
    }

    #[test]
    fn test_hysteresis_resets_on_direction_change() {
        let mut h = Hysteresis::new(3, 5);

        assert_eq!(h.observe(Direction::Up), None);
        assert_eq!(h.observe(Direction::Up), None);
        assert_eq!(h.observe(Direction::None), None); // run broken
        assert_eq!(h.observe(Direction::Up), None);
        assert_eq!(h.observe(Direction::Up), None);
        assert_eq!(h.observe(Direction::Up), None);
        assert_eq!(h.observe(Direction::Up), Some(ResizeAction::Grow));
    }

    #[test]
    fn test_hysteresis_resets_after_firing() {
        let mut h = Hysteresis::new(2, 2);

        assert_eq!(h.observe(Direction::Down), None);
        assert_eq!(h.observe(Direction::Down), None);
        assert_eq!(h.observe(Direction::Down), Some(ResizeAction::Shrink));

        // state is back to neutral: the same run length is needed again
        assert_eq!(h.observe(Direction::Down), None);
        assert_eq!(h.observe(Direction::Down), None);
        assert_eq!(h.observe(Direction::Down), Some(ResizeAction::Shrink));
    }

    #[test]
    fn test_hysteresis_never_fires_on_none() {
        let mut h = Hysteresis::new(2, 2);
        for _ in 0..100 {
            assert_eq!(h.observe(Direction::None), None);
        }
    }
}
