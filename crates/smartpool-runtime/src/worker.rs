//! Worker threads and the task-fetch loop.
//!
//! Each worker owns one OS thread and carries two flags: `busy`, false
//! exactly while the worker is parked on the empty-queue wait, and `stop`,
//! raised by the shrinker or shutdown and honoured at the loop's safe
//! points. A running task is never interrupted.

use crate::pool::PoolShared;
use smartpool_core::constants::WORKER_IDLE_TICK;
use smartpool_core::error::{PoolError, PoolResult};
use smartpool_core::{sp_trace, sp_warn};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// One member of the worker set.
///
/// The set holds nodes behind `Arc` so a shrink pass can keep its reference
/// alive across the join even after removing the node from the list.
pub(crate) struct WorkerNode {
    /// False exactly while parked on the empty-queue wait. Written only by
    /// the owning worker, under the queue lock.
    busy: AtomicBool,

    /// Exit request. Written under the set lock, read at every safe point.
    stop: AtomicBool,

    /// Join handle, taken exactly once on removal
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl WorkerNode {
    /// Nodes start busy so a shrink pass cannot pick a worker that has not
    /// parked for the first time yet.
    fn new() -> Self {
        Self {
            busy: AtomicBool::new(true),
            stop: AtomicBool::new(false),
            handle: Mutex::new(None),
        }
    }

    #[inline]
    pub(crate) fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    #[inline]
    fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::Release);
    }

    /// Ask the worker to exit at its next safe point
    pub(crate) fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    #[inline]
    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    fn attach(&self, handle: JoinHandle<()>) {
        *self.handle.lock().unwrap() = Some(handle);
    }

    /// Join the worker thread. The stop or shutdown flag must already be
    /// raised and the queue condvar signalled, or this blocks.
    pub(crate) fn join(&self) {
        let handle = self.handle.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

/// Spawn a worker thread and hand back its node
pub(crate) fn spawn_worker(shared: &Arc<PoolShared>) -> PoolResult<Arc<WorkerNode>> {
    let node = Arc::new(WorkerNode::new());
    let thread_shared = Arc::clone(shared);
    let thread_node = Arc::clone(&node);
    let seq = shared.next_worker_seq();

    let handle = thread::Builder::new()
        .name(format!("smartpool-worker-{}", seq))
        .spawn(move || fetch_loop(thread_shared, thread_node))
        .map_err(|err| {
            sp_warn!("failed to spawn worker thread: {}", err);
            PoolError::WorkerSpawnFailed
        })?;

    node.attach(handle);
    Ok(node)
}

/// The worker main loop.
///
/// Waits for the queue to become non-empty, pops the front record, and
/// either runs it or, when the record is not yet due, pushes it back to the
/// tail and backs off for one idle tick. Exit paths: the shutdown flag or
/// this worker's stop flag, checked at the top of the loop, after every
/// wait, and after every completed task.
fn fetch_loop(shared: Arc<PoolShared>, node: Arc<WorkerNode>) {
    loop {
        let record = {
            let mut tasks = shared.queue.tasks.lock().unwrap();

            if shared.is_shutting_down() || node.stop_requested() {
                return;
            }

            loop {
                match tasks.pop_front() {
                    Some(record) => {
                        if record.is_ready(Instant::now()) {
                            shared.queue.sync_len(tasks.len());
                            break record;
                        }

                        // Not due yet: recirculate to the tail so ready
                        // tasks keep flowing, and nap instead of spinning
                        // on the head.
                        tasks.push_back(record);
                        let (guard, _) = shared
                            .queue
                            .ready_cv
                            .wait_timeout(tasks, WORKER_IDLE_TICK)
                            .unwrap();
                        tasks = guard;

                        if shared.is_shutting_down() || node.stop_requested() {
                            return;
                        }
                    }
                    None => {
                        // The park point. Spurious wakes fall through the
                        // predicate and wait again.
                        node.set_busy(false);
                        tasks = shared.queue.ready_cv.wait(tasks).unwrap();
                        node.set_busy(true);

                        if shared.is_shutting_down() || node.stop_requested() {
                            return;
                        }
                    }
                }
            }
        };

        shared.counters.task_started();
        let outcome = panic::catch_unwind(AssertUnwindSafe(move || record.run()));
        shared.counters.task_finished();

        if outcome.is_err() {
            sp_trace!("worker: task panicked, continuing");
        }

        if node.stop_requested() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::shared_for_tests;
    use smartpool_core::task::{Task, TaskRecord};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn push_task(shared: &PoolShared, task: Task) {
        push_record(shared, TaskRecord::immediate(task));
    }

    fn push_record(shared: &PoolShared, record: TaskRecord) {
        let mut tasks = shared.queue.tasks.lock().unwrap();
        tasks.push_back(record);
        shared.queue.sync_len(tasks.len());
        shared.queue.ready_cv.notify_one();
    }

    fn halt(shared: &PoolShared, node: &WorkerNode) {
        {
            let _tasks = shared.queue.tasks.lock().unwrap();
            shared.raise_shutdown();
            shared.queue.ready_cv.notify_all();
        }
        node.join();
    }

    fn wait_until(deadline: Duration, mut cond: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        cond()
    }

    #[test]
    fn test_worker_runs_queued_tasks() {
        let shared = shared_for_tests(1, 1);
        let node = spawn_worker(&shared).unwrap();

        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let counter = Arc::clone(&counter);
            push_task(&shared, Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }

        assert!(wait_until(Duration::from_secs(2), || {
            counter.load(Ordering::SeqCst) == 3
        }));

        halt(&shared, &node);
    }

    #[test]
    fn test_worker_survives_task_panic() {
        let shared = shared_for_tests(1, 1);
        let node = spawn_worker(&shared).unwrap();

        let counter = Arc::new(AtomicUsize::new(0));
        push_task(&shared, Box::new(|| panic!("boom")));
        {
            let counter = Arc::clone(&counter);
            push_task(&shared, Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }

        assert!(wait_until(Duration::from_secs(2), || {
            counter.load(Ordering::SeqCst) == 1
        }));
        assert_eq!(shared.counters.active(), 0);

        halt(&shared, &node);
    }

    #[test]
    fn test_worker_defers_task_until_due() {
        let shared = shared_for_tests(1, 1);
        let node = spawn_worker(&shared).unwrap();

        let due = Instant::now() + Duration::from_millis(120);
        let ran_at: Arc<Mutex<Option<Instant>>> = Arc::new(Mutex::new(None));
        {
            let ran_at = Arc::clone(&ran_at);
            push_record(
                &shared,
                TaskRecord::scheduled(
                    Box::new(move || {
                        *ran_at.lock().unwrap() = Some(Instant::now());
                    }),
                    due,
                ),
            );
        }

        thread::sleep(Duration::from_millis(40));
        assert!(ran_at.lock().unwrap().is_none());

        assert!(wait_until(Duration::from_secs(2), || {
            ran_at.lock().unwrap().is_some()
        }));
        let ran_at = ran_at.lock().unwrap().unwrap();
        assert!(ran_at >= due);

        halt(&shared, &node);
    }

    #[test]
    fn test_worker_exits_on_stop() {
        let shared = shared_for_tests(1, 1);
        let node = spawn_worker(&shared).unwrap();

        // let it reach the park point
        assert!(wait_until(Duration::from_secs(2), || !node.is_busy()));

        {
            let _tasks = shared.queue.tasks.lock().unwrap();
            node.request_stop();
            shared.queue.ready_cv.notify_all();
        }
        node.join();
    }
}
