//! Worker-set membership: grow, opportunistic shrink, shutdown join.
//!
//! The membership list lives under its own mutex, distinct from the queue
//! lock. Lock order when both are held: set lock first, then queue lock.
//! No path takes the set lock while holding the queue lock.

use crate::pool::PoolShared;
use crate::worker::{self, WorkerNode};
use smartpool_core::error::PoolResult;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

pub(crate) struct WorkerSet {
    members: Mutex<Vec<Arc<WorkerNode>>>,

    /// Parks the monitor between samples; shutdown signals it so teardown
    /// does not wait out a full tick.
    pub(crate) monitor_cv: Condvar,
}

impl WorkerSet {
    pub(crate) fn new() -> Self {
        Self {
            members: Mutex::new(Vec::new()),
            monitor_cv: Condvar::new(),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Vec<Arc<WorkerNode>>> {
        self.members.lock().unwrap()
    }

    /// Spawn workers until the set holds `target` threads
    pub(crate) fn grow_to(&self, shared: &Arc<PoolShared>, target: u32) -> PoolResult<()> {
        let mut members = self.lock();
        Self::grow_locked(&mut members, shared, target)
    }

    /// Grow with the membership lock already held (the monitor holds it
    /// across its whole loop)
    pub(crate) fn grow_locked(
        members: &mut Vec<Arc<WorkerNode>>,
        shared: &Arc<PoolShared>,
        target: u32,
    ) -> PoolResult<()> {
        while (members.len() as u32) < target {
            let node = worker::spawn_worker(shared)?;
            members.push(node);
            shared.counters.thread_added();
        }
        Ok(())
    }

    /// Remove up to `count` workers currently observed idle.
    ///
    /// Workers found busy are skipped this pass, not retried, so a single
    /// call may remove fewer than `count`.
    pub(crate) fn shrink_idle_locked(
        members: &mut Vec<Arc<WorkerNode>>,
        shared: &PoolShared,
        mut count: u32,
    ) {
        let mut i = 0;
        while i < members.len() && count > 0 {
            let node = Arc::clone(&members[i]);

            let stopped = {
                // The queue lock pins the worker either inside its parked
                // wait or before its next predicate check, so a stop flag
                // raised here is observed before it can take another task.
                let _tasks = shared.queue.tasks.lock().unwrap();
                if node.is_busy() {
                    false
                } else {
                    node.request_stop();
                    // A condvar cannot wake a chosen waiter; wake everyone
                    // and let the survivors re-check their predicate.
                    shared.queue.ready_cv.notify_all();
                    true
                }
            };

            if !stopped {
                i += 1;
                continue;
            }

            node.join();
            members.remove(i);
            shared.counters.thread_removed();
            count -= 1;
        }
    }

    /// Join and drop every worker. The caller has already raised the
    /// shutdown flag and broadcast the queue condvar.
    pub(crate) fn join_all(&self, shared: &PoolShared) {
        let mut members = self.lock();
        for node in members.drain(..) {
            node.join();
            shared.counters.thread_removed();
        }
    }
}
