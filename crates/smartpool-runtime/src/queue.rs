//! FIFO task queue with delayed-dispatch recirculation.
//!
//! A plain mutex-guarded `VecDeque` with a condvar for parked workers.
//! Delayed records are not kept in a separate structure: a worker that pops
//! a not-yet-due record pushes it back to the tail and backs off briefly,
//! so ready tasks keep flowing past it. The queue also maintains an atomic
//! length mirror so the monitor can sample the backlog without the lock.

use smartpool_core::task::TaskRecord;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Condvar, Mutex};

pub(crate) struct TaskQueue {
    /// Pending records, FIFO. Every mutation happens under this lock.
    pub(crate) tasks: Mutex<VecDeque<TaskRecord>>,

    /// Signalled on every push, broadcast on shutdown and by the shrinker.
    pub(crate) ready_cv: Condvar,

    /// Length mirror for the monitor's sample loop. Updated under the lock,
    /// read without it; may lag the queue by one update.
    len_hint: AtomicU32,
}

impl TaskQueue {
    pub(crate) fn new() -> Self {
        Self {
            tasks: Mutex::new(VecDeque::new()),
            ready_cv: Condvar::new(),
            len_hint: AtomicU32::new(0),
        }
    }

    /// Number of queued records, taking the lock
    pub(crate) fn len(&self) -> u32 {
        self.tasks.lock().unwrap().len() as u32
    }

    /// Lock-free backlog sample
    #[inline]
    pub(crate) fn len_hint(&self) -> u32 {
        self.len_hint.load(Ordering::Acquire)
    }

    /// Refresh the length mirror. Call while holding the queue lock.
    #[inline]
    pub(crate) fn sync_len(&self, len: usize) {
        self.len_hint.store(len as u32, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn test_len_hint_mirrors_queue() {
        let queue = TaskQueue::new();

        {
            let mut tasks = queue.tasks.lock().unwrap();
            tasks.push_back(TaskRecord::immediate(Box::new(|| {})));
            tasks.push_back(TaskRecord::immediate(Box::new(|| {})));
            queue.sync_len(tasks.len());
        }

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.len_hint(), 2);

        {
            let mut tasks = queue.tasks.lock().unwrap();
            tasks.pop_front();
            queue.sync_len(tasks.len());
        }

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.len_hint(), 1);
    }

    #[test]
    fn test_records_pop_in_push_order() {
        let queue = TaskQueue::new();
        let order = Arc::new(AtomicUsize::new(0));

        {
            let mut tasks = queue.tasks.lock().unwrap();
            for i in 0..3usize {
                let order = Arc::clone(&order);
                tasks.push_back(TaskRecord::immediate(Box::new(move || {
                    // each record asserts it runs in submission order
                    assert_eq!(order.fetch_add(1, Ordering::SeqCst), i);
                })));
            }
            queue.sync_len(tasks.len());
        }

        loop {
            let record = {
                let mut tasks = queue.tasks.lock().unwrap();
                let record = tasks.pop_front();
                queue.sync_len(tasks.len());
                record
            };
            match record {
                Some(record) => record.run(),
                None => break,
            }
        }

        assert_eq!(order.load(Ordering::SeqCst), 3);
    }
}
