//! Pool construction, scheduling, and shutdown.

use crate::monitor::MonitorThread;
use crate::queue::TaskQueue;
use crate::set::WorkerSet;
use smartpool_core::config::{PoolConfig, ShutdownMode};
use smartpool_core::constants::WORKER_IDLE_TICK;
use smartpool_core::counters::PoolCounters;
use smartpool_core::error::PoolResult;
use smartpool_core::task::TaskRecord;
use smartpool_core::{log, sp_debug};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// State shared by the pool facade, its workers, and the monitor
pub(crate) struct PoolShared {
    /// Shrink floor, after auto resolution
    pub(crate) min_threads: u32,

    /// Growth ceiling
    pub(crate) max_threads: u32,

    pub(crate) queue: TaskQueue,
    pub(crate) counters: PoolCounters,

    /// Names worker threads; never reused within one pool
    worker_seq: AtomicU32,

    /// First shutdown phase: schedule() rejects work, the monitor exits
    retiring: AtomicBool,

    /// Second shutdown phase: workers exit. Raised only once the drain
    /// policy is satisfied.
    shutting_down: AtomicBool,
}

impl PoolShared {
    fn new(min_threads: u32, max_threads: u32) -> Self {
        Self {
            min_threads,
            max_threads,
            queue: TaskQueue::new(),
            counters: PoolCounters::new(),
            worker_seq: AtomicU32::new(0),
            retiring: AtomicBool::new(false),
            shutting_down: AtomicBool::new(false),
        }
    }

    #[inline]
    pub(crate) fn is_retiring(&self) -> bool {
        self.retiring.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    /// Raise while holding the queue lock so a racing schedule() is either
    /// fully queued or fully dropped
    pub(crate) fn raise_retiring(&self) {
        self.retiring.store(true, Ordering::Release);
    }

    /// Raise while holding the queue lock, then broadcast `ready_cv`
    pub(crate) fn raise_shutdown(&self) {
        self.shutting_down.store(true, Ordering::Release);
    }

    pub(crate) fn next_worker_seq(&self) -> u32 {
        self.worker_seq.fetch_add(1, Ordering::Relaxed)
    }
}

#[cfg(test)]
pub(crate) fn shared_for_tests(min_threads: u32, max_threads: u32) -> Arc<PoolShared> {
    Arc::new(PoolShared::new(min_threads, max_threads))
}

/// A self-sizing worker pool.
///
/// Tasks run on a set of OS worker threads bounded by the configured
/// minimum and maximum. When every thread is busy and work keeps queueing,
/// a monitor thread grows the set; after a long idle spell it shrinks the
/// set back down. Tasks may also be deferred to an absolute instant with
/// [`schedule_at`](Pool::schedule_at).
///
/// Dropping the pool drains it according to the configured
/// [`ShutdownMode`] and joins every thread before returning.
///
/// ```ignore
/// use smartpool_core::PoolConfig;
/// use smartpool_runtime::Pool;
///
/// let pool = Pool::new(PoolConfig::new().min_threads(2).max_threads(8))?;
/// pool.schedule(|| println!("hello from a worker"));
/// ```
pub struct Pool {
    shared: Arc<PoolShared>,
    set: Arc<WorkerSet>,
    monitor: Option<MonitorThread>,
    on_shutdown: ShutdownMode,
}

impl Pool {
    /// Build a pool and spawn its minimum worker complement.
    ///
    /// The monitor thread is started only when the pool can actually be
    /// resized, that is when `min_threads < max_threads`.
    pub fn new(config: PoolConfig) -> PoolResult<Self> {
        config.validate()?;
        log::init();

        let min_threads = config.resolved_min();
        let max_threads = config.max_threads;

        let shared = Arc::new(PoolShared::new(min_threads, max_threads));
        let set = Arc::new(WorkerSet::new());

        if let Err(err) = set.grow_to(&shared, min_threads) {
            halt_started_workers(&shared, &set);
            return Err(err);
        }

        let monitor = if min_threads < max_threads {
            match MonitorThread::start(
                Arc::clone(&shared),
                Arc::clone(&set),
                config.resize_up_tolerance,
                config.resize_down_tolerance,
            ) {
                Ok(monitor) => Some(monitor),
                Err(err) => {
                    halt_started_workers(&shared, &set);
                    return Err(err);
                }
            }
        } else {
            None
        };

        sp_debug!(
            "pool started: {} workers, bounds [{}, {}]",
            min_threads,
            min_threads,
            max_threads
        );

        Ok(Self {
            shared,
            set,
            monitor,
            on_shutdown: config.on_shutdown,
        })
    }

    /// Queue a task for immediate dispatch.
    ///
    /// Once shutdown has begun the task is silently discarded.
    pub fn schedule<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.push(TaskRecord::immediate(Box::new(task)));
    }

    /// Queue a task to start at or shortly after `due`.
    ///
    /// The task never starts before `due`; it may start a few milliseconds
    /// late depending on worker availability.
    pub fn schedule_at<F>(&self, task: F, due: Instant)
    where
        F: FnOnce() + Send + 'static,
    {
        self.push(TaskRecord::scheduled(Box::new(task), due));
    }

    /// Queue a task to start once `delay` has elapsed
    pub fn schedule_after<F>(&self, task: F, delay: Duration)
    where
        F: FnOnce() + Send + 'static,
    {
        self.schedule_at(task, Instant::now() + delay);
    }

    /// Number of task closures currently executing
    pub fn active_tasks(&self) -> u32 {
        self.shared.counters.active()
    }

    /// Number of tasks waiting in the queue
    pub fn pending_tasks(&self) -> u32 {
        self.shared.queue.len()
    }

    /// Number of worker threads currently in the pool
    pub fn pool_size(&self) -> u32 {
        self.shared.counters.threads()
    }

    fn push(&self, record: TaskRecord) {
        let mut tasks = self.shared.queue.tasks.lock().unwrap();
        if self.shared.is_retiring() {
            return;
        }
        tasks.push_back(record);
        self.shared.queue.sync_len(tasks.len());
        self.shared.queue.ready_cv.notify_one();
    }

    fn shutdown(&mut self) {
        // Phase one: stop accepting work and retire the monitor, so the
        // pool cannot resize underneath the drain.
        {
            let _tasks = self.shared.queue.tasks.lock().unwrap();
            self.shared.raise_retiring();
        }
        self.set.monitor_cv.notify_all();
        if let Some(monitor) = self.monitor.take() {
            monitor.join();
        }

        // Phase two: satisfy the drain policy, then let the workers exit.
        match self.on_shutdown {
            ShutdownMode::CancelPending => {
                let mut tasks = self.shared.queue.tasks.lock().unwrap();
                let dropped = tasks.len();
                tasks.clear();
                self.shared.queue.sync_len(0);
                self.shared.raise_shutdown();
                self.shared.queue.ready_cv.notify_all();
                drop(tasks);

                if dropped > 0 {
                    sp_debug!("shutdown: discarded {} pending tasks", dropped);
                }
            }
            ShutdownMode::WaitForPending => loop {
                let tasks = self.shared.queue.tasks.lock().unwrap();
                if tasks.is_empty() && self.shared.counters.active() == 0 {
                    self.shared.raise_shutdown();
                    self.shared.queue.ready_cv.notify_all();
                    break;
                }
                drop(tasks);
                thread::sleep(WORKER_IDLE_TICK);
            },
        }

        self.set.join_all(&self.shared);
    }
}

impl Drop for Pool {
    /// Blocks until the drain policy is satisfied and every thread joined
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Tear down a partially constructed pool
fn halt_started_workers(shared: &Arc<PoolShared>, set: &WorkerSet) {
    {
        let _tasks = shared.queue.tasks.lock().unwrap();
        shared.raise_retiring();
        shared.raise_shutdown();
        shared.queue.ready_cv.notify_all();
    }
    set.join_all(shared);
}
