//! Task records: a unit of work plus its dispatch schedule.

use std::time::Instant;

/// A unit of work submitted to the pool.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// A task paired with an optional due instant.
///
/// `due == None` means the record is ready immediately; `due == Some(t)`
/// means it must not start before `t`. The queue owns the record until a
/// worker pops it; the worker owns it for the duration of the run.
pub struct TaskRecord {
    run: Task,
    due: Option<Instant>,
}

impl TaskRecord {
    /// Create a record that is ready immediately
    pub fn immediate(task: Task) -> Self {
        Self { run: task, due: None }
    }

    /// Create a record that becomes ready at `due`
    pub fn scheduled(task: Task, due: Instant) -> Self {
        Self { run: task, due: Some(due) }
    }

    /// Whether the record may be dispatched at `now`
    #[inline]
    pub fn is_ready(&self, now: Instant) -> bool {
        match self.due {
            None => true,
            Some(due) => due <= now,
        }
    }

    /// The instant the record becomes ready, if it is deferred
    #[inline]
    pub fn due(&self) -> Option<Instant> {
        self.due
    }

    /// Consume the record and invoke the closure exactly once
    pub fn run(self) {
        (self.run)()
    }
}
