//! # Events emitted during a batch run.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Batch events**: start and final decision of a run
//! - **Task events**: a worker starting a task and the task's outcome
//! - **Control events**: worker exit, error limit reached
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task name,
//! submission index, worker index and failure reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Events produced by different workers reach subscribers in no particular order;
//! use `seq` to restore the emission order.
//!
//! ## Example
//! ```rust
//! use batchvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_task("resize-42")
//!     .with_index(42)
//!     .with_worker(3)
//!     .with_reason("disk full");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("resize-42"));
//! assert_eq!(ev.worker, Some(3));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Batch events ===
    /// A run is starting its workers.
    ///
    /// Sets:
    /// - `count`: number of tasks in the batch
    /// - `workers`: number of workers spawned
    BatchStarting,

    /// A run finished; every unit it spawned has exited.
    ///
    /// Sets:
    /// - `count`: failures observed by the aggregator
    /// - `reason`: `"success"` or the run error label
    BatchFinished,

    // === Task events ===
    /// A worker claimed a task and is about to run it.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `index`: submission index
    /// - `worker`: worker index
    TaskStarting,

    /// Task completed successfully.
    ///
    /// Sets:
    /// - `task`, `index`, `worker`
    TaskSucceeded,

    /// Task completed with a failure (including a caught panic).
    ///
    /// Sets:
    /// - `task`, `index`, `worker`
    /// - `reason`: failure message
    TaskFailed,

    // === Control events ===
    /// A worker left its loop (source exhausted, cancellation, or closed stream).
    ///
    /// Sets:
    /// - `worker`: worker index
    /// - `count`: tasks executed by this worker
    WorkerExited,

    /// The error aggregator reached the configured limit and raised cancellation.
    ///
    /// Sets:
    /// - `count`: failures observed (equals the limit)
    LimitReached,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the task, if applicable.
    pub task: Option<Arc<str>>,
    /// Submission index of the task in its batch.
    pub index: Option<usize>,
    /// Index of the worker that produced the event.
    pub worker: Option<usize>,
    /// Number of workers of the run.
    pub workers: Option<usize>,
    /// Kind-specific counter (tasks in batch, failures, tasks per worker).
    pub count: Option<usize>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            index: None,
            worker: None,
            workers: None,
            count: None,
            reason: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches the submission index.
    #[inline]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Attaches the worker index.
    #[inline]
    pub fn with_worker(mut self, worker: usize) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Attaches the worker count of the run.
    #[inline]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Attaches a kind-specific counter.
    #[inline]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::new(EventKind::TaskStarting);
        let b = Event::new(EventKind::TaskStarting);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn builders_fill_fields() {
        let ev = Event::new(EventKind::WorkerExited)
            .with_worker(2)
            .with_workers(4)
            .with_count(7);
        assert_eq!(ev.worker, Some(2));
        assert_eq!(ev.workers, Some(4));
        assert_eq!(ev.count, Some(7));
        assert!(ev.task.is_none());
    }
}
