//! # Task source: shared pull-based view over the batch.
//!
//! [`TaskSource`] hands out the tasks of a batch in submission order to any
//! number of concurrent workers. Each task is delivered to exactly one worker.
//!
//! ## Rules
//! - Claiming is a single atomic offset advance: `next()` never blocks.
//! - Once the run's cancellation token fires, `next()` reports end-of-stream,
//!   even if unclaimed tasks remain.
//! - The task list itself is never mutated or reordered.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio_util::sync::CancellationToken;

use crate::tasks::TaskRef;

/// A task claimed from the source together with its submission index.
pub(crate) struct Claimed {
    pub index: usize,
    pub task: TaskRef,
}

/// Concurrent, cancellation-aware cursor over a batch of tasks.
pub(crate) struct TaskSource {
    tasks: Arc<[TaskRef]>,
    offset: AtomicUsize,
    cancel: CancellationToken,
}

impl TaskSource {
    pub fn new(tasks: Arc<[TaskRef]>, cancel: CancellationToken) -> Self {
        Self {
            tasks,
            offset: AtomicUsize::new(0),
            cancel,
        }
    }

    /// Claims the next task, or `None` when exhausted or cancelled.
    pub fn next(&self) -> Option<Claimed> {
        if self.cancel.is_cancelled() {
            return None;
        }
        let len = self.tasks.len();
        let index = self
            .offset
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |i| {
                (i < len).then_some(i + 1)
            })
            .ok()?;

        Some(Claimed {
            index,
            task: Arc::clone(&self.tasks[index]),
        })
    }

    /// Number of tasks not yet claimed.
    pub fn remaining(&self) -> usize {
        self.tasks
            .len()
            .saturating_sub(self.offset.load(Ordering::Acquire))
    }
}
