//! # Run a single claimed task.
//!
//! Executes one [`Task`] to completion and publishes its lifecycle events.
//!
//! ## Event flow
//!
//! ```text
//! Success:
//!   publish TaskStarting → task.run() → Ok(())  → publish TaskSucceeded
//!
//! Failure:
//!   publish TaskStarting → task.run() → Err(e)  → publish TaskFailed
//!
//! Panic:
//!   publish TaskStarting → task.run() → panic   → Err(Panicked) → publish TaskFailed
//! ```
//!
//! ## Rules
//! - Always publishes **exactly one** outcome event: `TaskSucceeded` or `TaskFailed`
//! - The task is never interrupted: there is no timeout and no cancellation here
//! - A panic inside the task is caught and converted into [`TaskError::Panicked`]

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::trace;

use crate::{
    core::panic_message,
    error::TaskError,
    events::{Event, EventKind},
    subscribers::SubscriberSet,
    tasks::Task,
};

/// Runs `task` (submission `index`) on behalf of `worker`, publishing events to `subs`.
pub(crate) async fn run_one(
    task: &dyn Task,
    index: usize,
    worker: usize,
    subs: &SubscriberSet,
) -> Result<(), TaskError> {
    subs.emit(
        &Event::new(EventKind::TaskStarting)
            .with_task(task.name())
            .with_index(index)
            .with_worker(worker),
    );
    trace!(target: "batchvisor", task = task.name(), index, worker, "task starting");

    let res = match AssertUnwindSafe(task.run()).catch_unwind().await {
        Ok(res) => res,
        Err(payload) => Err(TaskError::Panicked {
            info: panic_message(&*payload),
        }),
    };

    match &res {
        Ok(()) => publish_succeeded(subs, task.name(), index, worker),
        Err(e) => publish_failed(subs, task.name(), index, worker, e),
    }
    res
}

/// Publishes `TaskSucceeded`.
fn publish_succeeded(subs: &SubscriberSet, name: &str, index: usize, worker: usize) {
    subs.emit(
        &Event::new(EventKind::TaskSucceeded)
            .with_task(name)
            .with_index(index)
            .with_worker(worker),
    );
}

/// Publishes `TaskFailed` with error details.
fn publish_failed(subs: &SubscriberSet, name: &str, index: usize, worker: usize, err: &TaskError) {
    trace!(target: "batchvisor", task = name, index, worker, error = %err, "task failed");
    subs.emit(
        &Event::new(EventKind::TaskFailed)
            .with_task(name)
            .with_index(index)
            .with_worker(worker)
            .with_reason(err.to_string()),
    );
}
