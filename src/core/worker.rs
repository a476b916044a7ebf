//! # Worker: one concurrent executor of the pool.
//!
//! A [`Worker`] repeatedly claims a task from the shared [`TaskSource`], runs it to
//! completion and hands the outcome to the error aggregator.
//!
//! ## Loop
//! ```text
//! loop {
//!   ├─► cancelled?                 → exit (Cancelled)
//!   ├─► reserve outcome slot       → exit if stream closed / cancelled while waiting
//!   ├─► source.next()              → exit on end-of-stream (Exhausted / Cancelled)
//!   ├─► run_one(task)              (never interrupted)
//!   └─► permit.send(outcome)
//! }
//! publish WorkerExited
//! ```
//!
//! ## Rules
//! - The outcome slot is reserved **before** a task is claimed. Every started task
//!   whose outcome the aggregator has not yet received holds one of the
//!   `outcome_capacity` slots, which bounds the tasks started after the error
//!   limit is detected by the worker count.
//! - Cancellation only prevents *starting* new tasks; a claimed task runs to the end.
//! - Exactly one outcome is sent per claimed task. If the aggregator has already
//!   stopped, the outcome is discarded with the closed stream.

use std::sync::Arc;

use tokio::{select, sync::mpsc};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::{
    core::{aggregator::Outcome, runner::run_one, source::TaskSource},
    events::{Event, EventKind},
    subscribers::SubscriberSet,
};

/// Why a worker left its loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WorkerExit {
    /// The source ran out of tasks.
    Exhausted,
    /// The run's cancellation token fired.
    Cancelled,
    /// The aggregator stopped consuming outcomes.
    StreamClosed,
}

impl WorkerExit {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerExit::Exhausted => "exhausted",
            WorkerExit::Cancelled => "cancelled",
            WorkerExit::StreamClosed => "stream_closed",
        }
    }
}

/// Per-run worker context.
pub(crate) struct Worker {
    pub id: usize,
    pub source: Arc<TaskSource>,
    pub outcomes: mpsc::Sender<Outcome>,
    pub cancel: CancellationToken,
    pub subs: Arc<SubscriberSet>,
}

impl Worker {
    /// Runs the worker loop; returns the number of tasks it executed.
    pub async fn run(self) -> usize {
        let mut executed = 0usize;

        let exit = loop {
            if self.cancel.is_cancelled() {
                break WorkerExit::Cancelled;
            }
            let permit = select! {
                biased;
                _ = self.cancel.cancelled() => break WorkerExit::Cancelled,
                res = self.outcomes.reserve() => match res {
                    Ok(permit) => permit,
                    Err(_closed) => break WorkerExit::StreamClosed,
                },
            };
            let Some(claimed) = self.source.next() else {
                break if self.cancel.is_cancelled() {
                    WorkerExit::Cancelled
                } else {
                    WorkerExit::Exhausted
                };
            };

            let result = run_one(claimed.task.as_ref(), claimed.index, self.id, &self.subs).await;
            executed += 1;
            permit.send(Outcome {
                index: claimed.index,
                result,
            });
        };

        trace!(
            target: "batchvisor",
            worker = self.id,
            executed,
            reason = exit.as_str(),
            "worker exited"
        );
        self.subs.emit(
            &Event::new(EventKind::WorkerExited)
                .with_worker(self.id)
                .with_count(executed)
                .with_reason(exit.as_str()),
        );
        executed
    }
}
