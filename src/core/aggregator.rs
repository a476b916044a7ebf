//! # Error aggregator: the single consumer of task outcomes.
//!
//! [`ErrorAggregator`] receives one [`Outcome`] per executed task, counts failures
//! and decides the batch result. It is the only writer of the run's
//! cancellation token.
//!
//! ## Decision
//! ```text
//! limit = Max(m):
//!   failed reaches m ─► cancel token ─► publish LimitReached ─► stop consuming
//!                                                               (stream closes, late
//!                                                                outcomes are dropped)
//! limit = Unlimited:
//!   drain until every sender is gone; failures are only counted
//! ```
//!
//! ## Rules
//! - Runs sequentially; the counters need no locking.
//! - The verdict is final once the limit is hit; later outcomes cannot change it.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    core::config::ErrorLimit,
    error::{RunError, TaskError},
    events::{Event, EventKind},
    subscribers::SubscriberSet,
};

/// Result of one executed task, as sent by a worker.
#[derive(Debug)]
pub(crate) struct Outcome {
    pub index: usize,
    pub result: Result<(), TaskError>,
}

/// Outcome counts observed by the aggregator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Tally {
    pub succeeded: usize,
    pub failed: usize,
}

/// Final decision of the aggregator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Verdict {
    pub tally: Tally,
    /// Set to the limit when it was reached.
    pub exceeded: Option<usize>,
}

impl Verdict {
    pub fn into_result(self) -> Result<(), RunError> {
        match self.exceeded {
            Some(limit) => Err(RunError::ErrorsLimitExceeded {
                limit,
                failed: self.tally.failed,
            }),
            None => Ok(()),
        }
    }
}

/// Sequential failure counter for one run.
pub(crate) struct ErrorAggregator {
    limit: ErrorLimit,
    cancel: CancellationToken,
    subs: Arc<SubscriberSet>,
}

impl ErrorAggregator {
    pub fn new(limit: ErrorLimit, cancel: CancellationToken, subs: Arc<SubscriberSet>) -> Self {
        Self {
            limit,
            cancel,
            subs,
        }
    }

    /// Consumes outcomes until the stream closes or the limit is reached.
    ///
    /// Dropping `rx` on return closes the stream for workers still holding a slot.
    pub async fn observe(self, mut rx: mpsc::Receiver<Outcome>) -> Verdict {
        let mut tally = Tally::default();

        while let Some(outcome) = rx.recv().await {
            match outcome.result {
                Ok(()) => tally.succeeded += 1,
                Err(_) => tally.failed += 1,
            }
            if self.limit.is_reached(tally.failed) {
                self.cancel.cancel();
                debug!(
                    target: "batchvisor",
                    failed = tally.failed,
                    limit = %self.limit,
                    last_index = outcome.index,
                    "errors limit reached; cancelling batch"
                );
                self.subs
                    .emit(&Event::new(EventKind::LimitReached).with_count(tally.failed));
                return Verdict {
                    tally,
                    exceeded: self.limit.get(),
                };
            }
        }

        Verdict {
            tally,
            exceeded: None,
        }
    }
}
