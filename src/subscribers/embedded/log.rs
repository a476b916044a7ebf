//! # LogWriter: event renderer on top of `tracing`
//!
//! A minimal subscriber that turns incoming [`Event`]s into `tracing` records
//! under the `batchvisor::events` target. Install any `tracing` subscriber
//! (e.g. `tracing_subscriber::fmt`) to see them.
//!
//! ## Example output (fmt layer)
//! ```text
//! INFO batchvisor::events: batch starting tasks=50 workers=10
//! DEBUG batchvisor::events: task starting task="resize-3" index=3 worker=1
//! WARN batchvisor::events: task failed task="resize-3" index=3 worker=1 reason="execution failed: disk full"
//! WARN batchvisor::events: errors limit reached failed=23
//! INFO batchvisor::events: batch finished failed=23 result="run_errors_limit_exceeded"
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::BatchStarting => {
                info!(
                    target: "batchvisor::events",
                    tasks = ?e.count,
                    workers = ?e.workers,
                    "batch starting"
                );
            }
            EventKind::BatchFinished => {
                info!(
                    target: "batchvisor::events",
                    failed = ?e.count,
                    result = ?e.reason,
                    "batch finished"
                );
            }
            EventKind::TaskStarting => {
                debug!(
                    target: "batchvisor::events",
                    task,
                    index = ?e.index,
                    worker = ?e.worker,
                    "task starting"
                );
            }
            EventKind::TaskSucceeded => {
                debug!(
                    target: "batchvisor::events",
                    task,
                    index = ?e.index,
                    worker = ?e.worker,
                    "task succeeded"
                );
            }
            EventKind::TaskFailed => {
                warn!(
                    target: "batchvisor::events",
                    task,
                    index = ?e.index,
                    worker = ?e.worker,
                    reason = ?e.reason,
                    "task failed"
                );
            }
            EventKind::WorkerExited => {
                debug!(
                    target: "batchvisor::events",
                    worker = ?e.worker,
                    executed = ?e.count,
                    "worker exited"
                );
            }
            EventKind::LimitReached => {
                warn!(target: "batchvisor::events", failed = ?e.count, "errors limit reached");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn handles_every_kind() {
        let w = LogWriter::new();
        for kind in [
            EventKind::BatchStarting,
            EventKind::BatchFinished,
            EventKind::TaskStarting,
            EventKind::TaskSucceeded,
            EventKind::TaskFailed,
            EventKind::WorkerExited,
            EventKind::LimitReached,
        ] {
            w.on_event(&Event::new(kind).with_task("t")).await;
        }
        assert_eq!(w.name(), "LogWriter");
    }
}
