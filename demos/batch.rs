//! # Example: batch
//!
//! A batch of simulated jobs, some of which fail, run on a small worker pool with
//! an error limit. Events are rendered through `tracing` by the built-in
//! [`LogWriter`] subscriber.
//!
//! ## Flow
//! ```text
//! Vec<TaskRef> ──► Executor::run()
//!     ├─► publish(BatchStarting)
//!     ├─► Worker × N
//!     │     ├─► publish(TaskStarting)
//!     │     ├─► task.run()
//!     │     └─► publish(TaskSucceeded | TaskFailed)
//!     ├─► ErrorAggregator: limit reached? ─► publish(LimitReached), cancel
//!     └─► publish(BatchFinished)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example batch --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use batchvisor::{
    BlockingTaskFn, Config, ErrorLimit, Executor, LogWriter, Subscribe, TaskError, TaskFn,
    TaskRef,
};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // 2. Executor: 4 workers, abort on the 5th failure
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::default())];
    let exec = Executor::builder(Config::new(4, ErrorLimit::max(5)))
        .with_subscribers(subs)
        .build();

    // 3. First batch: every 7th job fails, well below the limit
    let mut tasks: Vec<TaskRef> = (0..30)
        .map(|i| {
            TaskFn::arc(format!("fetch-{i}"), move || async move {
                tokio::time::sleep(Duration::from_millis(20 + (i % 5) * 10)).await;
                if i % 7 == 3 {
                    return Err(TaskError::fail(format!("upstream returned 503 for item {i}")));
                }
                Ok(())
            }) as TaskRef
        })
        .collect();
    tasks.push(BlockingTaskFn::arc("checksum", || {
        let sum: u64 = (0..5_000_000u64).fold(0, |acc, x| acc.wrapping_add(x * x));
        if sum == 0 {
            return Err(TaskError::fail("empty checksum"));
        }
        Ok(())
    }));
    exec.run(tasks).await?;

    // 4. Second batch: everything fails, the limit aborts it early
    let broken: Vec<TaskRef> = (0..40)
        .map(|i| {
            TaskFn::arc(format!("broken-{i}"), || async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Err::<(), _>(TaskError::fail("connection refused"))
            }) as TaskRef
        })
        .collect();
    match exec.run(broken).await {
        Ok(()) => tracing::info!("second batch succeeded"),
        Err(e) => tracing::warn!(label = e.as_label(), "second batch aborted: {e}"),
    }

    // 5. Flush subscriber queues
    exec.shutdown().await;
    Ok(())
}
