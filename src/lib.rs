//! # batchvisor
//!
//! **Batchvisor** runs a batch of independent, fallible tasks across a fixed pool
//! of concurrent workers and aborts the batch early once a configured number of
//! tasks has failed.
//!
//! Every call joins all the workers it spawned before returning, on the success
//! path as well as on the early-abort path.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   TaskRef    │   │   TaskRef    │   │   TaskRef    │
//!     │  (task #0)   │   │  (task #1)   │   │  (task #K)   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            └──────────────────┼──────────────────┘
//!                               ▼
//!                ┌────────────────────────────┐
//!                │ TaskSource (atomic offset) │◄──── cancellation token
//!                └──────────────┬─────────────┘             ▲
//!            ┌──────────────────┼──────────────────┐        │
//!            ▼                  ▼                  ▼        │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐│
//!     │   Worker 0   │   │   Worker 1   │   │  Worker N-1  ││
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘│
//!            │  Outcome         │  Outcome         │        │
//!            ▼                  ▼                  ▼        │
//! ┌─────────────────────────────────────────────────────┐   │
//! │       Outcome stream (bounded, capacity = N)        │   │
//! └──────────────────────────┬──────────────────────────┘   │
//!                            ▼                              │
//!                 ┌────────────────────┐   limit reached    │
//!                 │  ErrorAggregator   │────────────────────┘
//!                 └────────────────────┘
//! ```
//!
//! ### Lifecycle of a worker
//! ```text
//! loop {
//!   ├─► cancelled?                       → exit
//!   ├─► reserve outcome slot              → exit if the aggregator stopped
//!   ├─► claim next task                   → exit on end of batch / cancellation
//!   ├─► publish TaskStarting
//!   ├─► task.run()  (never interrupted)
//!   │       ├─ Ok     ──► publish TaskSucceeded
//!   │       └─ Err    ──► publish TaskFailed
//!   └─► send outcome
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                      | Key types / traits                        |
//! |-------------------|------------------------------------------------------------------|-------------------------------------------|
//! | **Execution**     | Bounded worker pool with an error threshold.                     | [`Executor`], [`run`]                     |
//! | **Tasks**         | Define tasks as async or blocking closures, or implement a trait.| [`Task`], [`TaskRef`], [`TaskFn`], [`BlockingTaskFn`] |
//! | **Configuration** | Worker count and error limit.                                    | [`Config`], [`ErrorLimit`]                |
//! | **Subscriber API**| Hook into batch and task events.                                 | [`Subscribe`], [`Event`]                  |
//! | **Errors**        | Typed errors for runs and tasks.                                 | [`RunError`], [`TaskError`]               |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] subscriber that renders
//!   events through `tracing`.
//!
//! ## Example
//! ```rust
//! use batchvisor::{TaskError, TaskFn, TaskRef};
//!
//! #[tokio::main(flavor = "multi_thread", worker_threads = 2)]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tasks: Vec<TaskRef> = (0..20)
//!         .map(|i| {
//!             TaskFn::arc(format!("job-{i}"), move || async move {
//!                 if i == 7 { Err(TaskError::fail("bad input")) } else { Ok(()) }
//!             }) as TaskRef
//!         })
//!         .collect();
//!
//!     // 4 workers, abort on the 3rd failure; only one task fails here.
//!     batchvisor::run(tasks, 4, 3).await?;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod subscribers;
mod tasks;

use std::sync::Arc;

// ---- Public re-exports ----

pub use self::core::{Config, ErrorLimit, Executor, ExecutorBuilder};
pub use error::{RunError, TaskError};
pub use events::{Event, EventKind};
pub use subscribers::Subscribe;
pub use tasks::{BlockingTaskFn, Task, TaskFn, TaskRef};

// Optional: expose a simple built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

/// Runs `tasks` on `workers` concurrent workers, aborting on the `max_errors`-th failure.
///
/// `max_errors <= 0` disables the limit: every task runs and the batch succeeds
/// whatever fails. `workers == 0` is rejected with [`RunError::InvalidWorkers`]
/// before anything starts.
///
/// This is the one-call form of [`Executor::run`] without subscribers.
pub async fn run(
    tasks: impl Into<Arc<[TaskRef]>>,
    workers: usize,
    max_errors: i64,
) -> Result<(), RunError> {
    Executor::new(Config::new(workers, ErrorLimit::from(max_errors)))
        .run(tasks)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn one_call_form_follows_the_limit_sentinel() {
        let failing = || -> Vec<TaskRef> {
            (0..6)
                .map(|i| {
                    TaskFn::arc(format!("f{i}"), || async {
                        Err::<(), _>(TaskError::fail("nope"))
                    }) as TaskRef
                })
                .collect()
        };

        assert_eq!(run(failing(), 2, 0).await, Ok(()));
        assert_eq!(run(failing(), 2, -3).await, Ok(()));
        assert!(run(failing(), 2, 3).await.is_err_and(|e| e.is_limit_exceeded()));
        assert_eq!(
            run(failing(), 0, 3).await,
            Err(RunError::InvalidWorkers { workers: 0 })
        );
    }
}
