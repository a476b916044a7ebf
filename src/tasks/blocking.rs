//! # Blocking function-backed task (`BlockingTaskFn`)
//!
//! Wraps a synchronous closure `F: Fn() -> Result<(), TaskError>` and runs it on
//! tokio's blocking thread pool, so CPU-bound or blocking I/O work does not stall
//! the async workers of the executor.
//!
//! The closure still runs to completion before the worker reports the outcome:
//! the worker awaits the blocking job, so no blocking thread outlives the batch.
//!
//! ## Example
//! ```rust
//! use batchvisor::{BlockingTaskFn, TaskError, TaskRef};
//!
//! let t: TaskRef = BlockingTaskFn::arc("checksum", || {
//!     let sum: u64 = (0..1_000u64).sum();
//!     if sum == 0 { Err(TaskError::fail("empty")) } else { Ok(()) }
//! });
//! assert_eq!(t.name(), "checksum");
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::tasks::task::Task;

/// Task backed by a synchronous closure executed via `spawn_blocking`.
#[derive(Debug)]
pub struct BlockingTaskFn<F> {
    name: Cow<'static, str>,
    f: Arc<F>,
}

impl<F> BlockingTaskFn<F> {
    /// Creates a new blocking task.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }

    /// Creates the task and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F> Task for BlockingTaskFn<F>
where
    F: Fn() -> Result<(), TaskError> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> Result<(), TaskError> {
        let f = Arc::clone(&self.f);
        match tokio::task::spawn_blocking(move || (*f)()).await {
            Ok(res) => res,
            Err(join) if join.is_panic() => Err(TaskError::Panicked {
                info: crate::core::panic_message(&*join.into_panic()),
            }),
            Err(join) => Err(TaskError::fail(format!("blocking job aborted: {join}"))),
        }
    }
}
