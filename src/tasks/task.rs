//! # Task abstraction.
//!
//! This module defines the [`Task`] trait: a named, niladic, fallible unit of work.
//! The common handle type is [`TaskRef`], an `Arc<dyn Task>` suitable for sharing
//! between the caller and the executor's workers.
//!
//! Tasks are opaque to the executor. Once a worker has claimed a task, the task
//! runs to completion: the executor never interrupts it, so a task does not
//! receive a cancellation token.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;

/// # Shared handle to a task object.
///
/// This is the element type of the batch passed to [`Executor::run`](crate::Executor::run).
pub type TaskRef = Arc<dyn Task>;

/// # Asynchronous, fallible unit of work.
///
/// A `Task` has a human-readable [`name`](Task::name) and an async [`run`](Task::run)
/// method that returns `Ok(())` on success or a [`TaskError`] on failure.
///
/// Implementations that perform blocking work should either use
/// [`BlockingTaskFn`](crate::BlockingTaskFn) or offload it themselves
/// (for example with `tokio::task::spawn_blocking`).
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use batchvisor::{Task, TaskError};
///
/// struct Upload {
///     path: String,
/// }
///
/// #[async_trait]
/// impl Task for Upload {
///     fn name(&self) -> &str {
///         &self.path
///     }
///
///     async fn run(&self) -> Result<(), TaskError> {
///         if self.path.is_empty() {
///             return Err(TaskError::fail("empty path"));
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name (used in events and logs).
    fn name(&self) -> &str;

    /// Executes the task to completion.
    async fn run(&self) -> Result<(), TaskError>;
}
