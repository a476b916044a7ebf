//! # Task abstractions.
//!
//! This module provides the task-related types:
//! - [`Task`] - trait for implementing async fallible units of work
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task>`)
//! - [`TaskFn`] - function-backed task built from an async closure
//! - [`BlockingTaskFn`] - function-backed task built from a synchronous closure

mod blocking;
mod task;
mod task_fn;

pub use blocking::BlockingTaskFn;
pub use task::{Task, TaskRef};
pub use task_fn::TaskFn;
