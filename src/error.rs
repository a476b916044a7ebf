//! Error types used by the batchvisor executor and by tasks.
//!
//! This module defines two main error enums:
//!
//! - [`RunError`]: errors returned by a batch run as a whole.
//! - [`TaskError`]: the failure outcome of an individual task.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//! A [`TaskError`] is data: it is counted by the aggregator and never aborts a
//! batch on its own.

use thiserror::Error;

/// # Errors produced by a batch run.
///
/// Exactly one of these (or success) is returned per call to
/// [`Executor::run`](crate::Executor::run).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    /// The worker count is zero; no task could ever be drained.
    ///
    /// Returned synchronously, before anything is spawned.
    #[error("invalid worker count {workers}: at least one worker is required")]
    InvalidWorkers {
        /// The rejected worker count.
        workers: usize,
    },

    /// The configured number of failed tasks was reached and the batch was aborted.
    #[error("errors limit exceeded: {failed} failed tasks reached limit {limit}")]
    ErrorsLimitExceeded {
        /// The configured error limit.
        limit: usize,
        /// Failures observed when the decision was taken (equals `limit`).
        failed: usize,
    },
}

impl RunError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use batchvisor::RunError;
    ///
    /// let err = RunError::ErrorsLimitExceeded { limit: 3, failed: 3 };
    /// assert_eq!(err.as_label(), "run_errors_limit_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RunError::InvalidWorkers { .. } => "run_invalid_workers",
            RunError::ErrorsLimitExceeded { .. } => "run_errors_limit_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RunError::InvalidWorkers { workers } => format!("invalid workers: {workers}"),
            RunError::ErrorsLimitExceeded { limit, failed } => {
                format!("errors limit exceeded: failed={failed} limit={limit}")
            }
        }
    }

    /// True if this is the threshold-exceeded outcome.
    pub fn is_limit_exceeded(&self) -> bool {
        matches!(self, RunError::ErrorsLimitExceeded { .. })
    }
}

/// # Failure outcome of a single task.
///
/// Tasks report failure by returning one of these. The executor never retries a
/// failed task; it only counts the failure.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Task execution failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task panicked; the panic was caught by the worker and turned into a failure.
    #[error("task panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    ///
    /// # Example
    /// ```
    /// use batchvisor::TaskError;
    ///
    /// let err = TaskError::fail("boom");
    /// assert_eq!(err.to_string(), "execution failed: boom");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Panicked { info } => format!("panic: {info}"),
        }
    }
}

impl From<String> for TaskError {
    fn from(error: String) -> Self {
        TaskError::Fail { error }
    }
}

impl From<&str> for TaskError {
    fn from(error: &str) -> Self {
        TaskError::fail(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(
            RunError::InvalidWorkers { workers: 0 }.as_label(),
            "run_invalid_workers"
        );
        assert_eq!(TaskError::fail("x").as_label(), "task_failed");
        assert_eq!(
            TaskError::Panicked { info: "x".into() }.as_label(),
            "task_panicked"
        );
    }

    #[test]
    fn limit_exceeded_is_distinguished() {
        let err = RunError::ErrorsLimitExceeded {
            limit: 2,
            failed: 2,
        };
        assert!(err.is_limit_exceeded());
        assert!(!RunError::InvalidWorkers { workers: 0 }.is_limit_exceeded());
        assert_eq!(
            err.to_string(),
            "errors limit exceeded: 2 failed tasks reached limit 2"
        );
    }

    #[test]
    fn task_error_from_strings() {
        assert_eq!(TaskError::from("a"), TaskError::fail("a"));
        assert_eq!(TaskError::from(String::from("b")), TaskError::fail("b"));
    }
}
