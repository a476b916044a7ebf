//! # Executor configuration.
//!
//! Provides [`Config`], the settings of an [`Executor`](crate::Executor), and
//! [`ErrorLimit`], the failure threshold of a batch.
//!
//! ## Sentinel values
//! - `workers = 0` → invalid; [`Config::validate`] rejects it with
//!   [`RunError::InvalidWorkers`] before anything is spawned.
//! - error limit `<= 0` (integer form) → [`ErrorLimit::Unlimited`]: failures never
//!   abort the batch.
//!
//! # Example
//! ```
//! use batchvisor::{Config, ErrorLimit};
//!
//! let cfg = Config::new(8, ErrorLimit::from(3));
//! assert_eq!(cfg.error_limit.get(), Some(3));
//! assert_eq!(cfg.outcome_capacity(), 8);
//!
//! // Zero and negative limits disable the threshold.
//! assert_eq!(ErrorLimit::from(0), ErrorLimit::Unlimited);
//! assert_eq!(ErrorLimit::from(-5), ErrorLimit::Unlimited);
//! ```

use std::fmt;
use std::num::NonZeroUsize;

use crate::error::RunError;

/// Largest capacity a tokio bounded channel accepts.
pub(crate) const MAX_OUTCOME_CAPACITY: usize = usize::MAX >> 3;

/// Number of failed tasks that aborts a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ErrorLimit {
    /// Never abort on failures; every task runs.
    #[default]
    Unlimited,
    /// Abort as soon as this many failures have been observed.
    Max(NonZeroUsize),
}

impl ErrorLimit {
    /// Limit of `n` failures; `0` means [`ErrorLimit::Unlimited`].
    pub fn max(n: usize) -> Self {
        NonZeroUsize::new(n).map_or(ErrorLimit::Unlimited, ErrorLimit::Max)
    }

    /// Returns the limit as a plain count, `None` when unlimited.
    #[inline]
    pub fn get(&self) -> Option<usize> {
        match self {
            ErrorLimit::Unlimited => None,
            ErrorLimit::Max(n) => Some(n.get()),
        }
    }

    /// True if `failed` failures reach this limit.
    #[inline]
    pub fn is_reached(&self, failed: usize) -> bool {
        self.get().is_some_and(|limit| failed >= limit)
    }
}

impl From<i64> for ErrorLimit {
    /// Signed form: `m <= 0` disables the limit, `m >= 1` aborts on the `m`-th failure.
    fn from(m: i64) -> Self {
        usize::try_from(m).map_or(ErrorLimit::Unlimited, ErrorLimit::max)
    }
}

impl fmt::Display for ErrorLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorLimit::Unlimited => f.write_str("unlimited"),
            ErrorLimit::Max(n) => write!(f, "{n}"),
        }
    }
}

/// Configuration of an [`Executor`](crate::Executor).
///
/// ## Field semantics
/// - `workers`: number of concurrent workers; at most this many tasks execute at once
/// - `error_limit`: failures that abort the batch ([`ErrorLimit::Unlimited`] = never)
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of concurrent workers (must be positive).
    pub workers: usize,

    /// Failure threshold of a batch.
    pub error_limit: ErrorLimit,
}

impl Config {
    /// Creates a configuration with explicit worker count and error limit.
    pub fn new(workers: usize, error_limit: ErrorLimit) -> Self {
        Self {
            workers,
            error_limit,
        }
    }

    /// Checks the configuration before a run.
    pub fn validate(&self) -> Result<(), RunError> {
        if self.workers == 0 {
            return Err(RunError::InvalidWorkers {
                workers: self.workers,
            });
        }
        Ok(())
    }

    /// Capacity of the outcome stream between workers and the aggregator.
    ///
    /// Equal to the worker count, clamped to `1..=MAX_OUTCOME_CAPACITY`: a worker
    /// reserves its slot before claiming a task, so at most `workers` outcomes are
    /// ever pending.
    #[inline]
    pub fn outcome_capacity(&self) -> usize {
        self.workers.clamp(1, MAX_OUTCOME_CAPACITY)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `workers` = available parallelism (1 if unknown)
    /// - `error_limit = ErrorLimit::Unlimited`
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Self {
            workers,
            error_limit: ErrorLimit::Unlimited,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_limit_follows_sentinel_rule() {
        assert_eq!(ErrorLimit::from(0), ErrorLimit::Unlimited);
        assert_eq!(ErrorLimit::from(-1), ErrorLimit::Unlimited);
        assert_eq!(ErrorLimit::from(-10), ErrorLimit::Unlimited);
        assert_eq!(ErrorLimit::from(1).get(), Some(1));
        assert_eq!(ErrorLimit::from(23).get(), Some(23));
    }

    #[test]
    fn limit_is_reached_at_threshold() {
        let limit = ErrorLimit::max(3);
        assert!(!limit.is_reached(2));
        assert!(limit.is_reached(3));
        assert!(limit.is_reached(4));
        assert!(!ErrorLimit::Unlimited.is_reached(usize::MAX));
    }

    #[test]
    fn zero_workers_is_invalid() {
        let cfg = Config::new(0, ErrorLimit::max(1));
        assert_eq!(
            cfg.validate(),
            Err(RunError::InvalidWorkers { workers: 0 })
        );
        assert!(Config::new(1, ErrorLimit::Unlimited).validate().is_ok());
    }

    #[test]
    fn default_is_valid_and_unlimited() {
        let cfg = Config::default();
        assert!(cfg.workers >= 1);
        assert_eq!(cfg.error_limit, ErrorLimit::Unlimited);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn outcome_capacity_is_clamped() {
        assert_eq!(Config::new(0, ErrorLimit::Unlimited).outcome_capacity(), 1);
        assert_eq!(Config::new(12, ErrorLimit::Unlimited).outcome_capacity(), 12);
        assert_eq!(
            Config::new(usize::MAX, ErrorLimit::Unlimited).outcome_capacity(),
            MAX_OUTCOME_CAPACITY
        );
    }

    #[test]
    fn display() {
        assert_eq!(ErrorLimit::Unlimited.to_string(), "unlimited");
        assert_eq!(ErrorLimit::max(7).to_string(), "7");
    }
}
