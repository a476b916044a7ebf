//! # Run-scoped unit accounting.
//!
//! [`UnitTracker`] counts the concurrent units (workers) spawned by batch runs
//! that have not finished yet. A unit registers with [`UnitTracker::enter`] before
//! it is spawned and unregisters when its [`UnitGuard`] is dropped at the end of
//! its future, so the count returns to zero exactly when every unit has exited.
//!
//! ## Rules
//! - The guard is moved **into** the spawned future; it drops when the future
//!   completes or is aborted.
//! - `active()` is a snapshot and may be stale while a run is in progress.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared counter of live run-scoped units.
#[derive(Clone, Debug, Default)]
pub(crate) struct UnitTracker {
    live: Arc<AtomicUsize>,
}

/// Registration of one live unit; unregisters on drop.
#[derive(Debug)]
pub(crate) struct UnitGuard {
    live: Arc<AtomicUsize>,
}

impl UnitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new unit.
    pub fn enter(&self) -> UnitGuard {
        self.live.fetch_add(1, Ordering::AcqRel);
        UnitGuard {
            live: Arc::clone(&self.live),
        }
    }

    /// Number of units currently alive.
    pub fn active(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }
}

impl Drop for UnitGuard {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::AcqRel);
    }
}
