//! Runtime events: types emitted by a batch run.
//!
//! This module holds the event **data model** shared by the executor, its
//! workers, the error aggregator and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//!
//! ## Quick reference
//! - **Publishers**: `Executor::run` (batch start/finish), workers (task
//!   lifecycle, worker exit), the aggregator (limit reached).
//! - **Consumers**: user subscribers registered through
//!   [`ExecutorBuilder::with_subscribers`](crate::ExecutorBuilder::with_subscribers).

mod event;

pub use event::{Event, EventKind};
