//! # Event subscribers.
//!
//! Subscribers observe the [`Event`](crate::Event)s emitted during batch runs
//! (task lifecycle, worker exits, error limit, batch result).
//!
//! ## Architecture
//! ```text
//!   worker / aggregator / executor ── emit(&Event) ──► SubscriberSet
//!                                                      ├──► [queue S1] ─► worker S1 ─► on_event()
//!                                                      ├──► [queue S2] ─► worker S2 ─► on_event()
//!                                                      └──► [queue SN] ─► worker SN ─► on_event()
//! ```
//!
//! Subscriber workers belong to the [`Executor`](crate::Executor), not to a single
//! run: they outlive individual batches and stop on
//! [`Executor::shutdown`](crate::Executor::shutdown).

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod embedded;

pub(crate) use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
