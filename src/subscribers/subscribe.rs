//! # Subscribe: observing a batch from outside
//!
//! A [`Subscribe`] implementation receives every [`Event`] an executor emits:
//! batch start and result, each task start and outcome, worker exits and the
//! error limit being hit. Subscribers are registered once with
//! [`ExecutorBuilder::with_subscribers`](crate::ExecutorBuilder::with_subscribers)
//! and serve every batch run by that executor.
//!
//! ## Delivery
//! - Events for one subscriber arrive in emission order, on a task of its own.
//!   A slow `on_event` delays only that subscriber; batch workers never wait.
//! - Each subscriber gets a bounded backlog of [`Subscribe::queue_capacity`]
//!   events. Events past a full backlog are lost for that subscriber and a
//!   `warn!` record is written.
//! - A panic in `on_event` is logged and the next event is delivered normally.
//! - [`Executor::shutdown`](crate::Executor::shutdown) waits for the backlog to drain.
//!
//! ## Example
//! ```rust
//! use std::sync::Mutex;
//! use batchvisor::{Event, EventKind, Subscribe};
//!
//! /// Remembers which submissions failed.
//! #[derive(Default)]
//! struct FailedIndices(Mutex<Vec<usize>>);
//!
//! #[async_trait::async_trait]
//! impl Subscribe for FailedIndices {
//!     async fn on_event(&self, ev: &Event) {
//!         if let (EventKind::TaskFailed, Some(i)) = (ev.kind, ev.index) {
//!             self.0.lock().unwrap().push(i);
//!         }
//!     }
//!     fn name(&self) -> &'static str { "failed-indices" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Event handler attached to an [`Executor`](crate::Executor).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes one event.
    async fn on_event(&self, event: &Event);

    /// Name used in log records about this subscriber.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Backlog size; events beyond it are dropped for this subscriber.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
