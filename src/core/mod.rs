//! Runtime core: batch orchestration.
//!
//! The only public API from this module is [`Executor`] (with its builder and
//! configuration), which runs a batch of tasks over a bounded worker pool.
//!
//! Internal modules:
//! - [`source`]: hands out tasks to workers, one claim per task;
//! - [`worker`]: pulls and runs tasks until exhaustion, cancellation or stream close;
//! - [`runner`]: executes one task with panic capture and event publishing;
//! - [`aggregator`]: counts failures and cancels the run at the error limit;
//! - [`executor`]: wires a run together and joins every unit it spawned;
//! - [`alive`]: counts live run-scoped units.

mod aggregator;
mod alive;
mod builder;
mod config;
mod executor;
mod runner;
mod source;
mod worker;

use std::any::Any;

pub use builder::ExecutorBuilder;
pub use config::{Config, ErrorLimit};
pub use executor::Executor;

/// Renders a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads_render_as_text() {
        let a: Box<dyn Any + Send> = Box::new("static");
        let b: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let c: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(&*a), "static");
        assert_eq!(panic_message(&*b), "owned");
        assert_eq!(panic_message(&*c), "unknown panic");
    }
}
