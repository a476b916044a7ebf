use std::sync::Arc;

use crate::subscribers::{Subscribe, SubscriberSet};

use super::{config::Config, executor::Executor};

/// Builder for constructing an [`Executor`] with optional subscribers.
pub struct ExecutorBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ExecutorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive batch events (task lifecycle, limit reached, etc.)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the executor.
    ///
    /// Spawns one worker per subscriber, so with subscribers this must be called
    /// from within a tokio runtime.
    pub fn build(self) -> Executor {
        Executor::new_internal(self.cfg, SubscriberSet::new(self.subscribers))
    }
}
