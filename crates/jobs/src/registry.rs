//! Mapping from job type to handler.
//!
//! The registry is built once during start-up through explicit
//! [`HandlerRegistry::register`] calls and is read-only afterwards. It is
//! passed to the [`crate::Dispatcher`] rather than living in a global, so a
//! test can build a registry holding only the handlers it cares about.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use crate::handlers::{
    CheckDownstreamHandler, CoprBuildHandler, JobHandler, ProposeDownstreamHandler,
    SyncFromDownstreamHandler,
};
use crate::{JobType, RegistryError};

/// Handlers keyed by the job type they serve.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<JobType, Arc<dyn JobHandler>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in handler.
    ///
    /// Job types without a handler are logged once here.
    pub fn with_default_handlers() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(SyncFromDownstreamHandler)?;
        registry.register(CheckDownstreamHandler)?;
        registry.register(ProposeDownstreamHandler)?;
        registry.register(CoprBuildHandler)?;

        for job in registry.unhandled_job_types() {
            warn!(%job, "No handler is registered for job type");
        }
        Ok(registry)
    }

    /// Registers `handler` under its declared job type.
    ///
    /// Registering a second handler for the same job type is rejected rather
    /// than overwriting the first.
    pub fn register<H>(&mut self, handler: H) -> Result<(), RegistryError>
    where
        H: JobHandler + 'static,
    {
        self.register_arc(Arc::new(handler))
    }

    /// Registers an already shared handler.
    pub fn register_arc(&mut self, handler: Arc<dyn JobHandler>) -> Result<(), RegistryError> {
        let job = handler.job_type();
        if handler.triggers().is_empty() {
            return Err(RegistryError::NoTriggers(job));
        }
        if self.handlers.contains_key(&job) {
            return Err(RegistryError::DuplicateHandler(job));
        }
        self.handlers.insert(job, handler);
        Ok(())
    }

    /// Looks up the handler for `job`.
    pub fn lookup(&self, job: JobType) -> Option<&Arc<dyn JobHandler>> {
        self.handlers.get(&job)
    }

    /// Bus topics consumed by registered handlers.
    pub fn topics(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.values().filter_map(|h| h.topic())
    }

    /// `true` when some registered handler consumes `topic`.
    pub fn handles_topic(&self, topic: &str) -> bool {
        self.topics().any(|t| t == topic)
    }

    /// Job types that have no registered handler.
    pub fn unhandled_job_types(&self) -> Vec<JobType> {
        JobType::ALL
            .into_iter()
            .filter(|job| !self.handlers.contains_key(job))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("job_types", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
