//! Event routing and job dispatch.
//!
//! [`Dispatcher::process_message`] is the single ingress point:
//!
//! 1. **Topic pre-filter**: a bus message whose topic no registered handler
//!    consumes is dropped before any classification work.
//! 2. **Routing** ([`Dispatcher::parse_event`]): the payload is recognized
//!    and the project's package configuration fetched.
//! 3. **Dispatch** ([`Dispatcher::process_jobs`]): every declared job whose
//!    trigger matches is run by its registered handler, one after another in
//!    declared order.
//!
//! Uninteresting events end quietly with `Ok(())`. Collaborator and handler
//! failures propagate to the caller; a failing job stops the jobs declared
//! after it for that event.

use std::sync::Arc;

use tracing::{debug, info, info_span, warn, Instrument};

use crate::classify::{recognize, ClassifiedEvent};
use crate::handlers::JobContext;
use crate::{
    DispatchId, ForgeError, ForgeKind, GitForge, HandlerRegistry, JobError, LazyForge, PackagingApi,
    RawEvent, ServiceConfig,
};

/// Classifies inbound events and runs the jobs they trigger.
pub struct Dispatcher {
    config: ServiceConfig,
    registry: Arc<HandlerRegistry>,
    upstream: LazyForge,
    downstream: LazyForge,
    api: Arc<dyn PackagingApi>,
}

impl Dispatcher {
    pub fn new(
        config: ServiceConfig,
        registry: Arc<HandlerRegistry>,
        upstream: LazyForge,
        downstream: LazyForge,
        api: Arc<dyn PackagingApi>,
    ) -> Self {
        Self {
            config,
            registry,
            upstream,
            downstream,
            api,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    fn forge(&self, kind: ForgeKind) -> Result<Arc<dyn GitForge>, ForgeError> {
        match kind {
            ForgeKind::Upstream => self.upstream.get(),
            ForgeKind::Downstream => self.downstream.get(),
        }
    }

    /// Processes one inbound event end to end.
    ///
    /// `topic` is the bus topic when the event came from the message bus.
    pub async fn process_message(
        &self,
        event: &RawEvent,
        topic: Option<&str>,
    ) -> Result<(), JobError> {
        let dispatch_id = DispatchId::new_random();
        let span = info_span!("process_message", %dispatch_id, ?topic);

        async move {
            if let Some(topic) = topic {
                if !self.registry.handles_topic(topic) {
                    debug!(topic, "No handler consumes this topic");
                    return Ok(());
                }
            }

            let Some(classified) = self.parse_event(event).await? else {
                debug!("Event is not processed");
                return Ok(());
            };
            self.process_jobs(&classified, event).await
        }
        .instrument(span)
        .await
    }

    /// Recognizes `event` and fetches the configuration of the project it
    /// refers to.
    ///
    /// Returns `Ok(None)` for empty or unrecognized payloads; the forge is not
    /// contacted in that case.
    pub async fn parse_event(&self, event: &RawEvent) -> Result<Option<ClassifiedEvent>, JobError> {
        let Some(recognized) = recognize(event) else {
            return Ok(None);
        };
        let forge = self.forge(recognized.forge())?;
        let classified = recognized.resolve(forge.as_ref()).await?;
        info!(
            trigger = %classified.trigger,
            project = %classified.project,
            jobs = classified.package_config.jobs.len(),
            "Event classified"
        );
        Ok(Some(classified))
    }

    /// Runs every declared job whose trigger matches the classified trigger.
    ///
    /// Jobs without a registered handler, and jobs whose handler does not
    /// support the trigger, are skipped with a warning.
    pub async fn process_jobs(
        &self,
        classified: &ClassifiedEvent,
        event: &RawEvent,
    ) -> Result<(), JobError> {
        let trigger = classified.trigger;
        for job in classified.package_config.jobs_for(trigger) {
            let Some(handler) = self.registry.lookup(job.job) else {
                warn!(job = %job.job, %trigger, "There is no handler for job");
                continue;
            };
            if !handler.triggers().contains(&trigger) {
                warn!(job = %job.job, %trigger, "Handler does not support this trigger");
                continue;
            }

            let ctx = JobContext {
                config: &self.config,
                package_config: &classified.package_config,
                event,
                project: &classified.project,
                upstream: &self.upstream,
                downstream: &self.downstream,
                api: self.api.as_ref(),
                job,
                trigger,
            };

            info!(job = %job.job, project = %classified.project, "Running job");
            handler.run(&ctx).await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("upstream", &self.upstream)
            .field("downstream", &self.downstream)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
