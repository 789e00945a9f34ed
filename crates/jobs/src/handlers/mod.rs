//! Job handlers.
//!
//! A handler is bound to exactly one [`JobType`] and declares the triggers it
//! is willing to run for. Handlers hold no state between runs; everything a run
//! needs arrives in a [`JobContext`] built by the dispatcher for one job
//! declaration.
//!
//! | Handler | Job type | Triggers |
//! |---------|----------|----------|
//! | [`SyncFromDownstreamHandler`] | `sync_from_downstream` | commit |
//! | [`CheckDownstreamHandler`] | `check_downstream` | pull request |
//! | [`ProposeDownstreamHandler`] | `propose_downstream` | release |
//! | [`CoprBuildHandler`] | `copr_build` | pull request, release |

mod check_downstream;
mod copr_build;
mod propose_downstream;
mod sync_from_downstream;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    ForgeError, GitForge, JobConfig, JobError, JobType, LazyForge, PackageConfig, PackagingApi,
    ProjectHandle, RawEvent, ServiceConfig, TriggerType,
};

pub use check_downstream::CheckDownstreamHandler;
pub use copr_build::CoprBuildHandler;
pub use propose_downstream::ProposeDownstreamHandler;
pub use sync_from_downstream::SyncFromDownstreamHandler;

/// A unit of work for one job type.
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// The job type this handler serves.
    fn job_type(&self) -> JobType;

    /// Triggers this handler may run for. Never empty.
    fn triggers(&self) -> &'static [TriggerType];

    /// Message-bus topic this handler consumes, if it is fed by the bus.
    fn topic(&self) -> Option<&'static str> {
        None
    }

    /// Performs the job.
    async fn run(&self, ctx: &JobContext<'_>) -> Result<(), JobError>;
}

/// Everything a handler run can see.
pub struct JobContext<'a> {
    pub config: &'a ServiceConfig,
    pub package_config: &'a PackageConfig,
    pub event: &'a RawEvent,
    /// The project the event was classified against.
    pub project: &'a ProjectHandle,
    /// Connected on first use by [`JobContext::upstream_forge`].
    pub upstream: &'a LazyForge,
    /// Connected on first use by [`JobContext::downstream_forge`].
    pub downstream: &'a LazyForge,
    pub api: &'a dyn PackagingApi,
    /// The declaration being run.
    pub job: &'a JobConfig,
    /// The trigger the event was classified as.
    pub trigger: TriggerType,
}

impl JobContext<'_> {
    /// The upstream forge, connecting it if no job has needed it yet.
    pub fn upstream_forge(&self) -> Result<Arc<dyn GitForge>, ForgeError> {
        self.upstream.get()
    }

    /// The downstream forge, connecting it if no job has needed it yet.
    pub fn downstream_forge(&self) -> Result<Arc<dyn GitForge>, ForgeError> {
        self.downstream.get()
    }

    /// Returns the non-empty string at `path`, or a [`JobError::MissingEventField`].
    pub fn require_str(&self, path: &[&str]) -> Result<&str, JobError> {
        self.event
            .str_at(path)
            .ok_or_else(|| JobError::missing_field(path))
    }

    /// Returns the non-negative integer at `path`, or a [`JobError::MissingEventField`].
    pub fn require_u64(&self, path: &[&str]) -> Result<u64, JobError> {
        self.event
            .u64_at(path)
            .ok_or_else(|| JobError::missing_field(path))
    }
}

impl std::fmt::Debug for JobContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobContext")
            .field("project", self.project)
            .field("job", &self.job.job)
            .field("trigger", &self.trigger)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
