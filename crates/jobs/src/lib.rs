//! Event classification and job dispatch.
//!
//! This crate turns an inbound notification (a GitHub webhook body or a
//! message-bus message) into work: it recognizes which kind of event arrived,
//! fetches the package configuration of the project the event is about, and
//! runs every job that project declared for that kind of event.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! Hosting forges, the packaging/build service, and event sources are reached
//! through the traits in [`ports`]; infrastructure crates implement them.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`Namespace`, `GitRef`, `PullRequestNumber`, etc.) |
//! | [`types`] | `TriggerType`, `JobType`, `ProjectHandle`, build request/response values |
//! | [`config`] | Service configuration and per-project package/job configuration |
//! | [`event`] | Null-safe accessor over raw payloads |
//! | [`errors`] | Job, collaborator, and registry errors |
//! | [`ports`] | Collaborator traits and the lazily connected forge handle |
//! | [`classify`] | Event recognizers and configuration resolution |
//! | [`registry`] | Job type → handler mapping |
//! | [`handlers`] | Built-in job handlers |
//! | [`dispatcher`] | Routing, dispatch, and the `process_message` entry point |

pub mod classify;
pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod event;
pub mod handlers;
pub mod identifiers;
pub mod ports;
pub mod registry;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use classify::{
    recognize, ClassifiedEvent, RecognizedEvent, DIST_GIT_COMMIT_TOPIC, PULL_REQUEST_ACTIONS,
};
pub use config::{JobConfig, PackageConfig, ServiceConfig};
pub use dispatcher::Dispatcher;
pub use errors::{ForgeError, JobError, PackagingError, RegistryError};
pub use event::RawEvent;
pub use handlers::{JobContext, JobHandler};
pub use identifiers::{
    BuildId, CommitSha, DispatchId, GitRef, Namespace, PullRequestNumber, RepoName, Topic,
};
pub use ports::{EventSource, GitForge, InboundEvent, LazyForge, PackagingApi};
pub use registry::HandlerRegistry;
pub use types::{
    namespace_and_repo_from_url, CommentTarget, CoprBuild, CoprBuildRequest, ForgeKind, JobType,
    ProjectHandle, Timestamp, TriggerType,
};
