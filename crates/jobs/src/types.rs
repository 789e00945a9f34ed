//! Shared value types for job dispatch.
//!
//! The two closed enumerations, [`TriggerType`] (why work runs) and
//! [`JobType`] (what work runs), are the vocabulary shared by package
//! configuration, the classifiers, the registry, and the handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BuildId, CommitSha, GitRef, Namespace, PullRequestNumber, RepoName};

// ---------------------------------------------------------------------------
// Triggers and job types
// ---------------------------------------------------------------------------

/// The classified reason an inbound event implies work should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    /// A release was published on the upstream project.
    Release,
    /// A pull request was opened, reopened, or updated upstream.
    PullRequest,
    /// New commits were pushed to the downstream (dist-git) repository.
    Commit,
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Release => "release",
            Self::PullRequest => "pull_request",
            Self::Commit => "commit",
        };
        f.write_str(s)
    }
}

/// The kind of work a job declaration asks for.
///
/// Each variant is served by at most one registered handler. Adding a variant
/// here without registering a handler is reported by
/// [`crate::HandlerRegistry::unhandled_job_types`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    /// Propose a new upstream release as an update of the downstream package.
    ProposeDownstream,
    /// Check that an upstream pull request still produces a valid downstream update.
    CheckDownstream,
    /// Carry commits pushed downstream back to the upstream repository.
    SyncFromDownstream,
    /// Submit a scratch build to the Copr build service.
    CoprBuild,
    /// Submit an official build to the downstream build system.
    Build,
}

impl JobType {
    /// Every job type, in declaration order.
    pub const ALL: [JobType; 5] = [
        JobType::ProposeDownstream,
        JobType::CheckDownstream,
        JobType::SyncFromDownstream,
        JobType::CoprBuild,
        JobType::Build,
    ];
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ProposeDownstream => "propose_downstream",
            Self::CheckDownstream => "check_downstream",
            Self::SyncFromDownstream => "sync_from_downstream",
            Self::CoprBuild => "copr_build",
            Self::Build => "build",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Which hosting collaborator backs a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForgeKind {
    /// The upstream source forge (GitHub).
    Upstream,
    /// The downstream packaging forge (dist-git / Pagure).
    Downstream,
}

impl std::fmt::Display for ForgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upstream => f.write_str("upstream"),
            Self::Downstream => f.write_str("downstream"),
        }
    }
}

/// A handle to a concrete project on one of the two forges.
///
/// Handles are cheap values; they carry no connection state. Operations on the
/// project go through the [`crate::GitForge`] matching [`ProjectHandle::forge`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectHandle {
    pub namespace: Namespace,
    pub repo: RepoName,
    pub forge: ForgeKind,
}

impl ProjectHandle {
    pub fn new(namespace: Namespace, repo: RepoName, forge: ForgeKind) -> Self {
        Self {
            namespace,
            repo,
            forge,
        }
    }

    /// Default Copr project name for this project: `"{namespace}-{repo}"`.
    pub fn default_copr_project(&self) -> String {
        format!("{}-{}", self.namespace, self.repo)
    }
}

impl std::fmt::Display for ProjectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({})", self.namespace, self.repo, self.forge)
    }
}

/// Splits a project URL into its namespace and repository name.
///
/// Accepts web URLs (`https://github.com/packit/ogr`), clone URLs with a
/// `.git` suffix, and SCP-style SSH addresses (`git@github.com:packit/ogr.git`).
/// Returns `None` when fewer than two path segments are present.
pub fn namespace_and_repo_from_url(url: &str) -> Option<(Namespace, RepoName)> {
    let trimmed = url.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    let path = match trimmed.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map(|(_, path)| path)?,
        None => trimmed.split_once(':').map_or(trimmed, |(_, path)| path),
    };

    let mut segments = path.rsplit('/').filter(|s| !s.is_empty());
    let repo = RepoName::new(segments.next()?)?;
    let namespace = Namespace::new(segments.next()?)?;
    Some((namespace, repo))
}

// ---------------------------------------------------------------------------
// Collaborator request / response values
// ---------------------------------------------------------------------------

/// Where a status comment is posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentTarget {
    /// A comment on a single commit.
    Commit(CommitSha),
    /// A comment on a pull request conversation.
    PullRequest(PullRequestNumber),
}

/// Arguments for a Copr build submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoprBuildRequest {
    /// Copr owner (user or group).
    pub owner: String,
    /// Copr project name.
    pub project: String,
    /// Commit, tag, or branch to build.
    pub committish: GitRef,
    /// URL the build service clones the sources from.
    pub clone_url: String,
    /// Build targets (chroots), e.g. `"fedora-rawhide-x86_64"`.
    pub chroots: Vec<String>,
}

/// Result of a successful Copr build submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoprBuild {
    pub build_id: BuildId,
    /// Web page with build progress and results.
    pub info_url: String,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
