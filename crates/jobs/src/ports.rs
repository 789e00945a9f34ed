//! Port traits for the collaborators the dispatcher depends on.
//!
//! This crate defines *what* is needed; infrastructure crates define *how* to
//! supply it. Implementations must tolerate concurrent shared access, since a
//! deployment may process independent events in parallel against the same
//! collaborator instances.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;

use crate::{
    CommentTarget, CommitSha, CoprBuild, CoprBuildRequest, ForgeError, ForgeKind, GitRef, Namespace,
    PackageConfig, PackagingError, ProjectHandle, PullRequestNumber, RawEvent, RepoName, Timestamp,
    Topic,
};

// ---------------------------------------------------------------------------
// Hosting forges
// ---------------------------------------------------------------------------

/// A git hosting service: upstream (GitHub) or downstream (dist-git).
#[async_trait]
pub trait GitForge: Send + Sync {
    /// Which side of the packaging relationship this forge serves.
    fn kind(&self) -> ForgeKind;

    /// Returns a handle to a project hosted on this forge.
    fn project(&self, namespace: Namespace, repo: RepoName) -> ProjectHandle {
        ProjectHandle::new(namespace, repo, self.kind())
    }

    /// Reads the project's package configuration as of `git_ref`.
    async fn fetch_package_config(
        &self,
        project: &ProjectHandle,
        git_ref: &GitRef,
    ) -> Result<PackageConfig, ForgeError>;

    /// Resolves a tag to the commit it points at.
    async fn sha_from_tag(
        &self,
        project: &ProjectHandle,
        tag: &str,
    ) -> Result<CommitSha, ForgeError>;

    /// Posts a comment on a commit or a pull request of `project`.
    async fn post_comment(
        &self,
        project: &ProjectHandle,
        target: &CommentTarget,
        body: &str,
    ) -> Result<(), ForgeError>;
}

type ForgeConnector = dyn Fn() -> Result<Arc<dyn GitForge>, ForgeError> + Send + Sync;

/// A forge connection built on first use and shared afterwards.
///
/// The connector runs at most once successfully; a failed connection attempt
/// is returned to the caller and retried on the next access.
pub struct LazyForge {
    connect: Box<ForgeConnector>,
    forge: OnceLock<Arc<dyn GitForge>>,
}

impl LazyForge {
    pub fn new<F>(connect: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn GitForge>, ForgeError> + Send + Sync + 'static,
    {
        Self {
            connect: Box::new(connect),
            forge: OnceLock::new(),
        }
    }

    /// Wraps an already-constructed forge.
    pub fn ready(forge: Arc<dyn GitForge>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Arc::clone(&forge));
        Self {
            connect: Box::new(move || Ok(Arc::clone(&forge))),
            forge: cell,
        }
    }

    /// Returns the shared forge, connecting if this is the first use.
    pub fn get(&self) -> Result<Arc<dyn GitForge>, ForgeError> {
        if let Some(forge) = self.forge.get() {
            return Ok(Arc::clone(forge));
        }
        let forge = (self.connect)()?;
        // A concurrent caller may have won the race; keep whichever landed first.
        Ok(Arc::clone(self.forge.get_or_init(|| forge)))
    }

    /// `true` once a connection has been established.
    pub fn is_connected(&self) -> bool {
        self.forge.get().is_some()
    }
}

impl std::fmt::Debug for LazyForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyForge")
            .field("connected", &self.is_connected())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Packaging / build service
// ---------------------------------------------------------------------------

/// Release and build operations that move changes between upstream and downstream.
#[async_trait]
pub trait PackagingApi: Send + Sync {
    /// Reads the upstream project URL from the downstream spec file.
    ///
    /// Returns `Ok(None)` when the spec file declares no URL.
    async fn upstream_url_from_spec(
        &self,
        package: &PackageConfig,
        downstream: &ProjectHandle,
    ) -> Result<Option<String>, PackagingError>;

    /// Carries commits from a dist-git branch back to an upstream branch.
    async fn sync_from_downstream(
        &self,
        package: &PackageConfig,
        upstream: &ProjectHandle,
        dist_git_branch: &str,
        upstream_branch: &str,
    ) -> Result<(), PackagingError>;

    /// Checks an upstream pull request against a dist-git branch.
    async fn sync_pr(
        &self,
        package: &PackageConfig,
        upstream: &ProjectHandle,
        pr: PullRequestNumber,
        dist_git_branch: &str,
    ) -> Result<(), PackagingError>;

    /// Proposes an upstream release as an update of a dist-git branch.
    async fn sync_release(
        &self,
        package: &PackageConfig,
        upstream: &ProjectHandle,
        dist_git_branch: &str,
        version: &str,
    ) -> Result<(), PackagingError>;

    /// Submits a Copr build.
    async fn run_copr_build(
        &self,
        package: &PackageConfig,
        project: &ProjectHandle,
        request: &CoprBuildRequest,
    ) -> Result<CoprBuild, PackagingError>;
}

// ---------------------------------------------------------------------------
// Event sources
// ---------------------------------------------------------------------------

/// One event as handed over by the ingestion layer.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub payload: RawEvent,
    /// Bus topic, when the event came from the message bus.
    pub topic: Option<Topic>,
    pub received_at: Timestamp,
}

/// A stream of inbound events.
#[async_trait]
pub trait EventSource: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Waits for the next event. `Ok(None)` means the source is exhausted.
    async fn next_event(&mut self) -> Result<Option<InboundEvent>, Self::Error>;
}
