//! Offline collaborators for replaying recorded events.
//!
//! Nothing here touches the network. [`LocalForge`] serves package
//! configurations from a directory tree and logs the comments it is asked to
//! post. [`RecordingPackagingApi`] reads spec files from disk, logs every
//! packaging operation and hands out sequential build ids.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use jobs::{
    BuildId, CommentTarget, CommitSha, CoprBuild, CoprBuildRequest, ForgeError, ForgeKind, GitForge,
    GitRef, PackageConfig, PackagingApi, PackagingError, ProjectHandle, PullRequestNumber,
};
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// LocalForge
// ---------------------------------------------------------------------------

/// A forge backed by a directory of package configurations.
///
/// The configuration of `namespace/repo` lives in `<root>/<namespace>/<repo>.json`.
/// One file serves every ref of the project. Tags cannot be resolved.
#[derive(Debug)]
pub struct LocalForge {
    kind: ForgeKind,
    root: PathBuf,
}

impl LocalForge {
    /// Opens `root` as a forge of the given kind.
    pub fn connect(kind: ForgeKind, root: impl Into<PathBuf>) -> Result<Self, ForgeError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ForgeError::Connection {
                forge: kind,
                message: format!("'{}' is not a directory", root.display()),
            });
        }
        debug!(forge = %kind, root = %root.display(), "Local forge opened");
        Ok(Self { kind, root })
    }

    fn config_path(&self, project: &ProjectHandle) -> PathBuf {
        self.root
            .join(project.namespace.as_str())
            .join(format!("{}.json", project.repo))
    }
}

fn label(project: &ProjectHandle) -> String {
    format!("{}/{}", project.namespace, project.repo)
}

#[async_trait]
impl GitForge for LocalForge {
    fn kind(&self) -> ForgeKind {
        self.kind
    }

    async fn fetch_package_config(
        &self,
        project: &ProjectHandle,
        git_ref: &GitRef,
    ) -> Result<PackageConfig, ForgeError> {
        let path = self.config_path(project);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ForgeError::ConfigNotFound {
                    project: label(project),
                    git_ref: git_ref.to_string(),
                });
            }
            Err(e) => {
                return Err(ForgeError::Request {
                    message: format!("failed to read '{}': {e}", path.display()),
                });
            }
        };
        serde_json::from_str(&text).map_err(|e| ForgeError::InvalidConfig {
            project: label(project),
            message: e.to_string(),
        })
    }

    async fn sha_from_tag(
        &self,
        project: &ProjectHandle,
        tag: &str,
    ) -> Result<CommitSha, ForgeError> {
        Err(ForgeError::TagNotFound {
            project: label(project),
            tag: tag.to_string(),
        })
    }

    async fn post_comment(
        &self,
        project: &ProjectHandle,
        target: &CommentTarget,
        body: &str,
    ) -> Result<(), ForgeError> {
        info!(forge = %self.kind, project = %label(project), ?target, body, "Comment recorded");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RecordingPackagingApi
// ---------------------------------------------------------------------------

/// Logs packaging operations instead of performing them.
///
/// Spec files are read from `<spec_root>/<namespace>/<repo>/<specfile>`. When
/// the package names no spec file, or the file is absent, the package config's
/// own `upstream_project_url` stands in for the spec's `URL:` tag.
#[derive(Debug)]
pub struct RecordingPackagingApi {
    spec_root: PathBuf,
    next_build_id: AtomicU64,
}

impl RecordingPackagingApi {
    pub fn new(spec_root: impl Into<PathBuf>) -> Self {
        Self {
            spec_root: spec_root.into(),
            next_build_id: AtomicU64::new(1),
        }
    }
}

/// Value of the `URL:` tag of an RPM spec file.
fn spec_url(spec: &str) -> Option<String> {
    spec.lines().find_map(|line| {
        let (tag, value) = line.split_once(':')?;
        let value = value.trim();
        let is_url = tag.trim().eq_ignore_ascii_case("url") && !value.is_empty();
        is_url.then(|| value.to_string())
    })
}

#[async_trait]
impl PackagingApi for RecordingPackagingApi {
    async fn upstream_url_from_spec(
        &self,
        package: &PackageConfig,
        downstream: &ProjectHandle,
    ) -> Result<Option<String>, PackagingError> {
        let Some(specfile) = package.specfile() else {
            debug!(project = %label(downstream), "No spec file configured");
            return Ok(package.upstream_project_url.clone());
        };
        let path = self
            .spec_root
            .join(downstream.namespace.as_str())
            .join(downstream.repo.as_str())
            .join(specfile);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(spec_url(&text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Spec file not found");
                Ok(package.upstream_project_url.clone())
            }
            Err(e) => Err(PackagingError::OperationFailed {
                operation: "read spec file",
                message: format!("'{}': {e}", path.display()),
            }),
        }
    }

    async fn sync_from_downstream(
        &self,
        _package: &PackageConfig,
        upstream: &ProjectHandle,
        dist_git_branch: &str,
        upstream_branch: &str,
    ) -> Result<(), PackagingError> {
        info!(
            upstream = %label(upstream),
            dist_git_branch,
            upstream_branch,
            "Recorded sync from downstream"
        );
        Ok(())
    }

    async fn sync_pr(
        &self,
        _package: &PackageConfig,
        upstream: &ProjectHandle,
        pr: PullRequestNumber,
        dist_git_branch: &str,
    ) -> Result<(), PackagingError> {
        info!(
            upstream = %label(upstream),
            pr = pr.as_u64(),
            dist_git_branch,
            "Recorded pull request sync"
        );
        Ok(())
    }

    async fn sync_release(
        &self,
        _package: &PackageConfig,
        upstream: &ProjectHandle,
        dist_git_branch: &str,
        version: &str,
    ) -> Result<(), PackagingError> {
        info!(
            upstream = %label(upstream),
            dist_git_branch,
            version,
            "Recorded release sync"
        );
        Ok(())
    }

    async fn run_copr_build(
        &self,
        _package: &PackageConfig,
        project: &ProjectHandle,
        request: &CoprBuildRequest,
    ) -> Result<CoprBuild, PackagingError> {
        let id = self.next_build_id.fetch_add(1, Ordering::Relaxed);
        info!(
            project = %label(project),
            owner = %request.owner,
            copr_project = %request.project,
            committish = %request.committish,
            chroots = ?request.chroots,
            build_id = id,
            "Recorded copr build"
        );
        Ok(CoprBuild {
            build_id: BuildId::new(id),
            info_url: format!(
                "offline://copr/{}/{}/build/{id}",
                request.owner, request.project
            ),
        })
    }
}

#[cfg(test)]
#[path = "offline_tests.rs"]
mod tests;
