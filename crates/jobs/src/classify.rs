//! Event classifiers.
//!
//! Classification happens in two steps:
//!
//! 1. **Recognition** ([`recognize`]) is pure. Each recognizer inspects the raw
//!    payload for one known shape and extracts the project identity and ref.
//!    A missing or empty field is a soft failure: it is logged and the event
//!    is reported as unrecognized.
//! 2. **Resolution** ([`RecognizedEvent::resolve`]) fetches the project's
//!    package configuration at the extracted ref from the forge that hosts it.
//!    Failures here are collaborator failures and propagate.
//!
//! Recognizers are tried in a fixed order: release, pull request, dist-git
//! commit. The first match wins; later recognizers are not consulted.

use tracing::{debug, info, warn};

use crate::{
    ForgeError, ForgeKind, GitForge, GitRef, Namespace, PackageConfig, ProjectHandle,
    PullRequestNumber, RawEvent, RepoName, TriggerType,
};

/// Bus topic announcing new commits pushed to a dist-git repository.
pub const DIST_GIT_COMMIT_TOPIC: &str = "org.fedoraproject.prod.git.receive";

/// Pull-request actions that mean the head changed and jobs should run.
pub const PULL_REQUEST_ACTIONS: [&str; 3] = ["opened", "reopened", "synchronize"];

// ---------------------------------------------------------------------------
// Recognition
// ---------------------------------------------------------------------------

/// Project identity and ref extracted from a recognized event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizedEvent {
    /// A GitHub release was published.
    Release {
        namespace: Namespace,
        repo: RepoName,
        tag: GitRef,
        /// `repository.html_url`, recorded as the upstream project URL.
        html_url: Option<String>,
    },
    /// A GitHub pull request was opened, reopened, or synchronized.
    PullRequest {
        /// Owner of the head (source) repository.
        namespace: Namespace,
        /// Name of the head (source) repository.
        repo: RepoName,
        head_ref: GitRef,
        number: PullRequestNumber,
        html_url: Option<String>,
    },
    /// Commits were pushed to a dist-git branch.
    DistGitCommit {
        namespace: Namespace,
        repo: RepoName,
        branch: GitRef,
    },
}

impl RecognizedEvent {
    pub fn trigger(&self) -> TriggerType {
        match self {
            Self::Release { .. } => TriggerType::Release,
            Self::PullRequest { .. } => TriggerType::PullRequest,
            Self::DistGitCommit { .. } => TriggerType::Commit,
        }
    }

    /// The forge hosting the project the event is about.
    pub fn forge(&self) -> ForgeKind {
        match self {
            Self::Release { .. } | Self::PullRequest { .. } => ForgeKind::Upstream,
            Self::DistGitCommit { .. } => ForgeKind::Downstream,
        }
    }

    /// Fetches the package configuration this event refers to.
    ///
    /// `forge` must be the forge named by [`RecognizedEvent::forge`].
    pub async fn resolve(self, forge: &dyn GitForge) -> Result<ClassifiedEvent, ForgeError> {
        let trigger = self.trigger();
        let (namespace, repo, git_ref, html_url) = match self {
            Self::Release {
                namespace,
                repo,
                tag,
                html_url,
            } => (namespace, repo, tag, html_url),
            Self::PullRequest {
                namespace,
                repo,
                head_ref,
                html_url,
                ..
            } => (namespace, repo, head_ref, html_url),
            Self::DistGitCommit {
                namespace,
                repo,
                branch,
            } => (namespace, repo, branch, None),
        };

        let project = forge.project(namespace, repo);
        let mut package_config = forge.fetch_package_config(&project, &git_ref).await?;
        if let Some(url) = html_url {
            package_config.upstream_project_url = Some(url);
        } else {
            debug!(%project, "Event has no repository URL, keeping the configured upstream URL");
        }

        Ok(ClassifiedEvent {
            trigger,
            package_config,
            project,
        })
    }
}

/// Recognizes a published GitHub release.
pub fn recognize_release(event: &RawEvent) -> Option<RecognizedEvent> {
    let action = event.str_at(&["action"]);
    debug!(?action, "Checking for a release event");
    if action != Some("published") || !event.is_truthy_at(&["release"]) {
        return None;
    }

    let namespace = event.str_at(&["repository", "owner", "login"]);
    let repo = event.str_at(&["repository", "name"]);
    let (Some(namespace), Some(repo)) = (namespace, repo) else {
        warn!("Could not determine the full name of the released repository");
        return None;
    };
    let Some(tag) = event.str_at(&["release", "tag_name"]) else {
        warn!("Release tag name is not set");
        return None;
    };

    info!(%namespace, %repo, %tag, "New release event");
    Some(RecognizedEvent::Release {
        namespace: Namespace::new(namespace)?,
        repo: RepoName::new(repo)?,
        tag: GitRef::new(tag)?,
        html_url: event
            .str_at(&["repository", "html_url"])
            .map(str::to_string),
    })
}

/// Recognizes an opened, reopened, or synchronized GitHub pull request.
pub fn recognize_pull_request(event: &RawEvent) -> Option<RecognizedEvent> {
    if !event.is_truthy_at(&["pull_request"]) {
        debug!("Not a pull request event");
        return None;
    }
    let action = event.str_at(&["action"]);
    debug!(?action, "Checking for a pull request event");
    let number = event.u64_at(&["number"]).filter(|n| *n != 0);
    let (Some(action), Some(number)) = (action, number) else {
        return None;
    };
    if !PULL_REQUEST_ACTIONS.contains(&action) {
        return None;
    }

    let namespace = event.str_at(&["pull_request", "head", "repo", "owner", "login"]);
    let repo = event.str_at(&["pull_request", "head", "repo", "name"]);
    let (Some(namespace), Some(repo)) = (namespace, repo) else {
        warn!("Could not determine the full name of the pull request head repository");
        return None;
    };
    let Some(head_ref) = event.str_at(&["pull_request", "head", "ref"]) else {
        warn!("Ref the pull request is coming from is not set");
        return None;
    };

    let target_repo = event.str_at(&["repository", "full_name"]);
    info!(pr = number, ?target_repo, "GitHub pull request event");
    Some(RecognizedEvent::PullRequest {
        namespace: Namespace::new(namespace)?,
        repo: RepoName::new(repo)?,
        head_ref: GitRef::new(head_ref)?,
        number: PullRequestNumber::new(number),
        html_url: event
            .str_at(&["repository", "html_url"])
            .map(str::to_string),
    })
}

/// Recognizes a dist-git push announced on the message bus.
pub fn recognize_dist_git_commit(event: &RawEvent) -> Option<RecognizedEvent> {
    let topic = event.str_at(&["topic"]);
    debug!(?topic, "Checking for a dist-git commit message");
    if topic != Some(DIST_GIT_COMMIT_TOPIC) {
        return None;
    }

    let namespace = event.str_at(&["msg", "commit", "namespace"]);
    let repo = event.str_at(&["msg", "commit", "repo"]);
    let (Some(namespace), Some(repo)) = (namespace, repo) else {
        warn!("Could not determine the full name of the dist-git repository");
        return None;
    };
    let Some(branch) = event.str_at(&["msg", "commit", "branch"]) else {
        warn!("Target branch for the new commits is not set");
        return None;
    };

    let msg_id = event.str_at(&["msg_id"]);
    info!(%namespace, %repo, %branch, ?msg_id, "New commits added to dist-git");
    Some(RecognizedEvent::DistGitCommit {
        namespace: Namespace::new(namespace)?,
        repo: RepoName::new(repo)?,
        branch: GitRef::new(branch)?,
    })
}

/// Tries every recognizer in priority order and returns the first match.
///
/// An empty payload is never recognized.
pub fn recognize(event: &RawEvent) -> Option<RecognizedEvent> {
    if event.is_empty() {
        return None;
    }
    recognize_release(event)
        .or_else(|| recognize_pull_request(event))
        .or_else(|| recognize_dist_git_commit(event))
}

// ---------------------------------------------------------------------------
// Classification result
// ---------------------------------------------------------------------------

/// A fully classified event: why jobs run, what the project declared, and
/// which project the event is about.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedEvent {
    pub trigger: TriggerType,
    pub package_config: PackageConfig,
    pub project: ProjectHandle,
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
