//! Service-wide and per-project configuration.
//!
//! [`ServiceConfig`] is built once by the composition root. [`PackageConfig`]
//! is the declarative configuration a project keeps in its own repository; it
//! is fetched fresh for every event through [`crate::GitForge`] and discarded
//! once dispatch completes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{JobType, TriggerType};

/// Branch used when a job does not name a dist-git branch.
pub const DEFAULT_DIST_GIT_BRANCH: &str = "master";

/// Upstream branch that downstream commits are synced into by default.
pub const DEFAULT_UPSTREAM_BRANCH: &str = "master";

/// Copr owner used when a build job does not name one.
pub const DEFAULT_COPR_OWNER: &str = "packit";

/// Metadata keys understood by the built-in handlers.
pub mod metadata_keys {
    pub const DIST_GIT_BRANCH: &str = "dist-git-branch";
    pub const TARGETS: &str = "targets";
    pub const OWNER: &str = "owner";
    pub const PROJECT: &str = "project";
}

// ---------------------------------------------------------------------------
// Service configuration
// ---------------------------------------------------------------------------

/// Configuration of the dispatching service itself.
///
/// Forge credentials are not part of it; they belong to the connectors the
/// composition root hands to [`crate::LazyForge`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Upstream branch receiving commits synced from downstream.
    pub upstream_branch: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            upstream_branch: DEFAULT_UPSTREAM_BRANCH.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Package configuration
// ---------------------------------------------------------------------------

/// One job declared by a project: a job type, the trigger it runs for, and
/// handler-specific metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    pub job: JobType,
    pub trigger: TriggerType,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl JobConfig {
    pub fn new(job: JobType, trigger: TriggerType) -> Self {
        Self {
            job,
            trigger,
            metadata: Map::new(),
        }
    }

    /// Adds a metadata entry, builder-style.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Returns a non-empty string metadata value.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Returns the string items of a list metadata value.
    ///
    /// A single string is accepted as a one-element list. Non-string items are
    /// skipped. Returns an empty vector when the key is absent.
    pub fn metadata_list(&self, key: &str) -> Vec<String> {
        match self.metadata.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// The dist-git branch a job targets, falling back to [`DEFAULT_DIST_GIT_BRANCH`].
    pub fn dist_git_branch(&self) -> &str {
        self.metadata_str(metadata_keys::DIST_GIT_BRANCH)
            .unwrap_or(DEFAULT_DIST_GIT_BRANCH)
    }
}

/// A project's declarative packaging configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageConfig {
    /// Declared jobs, in the order the project lists them.
    #[serde(default)]
    pub jobs: Vec<JobConfig>,

    /// Web URL of the upstream project.
    ///
    /// Filled in by the release and pull-request classifiers from the event,
    /// and by the downstream sync handler from the spec file.
    #[serde(default)]
    pub upstream_project_url: Option<String>,

    /// Name of the package in dist-git, when it differs from the repository.
    #[serde(default)]
    pub downstream_package_name: Option<String>,

    /// Path of the spec file relative to the repository root.
    #[serde(default)]
    pub specfile_path: Option<String>,
}

impl PackageConfig {
    pub fn new(jobs: Vec<JobConfig>) -> Self {
        Self {
            jobs,
            ..Self::default()
        }
    }

    /// Path of the spec file: `specfile_path` if set, otherwise
    /// `<downstream_package_name>.spec`.
    pub fn specfile(&self) -> Option<String> {
        self.specfile_path.clone().or_else(|| {
            self.downstream_package_name
                .as_ref()
                .map(|name| format!("{name}.spec"))
        })
    }

    /// Declarations whose trigger equals `trigger`, in declared order.
    pub fn jobs_for(&self, trigger: TriggerType) -> impl Iterator<Item = &JobConfig> {
        self.jobs.iter().filter(move |job| job.trigger == trigger)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
