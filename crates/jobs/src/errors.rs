//! Error types for classification, registration, and job execution.
//!
//! An event that does not match any known shape is *not* an error; the
//! classifiers report it as `None`. The types here cover the conditions that
//! do propagate: collaborator failures, configuration problems found while a
//! handler runs, and registry misuse at start-up.

use thiserror::Error;

use crate::{ForgeKind, JobType};

// ---------------------------------------------------------------------------
// Collaborator errors
// ---------------------------------------------------------------------------

/// Failure reported by a [`crate::GitForge`] implementation.
#[derive(Debug, Error)]
pub enum ForgeError {
    /// The project has no package configuration at the requested ref.
    #[error("No package configuration found in {project} at '{git_ref}'")]
    ConfigNotFound {
        /// Project path in `namespace/repo` form.
        project: String,
        git_ref: String,
    },

    /// The package configuration exists but could not be read.
    #[error("Invalid package configuration in {project}: {message}")]
    InvalidConfig { project: String, message: String },

    /// A tag could not be resolved to a commit.
    #[error("Tag '{tag}' not found in {project}")]
    TagNotFound { project: String, tag: String },

    /// The forge connection could not be established.
    #[error("Could not connect to the {forge} forge: {message}")]
    Connection { forge: ForgeKind, message: String },

    /// Any other request failure (network, authentication, rate limiting).
    #[error("Forge request failed: {message}")]
    Request { message: String },
}

/// Failure reported by a [`crate::PackagingApi`] implementation.
#[derive(Debug, Error)]
pub enum PackagingError {
    /// The packaging operation was attempted and failed.
    #[error("{operation} failed: {message}")]
    OperationFailed {
        /// Name of the operation, e.g. `"sync_release"`.
        operation: &'static str,
        message: String,
    },

    /// The build service rejected or failed the submission.
    #[error("Build submission failed: {message}")]
    BuildFailed { message: String },
}

// ---------------------------------------------------------------------------
// Job errors
// ---------------------------------------------------------------------------

/// Errors that abort a single handler run and propagate out of dispatch.
#[derive(Debug, Error)]
pub enum JobError {
    /// The package or job configuration lacks something the handler requires.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// The event payload lacks a field the handler needs.
    #[error("Event payload has no value at '{path}'")]
    MissingEventField {
        /// Dotted path of the missing field, e.g. `"release.tag_name"`.
        path: String,
    },

    #[error(transparent)]
    Forge(#[from] ForgeError),

    #[error(transparent)]
    Packaging(#[from] PackagingError),
}

impl JobError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn missing_field(path: &[&str]) -> Self {
        Self::MissingEventField {
            path: path.join("."),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry errors
// ---------------------------------------------------------------------------

/// Errors raised while building a [`crate::HandlerRegistry`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A second handler was registered for a job type that already has one.
    #[error("A handler for job type '{0}' is already registered")]
    DuplicateHandler(JobType),

    /// A handler declared no triggers and could never run.
    #[error("Handler for job type '{0}' declares no triggers")]
    NoTriggers(JobType),
}
