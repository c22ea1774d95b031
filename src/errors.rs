//! Error types for listing, promotion and configuration.
//!
//! [`Error`] covers failures that abort a whole operation. [`PromoteError`]
//! covers failures of a single build inside a bulk promotion; those are
//! collected into a [`crate::promote::PromotionReport`] instead of aborting
//! the remaining builds.

use std::path::PathBuf;
use thiserror::Error;

use crate::hub::{CallFailure, HubError};
use crate::models::StageTag;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// A listing call failed; the diff that needed it is abandoned.
    #[error("failed to list builds tagged '{tag}': {source}")]
    RemoteList {
        tag: StageTag,
        #[source]
        source: HubError,
    },

    #[error("invalid target '{target}', expected one of: {}", .valid.join(", "))]
    InvalidTarget { target: String, valid: Vec<String> },

    #[error(
        "workflow '{workflow}' stage '{stage}' requires tag index {index}, \
         but release '{release}' has only {tag_count} tags"
    )]
    InvalidWorkflow {
        release: String,
        workflow: String,
        stage: String,
        index: usize,
        tag_count: usize,
    },

    #[error("workflow '{workflow}' of release '{release}' has no '{stage}' stage")]
    MissingStage {
        release: String,
        workflow: String,
        stage: String,
    },

    #[error("unknown release '{0}'")]
    UnknownRelease(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{} package list call(s) failed:\n  - {}", .failures.len(), join_failures(.failures))]
    Registration { failures: Vec<CallFailure> },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Failure to promote one build. Sibling builds are unaffected.
#[derive(Debug, Error)]
pub enum PromoteError {
    #[error("build '{build}' does not exist")]
    BuildNotFound { build: String },

    #[error("failed to look up build '{build}': {source}")]
    RemoteLookup {
        build: String,
        #[source]
        source: HubError,
    },

    #[error(
        "{} tag call(s) failed for build '{build}':\n  - {}",
        .failures.len(),
        join_failures(.failures)
    )]
    RemoteMutation {
        build: String,
        failures: Vec<CallFailure>,
    },
}

impl PromoteError {
    pub fn build(&self) -> &str {
        match self {
            PromoteError::BuildNotFound { build }
            | PromoteError::RemoteLookup { build, .. }
            | PromoteError::RemoteMutation { build, .. } => build,
        }
    }
}

fn join_failures(failures: &[CallFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n  - ")
}
