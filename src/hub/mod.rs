//! Access to the remote build-tagging hub.
//!
//! [`BuildService`] is the contract both the candidate diff and the promoter
//! consume. [`HubClient`] talks to a real hub over HTTP; [`InMemoryHub`] keeps
//! everything in process.

pub mod batch;
pub mod client;
pub mod error;
pub mod memory;

use std::collections::BTreeSet;

pub use batch::{
    execute_phased, BatchReport, CallFailure, CallOutcome, CallResult, Mutation, MutationBatch,
};
pub use client::HubClient;
pub use error::HubError;
pub use memory::InMemoryHub;

use crate::models::build::{by_id, latest_per_package};
use crate::models::{Build, BuildsById, CandidateSet, StageTag};

/// Operations the hub must provide.
///
/// Implementations are handed around explicitly; nothing in this crate keeps
/// a global session.
pub trait BuildService {
    /// Every build currently carrying `tag`.
    fn list_tagged(&self, tag: &StageTag) -> Result<Vec<Build>, HubError>;

    /// Look up a build by nvr. `Ok(None)` when the hub does not know it.
    fn get_build(&self, nvr: &str) -> Result<Option<Build>, HubError>;

    /// Current tag membership of a build.
    fn list_build_tags(&self, build: &Build) -> Result<BTreeSet<StageTag>, HubError>;

    /// Execute a batch and report the outcome of every call.
    fn submit(&self, batch: &MutationBatch) -> BatchReport;

    /// Newest build of each package carrying `tag`.
    fn list_latest_builds(&self, tag: &StageTag) -> Result<CandidateSet, HubError> {
        Ok(latest_per_package(self.list_tagged(tag)?))
    }

    /// Every build carrying `tag`, keyed by id.
    fn list_all_builds(&self, tag: &StageTag) -> Result<BuildsById, HubError> {
        Ok(by_id(self.list_tagged(tag)?))
    }
}
