//! Mutation batches.
//!
//! A batch is built explicitly for one call and handed to
//! [`super::BuildService::submit`]. Calls are grouped into phases: the hub
//! runs a phase only when every call of the previous phase was applied, which
//! is how a promotion guarantees its untag calls never run after a failed tag.

use serde::Serialize;
use std::fmt;

use crate::models::StageTag;

/// One mutating hub call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum Mutation {
    TagBuild {
        tag: StageTag,
        build: String,
    },
    /// With `strict == false` untagging a build that does not carry the tag
    /// is a no-op rather than an error.
    UntagBuild {
        tag: StageTag,
        build: String,
        strict: bool,
    },
    AddPackage {
        tag: StageTag,
        package: String,
        owner: String,
    },
    /// `force` lets removal proceed while builds of the package are still
    /// tagged. It does not untag those builds.
    RemovePackage {
        tag: StageTag,
        package: String,
        force: bool,
    },
}

impl Mutation {
    pub fn tag_build(tag: &StageTag, build: &str) -> Self {
        Mutation::TagBuild {
            tag: tag.clone(),
            build: build.to_string(),
        }
    }

    /// Non-strict untag, safe to repeat.
    pub fn untag_build(tag: &StageTag, build: &str) -> Self {
        Mutation::UntagBuild {
            tag: tag.clone(),
            build: build.to_string(),
            strict: false,
        }
    }

    /// Hub method name.
    pub fn method(&self) -> &'static str {
        match self {
            Mutation::TagBuild { .. } => "tagBuild",
            Mutation::UntagBuild { .. } => "untagBuild",
            Mutation::AddPackage { .. } => "packageListAdd",
            Mutation::RemovePackage { .. } => "packageListRemove",
        }
    }

    pub fn tag(&self) -> &StageTag {
        match self {
            Mutation::TagBuild { tag, .. }
            | Mutation::UntagBuild { tag, .. }
            | Mutation::AddPackage { tag, .. }
            | Mutation::RemovePackage { tag, .. } => tag,
        }
    }

    /// Build nvr or package name the call acts on.
    pub fn subject(&self) -> &str {
        match self {
            Mutation::TagBuild { build, .. } | Mutation::UntagBuild { build, .. } => build,
            Mutation::AddPackage { package, .. } | Mutation::RemovePackage { package, .. } => {
                package
            }
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", self.method(), self.tag(), self.subject())
    }
}

/// Ordered mutations, split into phases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationBatch {
    phases: Vec<Vec<Mutation>>,
}

impl MutationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call to the current phase.
    pub fn push(&mut self, mutation: Mutation) {
        match self.phases.last_mut() {
            Some(phase) => phase.push(mutation),
            None => self.phases.push(vec![mutation]),
        }
    }

    /// Close the current phase. Calls pushed afterwards only run once every
    /// earlier call was applied. Closing an empty phase does nothing.
    pub fn barrier(&mut self) {
        if self.phases.last().is_some_and(|phase| !phase.is_empty()) {
            self.phases.push(Vec::new());
        }
    }

    /// Non-empty phases in submission order.
    pub fn phases(&self) -> impl Iterator<Item = &[Mutation]> {
        self.phases
            .iter()
            .filter(|phase| !phase.is_empty())
            .map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mutation> {
        self.phases.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.phases.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Extend<Mutation> for MutationBatch {
    fn extend<T: IntoIterator<Item = Mutation>>(&mut self, iter: T) {
        for mutation in iter {
            self.push(mutation);
        }
    }
}

/// Result of one call in a submitted batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Applied,
    Failed(String),
    /// Not attempted because an earlier phase did not fully apply.
    Skipped,
}

impl CallOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CallOutcome::Applied)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallResult {
    pub mutation: Mutation,
    pub outcome: CallOutcome,
}

/// A call that did not apply, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFailure {
    pub mutation: Mutation,
    pub reason: String,
}

impl fmt::Display for CallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.mutation, self.reason)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub results: Vec<CallResult>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|r| r.outcome.is_applied())
    }

    pub fn applied(&self) -> impl Iterator<Item = &Mutation> {
        self.results
            .iter()
            .filter(|r| r.outcome.is_applied())
            .map(|r| &r.mutation)
    }

    /// Failed and skipped calls.
    pub fn failures(&self) -> Vec<CallFailure> {
        self.results
            .iter()
            .filter_map(|r| match &r.outcome {
                CallOutcome::Applied => None,
                CallOutcome::Failed(reason) => Some(CallFailure {
                    mutation: r.mutation.clone(),
                    reason: reason.clone(),
                }),
                CallOutcome::Skipped => Some(CallFailure {
                    mutation: r.mutation.clone(),
                    reason: "not attempted after an earlier call failed".to_string(),
                }),
            })
            .collect()
    }
}

/// Run `batch` phase by phase through `run_phase`, stopping after the first
/// phase with a call that did not apply. Remaining calls are reported as
/// [`CallOutcome::Skipped`].
///
/// `run_phase` returns one outcome per call; missing outcomes count as
/// failures.
pub fn execute_phased<F>(batch: &MutationBatch, mut run_phase: F) -> BatchReport
where
    F: FnMut(&[Mutation]) -> Vec<CallOutcome>,
{
    let mut results = Vec::with_capacity(batch.len());
    let mut halted = false;

    for phase in batch.phases() {
        if halted {
            results.extend(phase.iter().map(|mutation| CallResult {
                mutation: mutation.clone(),
                outcome: CallOutcome::Skipped,
            }));
            continue;
        }

        let mut outcomes = run_phase(phase).into_iter();
        for mutation in phase {
            let outcome = outcomes
                .next()
                .unwrap_or_else(|| CallOutcome::Failed("hub returned no result".to_string()));
            if !outcome.is_applied() {
                halted = true;
            }
            results.push(CallResult {
                mutation: mutation.clone(),
                outcome,
            });
        }
    }

    BatchReport { results }
}
