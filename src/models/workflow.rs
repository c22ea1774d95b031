use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::errors::{Error, Result};

/// The target that removes a build from every stage tag of a release.
pub const NONE_TARGET: &str = "none";

pub const UNIFIED_BUILDREQS: &str = "unified_buildreqs";
pub const SEPARATED_BUILDREQS: &str = "separated_buildreqs";

pub const CANDIDATE: &str = "candidate";
pub const TESTING: &str = "testing";
pub const RELEASE: &str = "release";

/// Mapping from a target stage name to the indices (into a release's stage
/// tag list) a build must carry once it reaches that stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Workflow {
    stages: BTreeMap<String, BTreeSet<usize>>,
}

impl Workflow {
    pub fn new<S, I>(stages: impl IntoIterator<Item = (S, I)>) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = usize>,
    {
        Self {
            stages: stages
                .into_iter()
                .map(|(name, indices)| (name.into(), indices.into_iter().collect()))
                .collect(),
        }
    }

    /// Build requirements share the candidate tag.
    ///
    /// 0 is candidate, 1 is testing, 2 is release. A build in a later stage
    /// keeps every earlier tag.
    pub fn unified_buildreqs() -> Self {
        Self::new([
            (CANDIDATE, vec![0]),
            (TESTING, vec![0, 1]),
            (RELEASE, vec![0, 1, 2]),
        ])
    }

    /// Build requirements live in their own `el7-build` tag.
    ///
    /// 0 is el7-build, 1 is candidate, 2 is testing, 3 is release. Promotion
    /// to testing drops the candidate tag; release keeps testing.
    pub fn separated_buildreqs() -> Self {
        Self::new([
            ("el7-build", vec![0]),
            (CANDIDATE, vec![1]),
            (TESTING, vec![2]),
            (RELEASE, vec![2, 3]),
        ])
    }

    /// Built-in workflows keyed by their configuration name.
    pub fn builtin() -> BTreeMap<String, Workflow> {
        BTreeMap::from([
            (UNIFIED_BUILDREQS.to_string(), Self::unified_buildreqs()),
            (SEPARATED_BUILDREQS.to_string(), Self::separated_buildreqs()),
        ])
    }

    /// Check a workflow loaded under `name` before any release uses it.
    ///
    /// `none` is reserved, and every other stage must require at least one
    /// tag so that only `none` can leave a build untagged.
    pub fn validate(&self, name: &str) -> Result<()> {
        for (stage, indices) in &self.stages {
            if stage == NONE_TARGET {
                return Err(Error::Config(format!(
                    "tags_map '{name}' defines a '{NONE_TARGET}' stage, which is reserved"
                )));
            }
            if indices.is_empty() {
                return Err(Error::Config(format!(
                    "tags_map '{name}' stage '{stage}' requires no tags"
                )));
            }
        }
        Ok(())
    }

    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.stages.keys().map(String::as_str)
    }

    pub fn required(&self, stage: &str) -> Option<&BTreeSet<usize>> {
        self.stages.get(stage)
    }

    /// Pipeline position of a stage: the highest tag index it requires.
    pub fn stage_position(&self, stage: &str) -> Option<usize> {
        self.stages
            .get(stage)
            .and_then(|indices| indices.iter().next_back().copied())
    }

    /// Every target name accepted by [`Workflow::resolve`], `none` first.
    pub fn valid_targets(&self) -> Vec<String> {
        std::iter::once(NONE_TARGET.to_string())
            .chain(self.stages.keys().cloned())
            .collect()
    }

    /// Resolve a target name into the set of tag indices it requires.
    pub fn resolve(&self, target: &str) -> Result<PromotionTarget> {
        if target == NONE_TARGET {
            return Ok(PromotionTarget::None);
        }
        match self.stages.get(target) {
            Some(required) => Ok(PromotionTarget::Stage {
                name: target.to_string(),
                required: required.clone(),
            }),
            None => Err(Error::InvalidTarget {
                target: target.to_string(),
                valid: self.valid_targets(),
            }),
        }
    }
}

/// Where a promotion should leave a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromotionTarget {
    /// No stage tag at all.
    None,
    Stage {
        name: String,
        required: BTreeSet<usize>,
    },
}

impl PromotionTarget {
    pub fn name(&self) -> &str {
        match self {
            PromotionTarget::None => NONE_TARGET,
            PromotionTarget::Stage { name, .. } => name,
        }
    }

    pub fn required_indices(&self) -> BTreeSet<usize> {
        match self {
            PromotionTarget::None => BTreeSet::new(),
            PromotionTarget::Stage { required, .. } => required.clone(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, PromotionTarget::None)
    }
}

impl fmt::Display for PromotionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_none() {
        let target = Workflow::unified_buildreqs().resolve("none").unwrap();
        assert!(target.is_none());
        assert!(target.required_indices().is_empty());
    }

    #[test]
    fn test_resolve_stage() {
        let target = Workflow::unified_buildreqs().resolve("testing").unwrap();
        assert_eq!(target.name(), "testing");
        assert_eq!(target.required_indices(), BTreeSet::from([0, 1]));
    }

    #[test]
    fn test_resolve_unknown_target() {
        let err = Workflow::unified_buildreqs()
            .resolve("el7-build")
            .unwrap_err();
        match err {
            Error::InvalidTarget { target, valid } => {
                assert_eq!(target, "el7-build");
                assert_eq!(valid, vec!["none", "candidate", "release", "testing"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_separated_buildreqs_accepts_el7_build() {
        let target = Workflow::separated_buildreqs()
            .resolve("el7-build")
            .unwrap();
        assert_eq!(target.required_indices(), BTreeSet::from([0]));
    }

    #[test]
    fn test_stage_position() {
        let unified = Workflow::unified_buildreqs();
        assert_eq!(unified.stage_position(CANDIDATE), Some(0));
        assert_eq!(unified.stage_position(TESTING), Some(1));
        assert_eq!(unified.stage_position(RELEASE), Some(2));

        let separated = Workflow::separated_buildreqs();
        assert_eq!(separated.stage_position(CANDIDATE), Some(1));
        assert_eq!(separated.stage_position(TESTING), Some(2));
        assert_eq!(separated.stage_position(RELEASE), Some(3));
        assert_eq!(separated.stage_position("missing"), None);
    }

    #[test]
    fn test_builtin_workflows_are_valid() {
        for (name, workflow) in Workflow::builtin() {
            workflow.validate(&name).unwrap();
        }
    }

    #[test]
    fn test_stage_without_tags_is_invalid() {
        let workflow = Workflow::new([(CANDIDATE, vec![]), (TESTING, vec![0, 1])]);
        match workflow.validate("odd").unwrap_err() {
            Error::Config(message) => assert!(message.contains("stage 'candidate'")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_workflow_deserializes_from_yaml() {
        let workflow: Workflow =
            serde_yaml::from_str("candidate: [0]\ntesting: [0, 1]\nrelease: [0, 1, 2]\n").unwrap();
        assert_eq!(workflow, Workflow::unified_buildreqs());
    }
}
