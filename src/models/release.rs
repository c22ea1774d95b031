use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

use super::workflow::{PromotionTarget, Workflow};
use crate::errors::{Error, Result};

pub const MIN_STAGE_TAGS: usize = 2;
pub const MAX_STAGE_TAGS: usize = 4;

/// Hub tag marking one pipeline stage of one release,
/// e.g. `cloud7-openstack-newton-candidate`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageTag(String);

impl StageTag {
    pub fn new(name: impl Into<String>) -> Self {
        StageTag(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StageTag {
    fn from(name: &str) -> Self {
        StageTag(name.to_string())
    }
}

impl From<String> for StageTag {
    fn from(name: String) -> Self {
        StageTag(name)
    }
}

impl AsRef<str> for StageTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for StageTag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A release and its stage tags, earliest stage first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub name: String,
    pub tags: Vec<StageTag>,
    /// Name of the workflow (`tags_map`) this release promotes with.
    pub workflow: String,
}

impl Release {
    pub fn new(
        name: impl Into<String>,
        tags: impl IntoIterator<Item = impl Into<StageTag>>,
        workflow: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            tags: tags.into_iter().map(Into::into).collect(),
            workflow: workflow.into(),
        }
    }

    pub fn tag(&self, index: usize) -> Option<&StageTag> {
        self.tags.get(index)
    }

    pub fn indices(&self) -> BTreeSet<usize> {
        (0..self.tags.len()).collect()
    }

    /// Check that every index the target requires names one of our tags.
    pub fn check_target(&self, target: &PromotionTarget) -> Result<()> {
        match target.required_indices().into_iter().find(|&i| i >= self.tags.len()) {
            Some(index) => Err(Error::InvalidWorkflow {
                release: self.name.clone(),
                workflow: self.workflow.clone(),
                stage: target.name().to_string(),
                index,
                tag_count: self.tags.len(),
            }),
            None => Ok(()),
        }
    }

    /// Stage tag of a named workflow stage.
    pub fn stage_tag(&self, workflow: &Workflow, stage: &str) -> Result<&StageTag> {
        let index = workflow
            .stage_position(stage)
            .ok_or_else(|| Error::MissingStage {
                release: self.name.clone(),
                workflow: self.workflow.clone(),
                stage: stage.to_string(),
            })?;
        self.tag(index).ok_or_else(|| Error::InvalidWorkflow {
            release: self.name.clone(),
            workflow: self.workflow.clone(),
            stage: stage.to_string(),
            index,
            tag_count: self.tags.len(),
        })
    }

    /// `(from, to)` tags for diffing one stage against a later one.
    pub fn stage_pair(
        &self,
        workflow: &Workflow,
        from: &str,
        to: &str,
    ) -> Result<(StageTag, StageTag)> {
        Ok((
            self.stage_tag(workflow, from)?.clone(),
            self.stage_tag(workflow, to)?.clone(),
        ))
    }
}
