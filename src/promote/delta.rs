use std::collections::BTreeSet;

use crate::hub::{Mutation, MutationBatch};
use crate::models::{Build, PromotionTarget, Release, StageTag};

/// Tag changes that move one build to a promotion target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionDelta {
    pub build: Build,
    /// Tags to add, earliest stage first.
    pub to_tag: Vec<StageTag>,
    /// Tags to remove, earliest stage first.
    pub to_untag: Vec<StageTag>,
}

impl PromotionDelta {
    /// Compute the minimal delta from the tags the build holds right now.
    ///
    /// Only the release's own stage tags are considered; unrelated tags the
    /// build carries are left alone. Tags already held are not re-added and
    /// tags already absent are not removed, so planning against the result
    /// of a previous promotion yields an empty delta.
    pub fn plan(
        build: Build,
        target: &PromotionTarget,
        release: &Release,
        held: &BTreeSet<StageTag>,
    ) -> Self {
        let required = target.required_indices();
        let mut to_tag = Vec::new();
        let mut to_untag = Vec::new();

        for (index, tag) in release.tags.iter().enumerate() {
            let holds = held.contains(tag);
            if required.contains(&index) {
                if !holds {
                    to_tag.push(tag.clone());
                }
            } else if holds {
                to_untag.push(tag.clone());
            }
        }

        Self {
            build,
            to_tag,
            to_untag,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_tag.is_empty() && self.to_untag.is_empty()
    }

    /// Tag calls first, then untag calls behind a barrier, so the build never
    /// drops to zero tags on its way to a non-empty target.
    pub fn to_batch(&self) -> MutationBatch {
        let nvr = &self.build.nvr;
        let mut batch = MutationBatch::new();
        batch.extend(self.to_tag.iter().map(|tag| Mutation::tag_build(tag, nvr)));
        batch.barrier();
        batch.extend(self.to_untag.iter().map(|tag| Mutation::untag_build(tag, nvr)));
        batch
    }
}
