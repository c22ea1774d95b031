use super::delta::PromotionDelta;
use crate::errors::PromoteError;

/// Outcome of promoting one build.
#[derive(Debug)]
pub struct BuildOutcome {
    pub build: String,
    pub result: Result<PromotionDelta, PromoteError>,
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-build outcomes of one [`super::tag_builds`] call, in request order.
#[derive(Debug)]
pub struct PromotionReport {
    pub release: String,
    pub target: String,
    pub outcomes: Vec<BuildOutcome>,
}

impl PromotionReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(BuildOutcome::is_success)
    }

    pub fn promoted(&self) -> impl Iterator<Item = &PromotionDelta> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &PromoteError> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().err())
    }

    /// Builds whose tags actually changed.
    pub fn changed(&self) -> usize {
        self.promoted().filter(|d| !d.is_empty()).count()
    }
}
