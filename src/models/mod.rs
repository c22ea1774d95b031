pub mod build;
pub mod release;
pub mod workflow;

pub use build::{latest_per_package, Build, BuildId, BuildsById, CandidateSet};
pub use release::{Release, StageTag, MAX_STAGE_TAGS, MIN_STAGE_TAGS};
pub use workflow::{PromotionTarget, Workflow, NONE_TARGET};
