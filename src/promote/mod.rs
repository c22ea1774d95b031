//! Tag promotion.
//!
//! A build's position in a release is the set of the release's stage tags it
//! carries. Promoting it to a target computes the difference between that set
//! and the indices the workflow requires for the target, then submits the
//! difference as one batch: tags first, untags after.
//!
//! States per build and release:
//! - `none`: no stage tag (reached by rollback, may pass through zero tags)
//! - any workflow stage: exactly the tags that stage requires

mod delta;
mod registry;
mod report;

#[cfg(test)]
mod tests;

pub use delta::PromotionDelta;
pub use registry::{register_packages, unregister_packages};
pub use report::{BuildOutcome, PromotionReport};

use tracing::{debug, info, warn};

use crate::errors::{PromoteError, Result};
use crate::hub::{BuildService, HubError};
use crate::models::{PromotionTarget, Release, Workflow};

/// Move one build to `target`.
///
/// The build and its tags are fetched right before mutating. Nothing is
/// submitted when the build already sits at the target.
pub fn promote<S>(
    service: &S,
    nvr: &str,
    target: &PromotionTarget,
    release: &Release,
) -> Result<PromotionDelta, PromoteError>
where
    S: BuildService + ?Sized,
{
    let lookup_failed = |source: HubError| PromoteError::RemoteLookup {
        build: nvr.to_string(),
        source,
    };

    let build = service
        .get_build(nvr)
        .map_err(lookup_failed)?
        .ok_or_else(|| PromoteError::BuildNotFound {
            build: nvr.to_string(),
        })?;
    let held = service.list_build_tags(&build).map_err(lookup_failed)?;

    let delta = PromotionDelta::plan(build, target, release, &held);
    if delta.is_empty() {
        debug!(build = nvr, target = %target, "already at target");
        return Ok(delta);
    }

    let report = service.submit(&delta.to_batch());
    if !report.is_success() {
        return Err(PromoteError::RemoteMutation {
            build: nvr.to_string(),
            failures: report.failures(),
        });
    }

    info!(
        build = nvr,
        release = %release.name,
        target = %target,
        tagged = delta.to_tag.len(),
        untagged = delta.to_untag.len(),
        "promoted"
    );
    Ok(delta)
}

/// Promote every build of `builds` to `target` within `release`.
///
/// An unknown target or a target the release's tag list cannot satisfy fails
/// the whole call before anything is sent to the hub. Per-build failures are
/// collected in the report and do not stop the remaining builds.
pub fn tag_builds<S>(
    service: &S,
    target: &str,
    release: &Release,
    builds: &[String],
    workflow: &Workflow,
) -> Result<PromotionReport>
where
    S: BuildService + ?Sized,
{
    let target = workflow.resolve(target)?;
    release.check_target(&target)?;

    let outcomes = builds
        .iter()
        .map(|nvr| {
            let result = promote(service, nvr, &target, release);
            if let Err(e) = &result {
                warn!(build = %nvr, error = %e, "promotion failed");
            }
            BuildOutcome {
                build: nvr.clone(),
                result,
            }
        })
        .collect();

    Ok(PromotionReport {
        release: release.name.clone(),
        target: target.name().to_string(),
        outcomes,
    })
}
