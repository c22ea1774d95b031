//! Promotion candidates: builds present in one stage tag but missing from, or
//! older in, a later one.

use tracing::debug;

use crate::errors::{Error, Result};
use crate::hub::BuildService;
use crate::models::{BuildsById, CandidateSet, StageTag};

/// Builds of `tag_from` that are not yet promoted to `tag_to`.
///
/// A package is a candidate when `tag_to` has no build of it, or only an
/// older one. Any listing failure aborts the whole diff.
pub fn compute_candidates<S>(
    service: &S,
    tag_from: &StageTag,
    tag_to: &StageTag,
) -> Result<CandidateSet>
where
    S: BuildService + ?Sized,
{
    let latest_from = list_latest(service, tag_from)?;
    let latest_to = list_latest(service, tag_to)?;
    let candidates = diff_latest(&latest_from, &latest_to);
    debug!(
        from = %tag_from,
        to = %tag_to,
        candidates = candidates.len(),
        "computed candidates"
    );
    Ok(candidates)
}

/// Builds of `tag_from` that were skipped over: never tagged in `tag_to`,
/// while a newer build of the same package already is.
pub fn compute_old_candidates<S>(
    service: &S,
    tag_from: &StageTag,
    tag_to: &StageTag,
) -> Result<BuildsById>
where
    S: BuildService + ?Sized,
{
    let all_from = list_all(service, tag_from)?;
    let all_to = list_all(service, tag_to)?;
    let latest_to = list_latest(service, tag_to)?;
    let stale = diff_stale(&all_from, &all_to, &latest_to);
    debug!(
        from = %tag_from,
        to = %tag_to,
        stale = stale.len(),
        "computed old candidates"
    );
    Ok(stale)
}

/// Packages of `latest_from` absent from `latest_to` or newer than its build.
pub fn diff_latest(latest_from: &CandidateSet, latest_to: &CandidateSet) -> CandidateSet {
    latest_from
        .iter()
        .filter(|(package, build)| match latest_to.get(*package) {
            Some(promoted) => build.is_newer_than(promoted),
            None => true,
        })
        .map(|(package, build)| (package.clone(), build.clone()))
        .collect()
}

/// Builds of `all_from` missing from `all_to` and older than the latest build
/// of their package in `latest_to`.
///
/// Packages with no build at all in `latest_to` are skipped: nothing says
/// whether their builds were superseded.
pub fn diff_stale(
    all_from: &BuildsById,
    all_to: &BuildsById,
    latest_to: &CandidateSet,
) -> BuildsById {
    all_from
        .iter()
        .filter(|(id, build)| {
            !all_to.contains_key(*id)
                && latest_to
                    .get(&build.name)
                    .is_some_and(|latest| latest.is_newer_than(build))
        })
        .map(|(id, build)| (*id, build.clone()))
        .collect()
}

fn list_latest<S: BuildService + ?Sized>(service: &S, tag: &StageTag) -> Result<CandidateSet> {
    service
        .list_latest_builds(tag)
        .map_err(|source| Error::RemoteList {
            tag: tag.clone(),
            source,
        })
}

fn list_all<S: BuildService + ?Sized>(service: &S, tag: &StageTag) -> Result<BuildsById> {
    service
        .list_all_builds(tag)
        .map_err(|source| Error::RemoteList {
            tag: tag.clone(),
            source,
        })
}
