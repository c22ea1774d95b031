//! Package list management across a release's stage tags.
//!
//! A package must be listed in a tag before any of its builds can be tagged
//! there. These calls sit outside the promotion state machine: they touch
//! package lists, never build tags.

use tracing::{info, warn};

use crate::errors::{Error, Result};
use crate::hub::{BuildService, CallFailure, Mutation, MutationBatch};
use crate::models::StageTag;

/// List `packages` in every tag of `tags`, owned by `owner`. One batch per tag.
pub fn register_packages<S>(
    service: &S,
    tags: &[StageTag],
    packages: &[String],
    owner: &str,
) -> Result<()>
where
    S: BuildService + ?Sized,
{
    apply_per_tag(service, tags, |tag| {
        packages.iter().map(move |package| Mutation::AddPackage {
            tag: tag.clone(),
            package: package.clone(),
            owner: owner.to_string(),
        })
    })
}

/// Drop `packages` from every tag of `tags`. One batch per tag.
///
/// With `force` the hub removes packages even when builds of them are still
/// tagged. Those builds stay tagged: nothing here purges them.
pub fn unregister_packages<S>(
    service: &S,
    tags: &[StageTag],
    packages: &[String],
    force: bool,
) -> Result<()>
where
    S: BuildService + ?Sized,
{
    apply_per_tag(service, tags, |tag| {
        packages.iter().map(move |package| Mutation::RemovePackage {
            tag: tag.clone(),
            package: package.clone(),
            force,
        })
    })
}

fn apply_per_tag<'a, S, F, I>(service: &S, tags: &'a [StageTag], calls_for: F) -> Result<()>
where
    S: BuildService + ?Sized,
    F: Fn(&'a StageTag) -> I,
    I: Iterator<Item = Mutation>,
{
    let mut failures: Vec<CallFailure> = Vec::new();

    for tag in tags {
        let mut batch = MutationBatch::new();
        batch.extend(calls_for(tag));
        if batch.is_empty() {
            continue;
        }

        let report = service.submit(&batch);
        let tag_failures = report.failures();
        if tag_failures.is_empty() {
            info!(tag = %tag, calls = batch.len(), "package list updated");
        } else {
            warn!(tag = %tag, failed = tag_failures.len(), "package list update failed");
            failures.extend(tag_failures);
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(Error::Registration { failures })
    }
}
