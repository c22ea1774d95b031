//! `list-candidates` and `list-testing`.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use super::common::{connect, load_config};
use super::output::{render, OutputFormat};
use crate::config::Config;
use crate::diff::{compute_candidates, compute_old_candidates};
use crate::errors;
use crate::hub::BuildService;
use crate::models::workflow::{CANDIDATE, RELEASE, TESTING};
use crate::models::{BuildsById, CandidateSet, StageTag};

/// Which pair of stages to compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    /// Candidate builds not yet in testing.
    Candidates,
    /// Candidate builds skipped over by a newer build in testing.
    OldCandidates,
    /// Testing builds not yet in release.
    Testing,
}

impl Listing {
    fn stages(self) -> (&'static str, &'static str) {
        match self {
            Listing::Candidates | Listing::OldCandidates => (CANDIDATE, TESTING),
            Listing::Testing => (TESTING, RELEASE),
        }
    }
}

/// Builds listed for one release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BuildList {
    /// package -> build
    Latest(CandidateSet),
    /// build id -> build
    Old(BuildsById),
}

impl BuildList {
    pub fn len(&self) -> usize {
        match self {
            BuildList::Latest(builds) => builds.len(),
            BuildList::Old(builds) => builds.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn list_candidates(
    config_file: &Path,
    releases: &[String],
    old: bool,
    format: OutputFormat,
) -> Result<()> {
    let listing = if old {
        Listing::OldCandidates
    } else {
        Listing::Candidates
    };
    execute(config_file, releases, listing, format)
}

pub fn list_testing(config_file: &Path, releases: &[String], format: OutputFormat) -> Result<()> {
    execute(config_file, releases, Listing::Testing, format)
}

fn execute(
    config_file: &Path,
    releases: &[String],
    listing: Listing,
    format: OutputFormat,
) -> Result<()> {
    let config = load_config(config_file)?;
    let hub = connect(&config)?;
    let lists = collect(&hub, &config, releases, listing)?;
    println!("{}", render(&lists, format)?);
    Ok(())
}

/// Compute `listing` for every release of `releases`.
///
/// Every release name and stage pair is resolved before the first hub call.
pub fn collect<S>(
    service: &S,
    config: &Config,
    releases: &[String],
    listing: Listing,
) -> Result<BTreeMap<String, BuildList>>
where
    S: BuildService + ?Sized,
{
    let (from, to) = listing.stages();
    let pairs = releases
        .iter()
        .map(|name| -> errors::Result<(String, (StageTag, StageTag))> {
            let release = config.release(name)?;
            let workflow = config.workflow_for(release)?;
            let pair = release.stage_pair(workflow, from, to)?;
            Ok((name.clone(), pair))
        })
        .collect::<errors::Result<Vec<_>>>()?;

    let mut lists = BTreeMap::new();
    for (name, (tag_from, tag_to)) in pairs {
        let builds = match listing {
            Listing::OldCandidates => {
                compute_old_candidates(service, &tag_from, &tag_to).map(BuildList::Old)
            }
            Listing::Candidates | Listing::Testing => {
                compute_candidates(service, &tag_from, &tag_to).map(BuildList::Latest)
            }
        }
        .with_context(|| {
            format!("Failed to list builds of release '{name}' ({tag_from} -> {tag_to})")
        })?;
        lists.insert(name, builds);
    }
    Ok(lists)
}
