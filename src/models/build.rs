use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Numeric build identifier assigned by the hub. Higher is newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildId(pub u64);

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BuildId {
    fn from(id: u64) -> Self {
        BuildId(id)
    }
}

/// A build as listed by the hub.
///
/// `name` is the package name; it is unique within the latest-build listing
/// of a single tag, but a full listing may hold several builds per package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub name: String,
    pub id: BuildId,
    pub nvr: String,
}

impl Build {
    pub fn new(name: impl Into<String>, id: impl Into<BuildId>, nvr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            nvr: nvr.into(),
        }
    }

    /// True when `self` was built after `other`.
    pub fn is_newer_than(&self, other: &Build) -> bool {
        self.id > other.id
    }
}

impl fmt::Display for Build {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.nvr, self.id)
    }
}

/// Package name to build. Used both for latest-per-package listings and for
/// promotion candidates.
pub type CandidateSet = BTreeMap<String, Build>;

/// Every build of a listing, keyed by build id.
pub type BuildsById = BTreeMap<BuildId, Build>;

/// Reduce a full tag listing to the newest build of each package.
///
/// The hub orders tagged builds by tagging event, not by build id, so the
/// position of a build in `builds` says nothing about its age.
pub fn latest_per_package(builds: impl IntoIterator<Item = Build>) -> CandidateSet {
    let mut latest = CandidateSet::new();
    for build in builds {
        match latest.get(&build.name) {
            Some(current) if !build.is_newer_than(current) => {}
            _ => {
                latest.insert(build.name.clone(), build);
            }
        }
    }
    latest
}

/// Index a full tag listing by build id.
pub fn by_id(builds: impl IntoIterator<Item = Build>) -> BuildsById {
    builds.into_iter().map(|b| (b.id, b)).collect()
}
