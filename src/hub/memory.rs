//! In-process hub.
//!
//! Behaves like the real hub for everything this crate relies on: tagging a
//! build twice is rejected, strict untags of missing tags are rejected,
//! non-strict untags are no-ops, and package lists refuse to drop a package
//! with tagged builds unless forced. Every call received is recorded so tests
//! can assert on exactly what was sent.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use super::batch::{execute_phased, BatchReport, CallOutcome, Mutation, MutationBatch};
use super::{BuildService, HubError};
use crate::models::{Build, StageTag};

#[derive(Debug, Default)]
pub struct InMemoryHub {
    state: RefCell<HubState>,
}

#[derive(Debug, Default)]
struct HubState {
    /// nvr -> build
    builds: BTreeMap<String, Build>,
    /// tag -> nvrs, in tagging order
    tagged: BTreeMap<StageTag, Vec<String>>,
    /// tag -> package -> owner
    packages: BTreeMap<StageTag, BTreeMap<String, String>>,
    calls: Vec<Mutation>,
    submissions: usize,
    lookups: usize,
    broken_listings: BTreeSet<StageTag>,
    broken_lookups: BTreeSet<String>,
    /// (method, tag, subject) triples that fail when called
    broken_calls: BTreeSet<(String, String, String)>,
}

impl InMemoryHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a build with the hub and tag it, without recording calls.
    pub fn with_build(self, name: &str, id: u64, nvr: &str, tags: &[&str]) -> Self {
        self.add_build(Build::new(name, id, nvr), tags);
        self
    }

    pub fn add_build(&self, build: Build, tags: &[&str]) {
        let mut state = self.state.borrow_mut();
        for tag in tags {
            state
                .tagged
                .entry(StageTag::from(*tag))
                .or_default()
                .push(build.nvr.clone());
        }
        state.builds.insert(build.nvr.clone(), build);
    }

    /// Current tags of a build, empty for unknown builds.
    pub fn tags_of(&self, nvr: &str) -> BTreeSet<StageTag> {
        self.state.borrow().tags_of(nvr)
    }

    /// Package list of a tag: package -> owner.
    pub fn packages(&self, tag: &str) -> BTreeMap<String, String> {
        self.state
            .borrow()
            .packages
            .get(tag)
            .cloned()
            .unwrap_or_default()
    }

    /// Every mutating call received, in order, including failed ones.
    pub fn calls(&self) -> Vec<Mutation> {
        self.state.borrow().calls.clone()
    }

    /// Number of batches submitted.
    pub fn submissions(&self) -> usize {
        self.state.borrow().submissions
    }

    /// Number of build lookups served.
    pub fn lookups(&self) -> usize {
        self.state.borrow().lookups
    }

    pub fn reset_calls(&self) {
        let mut state = self.state.borrow_mut();
        state.calls.clear();
        state.submissions = 0;
        state.lookups = 0;
    }

    /// Make listings of `tag` fail.
    pub fn fail_listing(&self, tag: &str) {
        self.state
            .borrow_mut()
            .broken_listings
            .insert(StageTag::from(tag));
    }

    /// Make lookups of `nvr` fail.
    pub fn fail_lookup(&self, nvr: &str) {
        self.state
            .borrow_mut()
            .broken_lookups
            .insert(nvr.to_string());
    }

    /// Make a mutating call fail, e.g. `fail_call("untagBuild", "foo-candidate", "nova-1-1")`.
    pub fn fail_call(&self, method: &str, tag: &str, subject: &str) {
        self.state.borrow_mut().broken_calls.insert((
            method.to_string(),
            tag.to_string(),
            subject.to_string(),
        ));
    }
}

impl HubState {
    fn tags_of(&self, nvr: &str) -> BTreeSet<StageTag> {
        self.tagged
            .iter()
            .filter(|(_, nvrs)| nvrs.iter().any(|n| n == nvr))
            .map(|(tag, _)| tag.clone())
            .collect()
    }

    fn is_tagged(&self, tag: &StageTag, nvr: &str) -> bool {
        self.tagged
            .get(tag)
            .is_some_and(|nvrs| nvrs.iter().any(|n| n == nvr))
    }

    fn has_tagged_builds(&self, tag: &StageTag, package: &str) -> bool {
        self.tagged.get(tag).is_some_and(|nvrs| {
            nvrs.iter()
                .filter_map(|nvr| self.builds.get(nvr))
                .any(|build| build.name == package)
        })
    }

    fn apply(&mut self, mutation: &Mutation) -> CallOutcome {
        self.calls.push(mutation.clone());

        let key = (
            mutation.method().to_string(),
            mutation.tag().to_string(),
            mutation.subject().to_string(),
        );
        if self.broken_calls.contains(&key) {
            return CallOutcome::Failed(format!("injected failure for {mutation}"));
        }

        match mutation {
            Mutation::TagBuild { tag, build } => {
                if !self.builds.contains_key(build) {
                    return CallOutcome::Failed(format!("no such build: {build}"));
                }
                if self.is_tagged(tag, build) {
                    return CallOutcome::Failed(format!("build {build} already tagged ({tag})"));
                }
                self.tagged.entry(tag.clone()).or_default().push(build.clone());
                CallOutcome::Applied
            }
            Mutation::UntagBuild { tag, build, strict } => {
                if !self.is_tagged(tag, build) {
                    return if *strict {
                        CallOutcome::Failed(format!("build {build} not in tag {tag}"))
                    } else {
                        CallOutcome::Applied
                    };
                }
                if let Some(nvrs) = self.tagged.get_mut(tag) {
                    nvrs.retain(|n| n != build);
                }
                CallOutcome::Applied
            }
            Mutation::AddPackage {
                tag,
                package,
                owner,
            } => {
                self.packages
                    .entry(tag.clone())
                    .or_default()
                    .insert(package.clone(), owner.clone());
                CallOutcome::Applied
            }
            Mutation::RemovePackage {
                tag,
                package,
                force,
            } => {
                let listed = self
                    .packages
                    .get(tag)
                    .is_some_and(|pkgs| pkgs.contains_key(package));
                if !listed {
                    return CallOutcome::Failed(format!(
                        "package {package} not in list for tag {tag}"
                    ));
                }
                if !force && self.has_tagged_builds(tag, package) {
                    return CallOutcome::Failed(format!(
                        "package {package} has builds tagged in {tag}"
                    ));
                }
                if let Some(pkgs) = self.packages.get_mut(tag) {
                    pkgs.remove(package);
                }
                CallOutcome::Applied
            }
        }
    }
}

impl BuildService for InMemoryHub {
    fn list_tagged(&self, tag: &StageTag) -> Result<Vec<Build>, HubError> {
        let state = self.state.borrow();
        if state.broken_listings.contains(tag) {
            return Err(HubError::fault("listTagged", 1000, format!("listing {tag} failed")));
        }
        Ok(state
            .tagged
            .get(tag)
            .map(|nvrs| {
                nvrs.iter()
                    .filter_map(|nvr| state.builds.get(nvr).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn get_build(&self, nvr: &str) -> Result<Option<Build>, HubError> {
        let mut state = self.state.borrow_mut();
        state.lookups += 1;
        if state.broken_lookups.contains(nvr) {
            return Err(HubError::fault("getBuild", 1000, format!("lookup of {nvr} failed")));
        }
        Ok(state.builds.get(nvr).cloned())
    }

    fn list_build_tags(&self, build: &Build) -> Result<BTreeSet<StageTag>, HubError> {
        Ok(self.state.borrow().tags_of(&build.nvr))
    }

    fn submit(&self, batch: &MutationBatch) -> BatchReport {
        let mut state = self.state.borrow_mut();
        state.submissions += 1;
        execute_phased(batch, |phase| phase.iter().map(|m| state.apply(m)).collect())
    }
}
