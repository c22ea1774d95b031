//! Configuration and command files.
//!
//! The config file names the hub, optional extra workflows and the releases:
//!
//! ```yaml
//! koji:
//!   url: https://cbs.centos.org/kojihub
//!   username: hguemar
//! tags_maps:
//!   unified_buildreqs: {candidate: [0], testing: [0, 1], release: [0, 1, 2]}
//! releases:
//!   newton:
//!     tags: [cloud7-openstack-newton-candidate, cloud7-openstack-newton-testing]
//!     tags_map: unified_buildreqs
//! ```

mod commands;

pub use commands::{
    load_promotions, load_registrations, PromotionCommands, RegistrationCommands,
    RegistrationEntry,
};

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{Error, Result};
use crate::models::workflow::UNIFIED_BUILDREQS;
use crate::models::{Release, Workflow, MAX_STAGE_TAGS, MIN_STAGE_TAGS};

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_HUB_TIMEOUT_SECS: u64 = 120;

/// Hub connection settings, the `koji` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HubSettings {
    pub url: String,
    /// Owner recorded when packages are added to a tag.
    pub username: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_HUB_TIMEOUT_SECS
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(alias = "hub")]
    koji: HubSettings,
    #[serde(default)]
    tags_maps: BTreeMap<String, Workflow>,
    #[serde(default)]
    releases: BTreeMap<String, ReleaseEntry>,
}

#[derive(Debug, Deserialize)]
struct ReleaseEntry {
    tags: Vec<String>,
    #[serde(default)]
    tags_map: Option<String>,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub hub: HubSettings,
    /// Built-in workflows, overridden or extended by `tags_maps`.
    pub workflows: BTreeMap<String, Workflow>,
    pub releases: BTreeMap<String, Release>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let path = expand_tilde(path);
        let content = fs::read_to_string(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_yaml(&content, &path)?;
        debug!(
            path = %path.display(),
            releases = config.releases.len(),
            workflows = config.workflows.len(),
            "loaded config"
        );
        Ok(config)
    }

    /// Parse and validate config content. `path` only labels errors.
    pub fn from_yaml(content: &str, path: &Path) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(content).map_err(|source| Error::Yaml {
            path: path.to_path_buf(),
            source,
        })?;

        let mut workflows = Workflow::builtin();
        workflows.extend(file.tags_maps);
        for (name, workflow) in &workflows {
            workflow.validate(name)?;
        }

        let releases = file
            .releases
            .into_iter()
            .map(|(name, entry)| -> Result<(String, Release)> {
                let release = build_release(name.clone(), entry, &workflows)?;
                Ok((name, release))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(Self {
            hub: file.koji,
            workflows,
            releases,
        })
    }

    pub fn release(&self, name: &str) -> Result<&Release> {
        self.releases
            .get(name)
            .ok_or_else(|| Error::UnknownRelease(name.to_string()))
    }

    pub fn workflow_for(&self, release: &Release) -> Result<&Workflow> {
        self.workflows.get(&release.workflow).ok_or_else(|| {
            Error::Config(format!(
                "release '{}' uses unknown tags_map '{}'",
                release.name, release.workflow
            ))
        })
    }
}

fn build_release(
    name: String,
    entry: ReleaseEntry,
    workflows: &BTreeMap<String, Workflow>,
) -> Result<Release> {
    let count = entry.tags.len();
    if !(MIN_STAGE_TAGS..=MAX_STAGE_TAGS).contains(&count) {
        return Err(Error::Config(format!(
            "release '{name}' has {count} tags, expected {MIN_STAGE_TAGS} to {MAX_STAGE_TAGS}"
        )));
    }

    let mut seen = BTreeSet::new();
    if let Some(dup) = entry.tags.iter().find(|tag| !seen.insert(tag.as_str())) {
        return Err(Error::Config(format!("release '{name}' lists tag '{dup}' twice")));
    }

    let workflow = entry.tags_map.unwrap_or_else(|| UNIFIED_BUILDREQS.to_string());
    if !workflows.contains_key(&workflow) {
        return Err(Error::Config(format!(
            "release '{name}' uses unknown tags_map '{workflow}'"
        )));
    }

    Ok(Release::new(name, entry.tags, workflow))
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
