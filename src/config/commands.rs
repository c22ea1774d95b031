//! Command files for `tag` and `register`.
//!
//! Promotions map each release to targets and the builds to move there:
//!
//! ```yaml
//! newton:
//!   testing: [openstack-nova-14.0.0-1.el7, openstack-glance-13.0.0-1.el7]
//!   none: [openstack-nova-13.9.0-1.el7]
//! ```
//!
//! Registrations list packages to add to or remove from every stage tag of a
//! release:
//!
//! ```yaml
//! newton:
//!   add: [openstack-nova]
//!   remove: [python-oldclient]
//! ```

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::expand_tilde;
use crate::errors::{Error, Result};

/// release -> target -> nvrs
pub type PromotionCommands = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// release -> packages to add and remove
pub type RegistrationCommands = BTreeMap<String, RegistrationEntry>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RegistrationEntry {
    #[serde(default)]
    pub add: Vec<String>,
    #[serde(default)]
    pub remove: Vec<String>,
}

pub fn load_promotions(path: &Path) -> Result<PromotionCommands> {
    load_yaml(path)
}

pub fn load_registrations(path: &Path) -> Result<RegistrationCommands> {
    load_yaml(path)
}

/// An empty file is an empty command set.
fn load_yaml<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let path = expand_tilde(path);
    let content = fs::read_to_string(&path).map_err(|source| Error::Io {
        path: path.clone(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yaml::from_str(&content).map_err(|source| Error::Yaml { path, source })
}
