//! Helpers shared by the commands that talk to the hub.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::hub::HubClient;

pub fn load_config(path: &Path) -> Result<Config> {
    Config::load(path).with_context(|| format!("Failed to load config file: {}", path.display()))
}

pub fn connect(config: &Config) -> Result<HubClient> {
    HubClient::new(&config.hub)
        .with_context(|| format!("Failed to set up hub client for {}", config.hub.url))
}
