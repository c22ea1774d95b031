use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

/// How listings are printed on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented JSON
    #[default]
    Pretty,
    /// Compact single-line JSON
    Json,
    Yaml,
}

pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Pretty => {
            serde_json::to_string_pretty(value).context("Failed to render JSON")?
        }
        OutputFormat::Json => serde_json::to_string(value).context("Failed to render JSON")?,
        OutputFormat::Yaml => serde_yaml::to_string(value).context("Failed to render YAML")?,
    };
    Ok(rendered)
}
