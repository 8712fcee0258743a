//! Configuration loading from depaudit.toml.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

/// Main configuration structure for depaudit.toml.
#[derive(Debug, Deserialize, Default)]
pub struct DepauditConfig {
    /// Report problems without failing the run.
    pub warn_only: Option<bool>,
    /// Coordinate substrings restricting which artifacts are reported.
    pub include_filters: Option<Vec<String>>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// Output format configuration.
#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    /// Output format: "plain" or "json".
    pub format: Option<String>,
}

/// Loads configuration from depaudit.toml if it exists.
pub fn load_config(root: &Path) -> Result<Option<DepauditConfig>> {
    let path = root.join("depaudit.toml");
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)?;
    let cfg = toml::from_str(&content).context("Invalid depaudit.toml")?;
    Ok(Some(cfg))
}
