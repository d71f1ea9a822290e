//! Configuration loading and merging
//!
//! Handles loading from config files, environment variables, and CLI arguments
//! with proper precedence (CLI > Env > File > Defaults).

use crate::domain::Config;
use anyhow::Result;
use std::path::Path;

pub mod loader;
pub mod merge;

pub use loader::load_config;
pub use merge::{apply_env_overrides, merge_cli_with_config, validate, CliOverrides};

/// Resolve the effective config for a command run from `dir`.
pub fn resolve_config(dir: &Path, config_path: Option<&Path>, cli: CliOverrides) -> Result<Config> {
    let file_config = load_config(dir, config_path)?;
    let with_env = apply_env_overrides(file_config)?;
    let merged = merge_cli_with_config(with_env, cli);
    validate(&merged)?;
    Ok(merged)
}
