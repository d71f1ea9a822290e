//! Config file loading

use crate::domain::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const SECTION: &str = "studioflow";

/// Load `config_path`, or the first config file discovered in `dir`.
///
/// An explicitly named file that cannot be read or parsed is an error. A
/// discovered file that fails to parse is reported with a warning and
/// defaults are used instead.
pub fn load_config(dir: &Path, config_path: Option<&Path>) -> Result<Config> {
    let explicit = config_path.is_some();

    let Some(config_file) = config_path.map(Path::to_path_buf).or_else(|| discover_config(dir)) else {
        return Ok(Config::default());
    };
    tracing::debug!("Loading config from {}", config_file.display());

    let content = fs::read_to_string(&config_file)
        .with_context(|| format!("Failed reading config file: {}", config_file.display()))?;

    let ext = config_file.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    let parsed = match ext.as_str() {
        "toml" => parse_toml_config(&content, &config_file),
        "yaml" | "yml" => parse_yaml_config(&content, &config_file),
        other => Err(anyhow::anyhow!(
            "Unsupported config extension '.{}' for file {}",
            other,
            config_file.display()
        )),
    };

    match parsed {
        Ok(cfg) => Ok(cfg),
        Err(e) if explicit => Err(e),
        Err(e) => {
            tracing::warn!("Ignoring config {}: {:#}", config_file.display(), e);
            Ok(Config::default())
        }
    }
}

/// TOML config, optionally nested under `[studioflow]`.
fn parse_toml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: toml::Value = toml::from_str(content)
        .with_context(|| format!("Invalid TOML syntax: {}", config_file.display()))?;
    let config_val = raw.get(SECTION).cloned().unwrap_or(raw);
    config_val.try_into().with_context(|| format!("Invalid TOML config: {}", config_file.display()))
}

/// YAML config, optionally nested under `studioflow:`.
fn parse_yaml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)
        .with_context(|| format!("Invalid YAML syntax: {}", config_file.display()))?;
    let config_val = raw.get(SECTION).cloned().unwrap_or(raw);
    serde_yaml::from_value(config_val)
        .with_context(|| format!("Invalid YAML config: {}", config_file.display()))
}

fn discover_config(dir: &Path) -> Option<PathBuf> {
    let candidates = ["studioflow.toml", ".studioflow.toml", "studioflow.yml", "studioflow.yaml"];
    candidates.iter().map(|c| dir.join(c)).find(|p| p.is_file())
}
