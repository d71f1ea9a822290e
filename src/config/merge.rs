//! Layering of environment variables and CLI flags over file config.

use crate::domain::{Config, MAX_OUTPUT_TOKENS_LIMIT};
use anyhow::{bail, Context, Result};

pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";
pub const ENV_GEMINI_MAX_OUTPUT_TOKENS: &str = "GEMINI_MAX_OUTPUT_TOKENS";
pub const ENV_GITHUB_API_BASE: &str = "STUDIOFLOW_GITHUB_API_BASE";
pub const ENV_GEMINI_API_BASE: &str = "STUDIOFLOW_GEMINI_API_BASE";

const MIN_API_KEY_LEN: usize = 10;

/// Values given on the command line; `None` leaves the config untouched.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub model: Option<String>,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub exclude_globs: Option<Vec<String>>,
    pub fallback_to_demo: Option<bool>,
}

pub fn merge_cli_with_config(mut config: Config, cli: CliOverrides) -> Config {
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(max) = cli.max_output_tokens {
        config.max_output_tokens = max;
    }
    if let Some(temperature) = cli.temperature {
        config.temperature = temperature;
    }
    if let Some(globs) = cli.exclude_globs {
        config.exclude_globs.extend(globs);
    }
    if let Some(fallback) = cli.fallback_to_demo {
        config.fallback_to_demo = fallback;
    }
    config
}

/// Overlay the process environment.
pub fn apply_env_overrides(config: Config) -> Result<Config> {
    apply_env_with(config, |name| std::env::var(name).ok())
}

/// Overlay variables from `lookup`. Empty values are ignored.
pub fn apply_env_with<F>(mut config: Config, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(token) = get(ENV_GITHUB_TOKEN) {
        config.github_token = Some(token);
    }
    if let Some(key) = get(ENV_GEMINI_API_KEY) {
        config.gemini_api_key = Some(key);
    }
    if let Some(model) = get(ENV_GEMINI_MODEL) {
        config.model = model;
    }
    if let Some(raw) = get(ENV_GEMINI_MAX_OUTPUT_TOKENS) {
        config.max_output_tokens = raw
            .parse()
            .with_context(|| format!("{ENV_GEMINI_MAX_OUTPUT_TOKENS} must be a positive integer"))?;
    }
    if let Some(base) = get(ENV_GITHUB_API_BASE) {
        config.github_api_base = base;
    }
    if let Some(base) = get(ENV_GEMINI_API_BASE) {
        config.gemini_api_base = base;
    }
    Ok(config)
}

/// Reject values the API clients cannot use.
pub fn validate(config: &Config) -> Result<()> {
    if config.max_output_tokens == 0 || config.max_output_tokens > MAX_OUTPUT_TOKENS_LIMIT {
        bail!(
            "max_output_tokens must be between 1 and {MAX_OUTPUT_TOKENS_LIMIT}, got {}",
            config.max_output_tokens
        );
    }
    if !(0.0..=2.0).contains(&config.temperature) {
        bail!("temperature must be between 0 and 2, got {}", config.temperature);
    }
    if config.model.trim().is_empty() {
        bail!("model cannot be empty");
    }
    if config.history_window == 0 {
        bail!("history_window must be at least 1");
    }
    if let Some(key) = &config.gemini_api_key {
        if key.len() < MIN_API_KEY_LEN {
            bail!("{ENV_GEMINI_API_KEY} looks invalid (expected at least {MIN_API_KEY_LEN} characters)");
        }
    }
    Ok(())
}
