//! Runtime configuration

use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1024;
pub const MAX_OUTPUT_TOKENS_LIMIT: u32 = 8192;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub github_api_base: String,
    pub github_token: Option<String>,
    pub gemini_api_base: String,
    pub gemini_api_key: Option<String>,
    pub model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    /// Number of most recent chat messages rendered into a prompt.
    pub history_window: usize,
    #[serde(deserialize_with = "string_or_list")]
    pub exclude_globs: Vec<String>,
    /// Substitute the bundled demo repository when the GitHub listing fails.
    pub fallback_to_demo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_api_base: DEFAULT_GITHUB_API_BASE.to_string(),
            github_token: None,
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            gemini_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: 0.7,
            request_timeout_secs: 30,
            history_window: 20,
            exclude_globs: Vec::new(),
            fallback_to_demo: false,
        }
    }
}

/// Accept either `"a, b"` or `["a", "b"]`.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        One(String),
        Many(Vec<String>),
    }

    let items = match Raw::deserialize(deserializer)? {
        Raw::One(s) => s.split(',').map(str::to_string).collect::<Vec<_>>(),
        Raw::Many(v) => v,
    };
    Ok(items.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.model, "gemini-1.5-flash");
        assert_eq!(cfg.max_output_tokens, 1024);
        assert_eq!(cfg.history_window, 20);
        assert!(!cfg.fallback_to_demo);
    }

    #[test]
    fn exclude_globs_accepts_comma_string() {
        let cfg: Config = toml::from_str("exclude_globs = \"dist/**, node_modules/** ,\"").unwrap();
        assert_eq!(cfg.exclude_globs, vec!["dist/**", "node_modules/**"]);
    }

    #[test]
    fn exclude_globs_rejects_wrong_type() {
        let parsed: Result<Config, _> = toml::from_str("exclude_globs = false");
        assert!(parsed.is_err());
    }
}
