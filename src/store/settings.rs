//! User preferences persisted as `settings.json`.

use super::{read_json, write_json};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const FILE_NAME: &str = "settings.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => bail!("Unknown theme {other:?} (expected light, dark or system)"),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub theme: Theme,
    pub auto_save: bool,
    /// Pixels, 10..=24.
    pub code_viewer_font_size: u32,
    pub show_line_numbers: bool,
    pub enable_smooth_transitions: bool,
    /// rem, 12..=24.
    pub sidebar_width: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            auto_save: true,
            code_viewer_font_size: 14,
            show_line_numbers: true,
            enable_smooth_transitions: true,
            sidebar_width: 16,
        }
    }
}

impl AppSettings {
    pub const KEYS: [&'static str; 6] = [
        "theme",
        "autoSave",
        "codeViewerFontSize",
        "showLineNumbers",
        "enableSmoothTransitions",
        "sidebarWidth",
    ];

    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(FILE_NAME)
    }

    /// Stored settings, or defaults when none were saved yet.
    pub fn load(data_dir: &Path) -> Result<Self> {
        Ok(read_json(&Self::path(data_dir))?.unwrap_or_default())
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        write_json(&Self::path(data_dir), self)
    }

    /// Update one setting by its key (camelCase or snake_case).
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let normalized = key.replace(['_', '-'], "").to_ascii_lowercase();
        match normalized.as_str() {
            "theme" => self.theme = value.parse()?,
            "autosave" => self.auto_save = parse_bool(value)?,
            "codeviewerfontsize" => {
                self.code_viewer_font_size = parse_in_range(value, 10, 24, key)?;
            }
            "showlinenumbers" => self.show_line_numbers = parse_bool(value)?,
            "enablesmoothtransitions" => self.enable_smooth_transitions = parse_bool(value)?,
            "sidebarwidth" => self.sidebar_width = parse_in_range(value, 12, 24, key)?,
            _ => bail!("Unknown setting {key:?}. Known settings: {}", Self::KEYS.join(", ")),
        }
        Ok(())
    }

    /// `(key, value)` pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("theme", self.theme.to_string()),
            ("autoSave", self.auto_save.to_string()),
            ("codeViewerFontSize", self.code_viewer_font_size.to_string()),
            ("showLineNumbers", self.show_line_numbers.to_string()),
            ("enableSmoothTransitions", self.enable_smooth_transitions.to_string()),
            ("sidebarWidth", self.sidebar_width.to_string()),
        ]
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => bail!("Expected true or false, got {other:?}"),
    }
}

fn parse_in_range(value: &str, min: u32, max: u32, key: &str) -> Result<u32> {
    let n: u32 = value.trim().parse().with_context(|| format!("{key} must be a number"))?;
    if !(min..=max).contains(&n) {
        bail!("{key} must be between {min} and {max}");
    }
    Ok(n)
}
