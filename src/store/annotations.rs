//! Per-repository line annotations.

use super::{read_json, write_json};
use crate::utils::{normalize_path, stable_key};
use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: String,
    pub line: u32,
    #[serde(default)]
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotationFile {
    repo_url: String,
    #[serde(default)]
    files: BTreeMap<String, Vec<Annotation>>,
}

/// Annotations of one repository, keyed by file path.
#[derive(Debug)]
pub struct AnnotationStore {
    path: PathBuf,
    data: AnnotationFile,
}

impl AnnotationStore {
    pub fn path_for(data_dir: &Path, repo_url: &str) -> PathBuf {
        data_dir.join("annotations").join(format!("{}.json", stable_key(repo_url)))
    }

    pub fn open(data_dir: &Path, repo_url: &str) -> Result<Self> {
        let path = Self::path_for(data_dir, repo_url);
        let data = read_json(&path)?
            .unwrap_or_else(|| AnnotationFile { repo_url: repo_url.trim().to_string(), ..Default::default() });
        Ok(Self { path, data })
    }

    pub fn save(&self) -> Result<()> {
        write_json(&self.path, &self.data)
    }

    /// Annotations on `file_path`, ordered by line.
    pub fn list(&self, file_path: &str) -> Vec<&Annotation> {
        let mut items: Vec<&Annotation> = self
            .data
            .files
            .get(&normalize_path(file_path))
            .map(|v| v.iter().collect())
            .unwrap_or_default();
        items.sort_by_key(|a| (a.line, a.created_at));
        items
    }

    pub fn add(&mut self, file_path: &str, line: u32, author: &str, text: &str) -> Result<&Annotation> {
        if text.trim().is_empty() {
            bail!("Annotation text cannot be empty");
        }
        if line == 0 {
            bail!("Line numbers start at 1");
        }
        let annotation = Annotation {
            id: uuid::Uuid::new_v4().simple().to_string()[..12].to_string(),
            line,
            author: author.trim().to_string(),
            text: text.trim().to_string(),
            created_at: Utc::now(),
        };
        let entries = self.data.files.entry(normalize_path(file_path)).or_default();
        entries.push(annotation);
        Ok(&entries[entries.len() - 1])
    }

    /// Remove by id; `false` if no such annotation exists on `file_path`.
    pub fn remove(&mut self, file_path: &str, id: &str) -> bool {
        let key = normalize_path(file_path);
        let Some(entries) = self.data.files.get_mut(&key) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|a| a.id != id);
        let removed = entries.len() != before;
        if entries.is_empty() {
            self.data.files.remove(&key);
        }
        removed
    }

    /// Shareable JSON document for one file.
    pub fn export(&self, file_path: &str) -> serde_json::Value {
        serde_json::json!({
            "repoUrl": self.data.repo_url,
            "filePath": normalize_path(file_path),
            "annotations": self.list(file_path),
        })
    }
}
