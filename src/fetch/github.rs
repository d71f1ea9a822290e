//! GitHub REST client

use crate::domain::{Config, RepoRef};
use crate::error::{StudioError, StudioResult};
use crate::fetch::{FileContent, RepoHost};
use crate::tree::{EntryKind, RemoteEntry};
use crate::utils::{decode_bytes, format_file_size, looks_binary};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Largest file the contents API returns inline.
pub const MAX_CONTENT_BYTES: u64 = 1_048_576;

const USER_AGENT: &str = concat!("studioflow/", env!("CARGO_PKG_VERSION"));

pub struct GitHubClient {
    client: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct RepoInfo {
    default_branch: String,
}

#[derive(Deserialize)]
struct BranchInfo {
    commit: BranchCommit,
}

#[derive(Deserialize)]
struct BranchCommit {
    commit: CommitInfo,
}

#[derive(Deserialize)]
struct CommitInfo {
    tree: ShaRef,
}

#[derive(Deserialize)]
struct ShaRef {
    sha: String,
}

#[derive(Deserialize)]
struct TreeListing {
    #[serde(default)]
    tree: Vec<TreeItem>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct TreeItem {
    path: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    sha: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Directory(Vec<serde_json::Value>),
    Entry(ContentEntry),
}

#[derive(Deserialize)]
struct ContentEntry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    size: u64,
}

impl GitHubClient {
    pub fn new(config: &Config) -> StudioResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| StudioError::Unknown(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_base: config.github_api_base.trim_end_matches('/').to_string(),
            token: config.github_token.clone().filter(|t| !t.trim().is_empty()),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> StudioResult<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| StudioError::InvalidInput(format!("bad GitHub API base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| StudioError::InvalidInput("GitHub API base cannot be a base URL".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> StudioResult<T> {
        tracing::debug!("GET {}", url);
        let mut request = self.client.get(url).header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("GitHub {} for {}: {}", status, what, body);
            return Err(StudioError::from_github_status(status.as_u16(), what, &body));
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl RepoHost for GitHubClient {
    async fn default_branch_tree_sha(&self, repo: &RepoRef) -> StudioResult<String> {
        let what = format!("Repository {repo}");
        let info: RepoInfo =
            self.get_json(self.endpoint(&["repos", &repo.owner, &repo.repo])?, &what).await?;

        let branch_url =
            self.endpoint(&["repos", &repo.owner, &repo.repo, "branches", &info.default_branch])?;
        let branch: BranchInfo = self.get_json(branch_url, &what).await?;

        let sha = branch.commit.commit.tree.sha;
        if sha.is_empty() {
            return Err(StudioError::Unknown(format!(
                "could not find tree SHA for branch {}",
                info.default_branch
            )));
        }
        Ok(sha)
    }

    async fn tree_recursive(&self, repo: &RepoRef, sha: &str) -> StudioResult<Vec<RemoteEntry>> {
        let mut url = self.endpoint(&["repos", &repo.owner, &repo.repo, "git", "trees", sha])?;
        url.query_pairs_mut().append_pair("recursive", "1");
        let listing: TreeListing = self.get_json(url, &format!("Repository {repo}")).await?;
        if listing.truncated {
            tracing::warn!("GitHub truncated the tree listing for {repo}; some files are missing");
        }

        Ok(listing
            .tree
            .into_iter()
            .filter_map(|item| {
                Some(RemoteEntry::new(item.path?, EntryKind::from_git_type(&item.kind?), item.sha?))
            })
            .collect())
    }

    async fn file_content(&self, repo: &RepoRef, path: &str) -> StudioResult<FileContent> {
        let mut segments = vec!["repos", repo.owner.as_str(), repo.repo.as_str(), "contents"];
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
        let what = format!("File {path}");
        let response: ContentsResponse = self.get_json(self.endpoint(&segments)?, &what).await?;

        let entry = match response {
            ContentsResponse::Directory(_) => {
                return Err(StudioError::InvalidInput(format!(
                    "Expected file but got directory: {path}"
                )))
            }
            ContentsResponse::Entry(entry) => entry,
        };
        if entry.kind != "file" {
            return Err(StudioError::InvalidInput(format!("Path does not point to a file: {path}")));
        }
        if entry.size > MAX_CONTENT_BYTES {
            return Err(StudioError::TooLarge(format!(
                "{path} is {}",
                format_file_size(entry.size)
            )));
        }

        let raw = entry.content.unwrap_or_default();
        let encoding = entry.encoding.unwrap_or_else(|| "utf-8".to_string());
        let content = if encoding == "base64" {
            let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = STANDARD
                .decode(compact.as_bytes())
                .map_err(|e| StudioError::Unknown(format!("invalid base64 for {path}: {e}")))?;
            if looks_binary(&bytes) {
                format!("// Binary file ({}) not shown", format_file_size(entry.size))
            } else {
                decode_bytes(&bytes).0
            }
        } else {
            raw
        };

        Ok(FileContent { content, size: entry.size, encoding })
    }
}
