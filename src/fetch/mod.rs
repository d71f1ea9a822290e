//! Remote repository access (GitHub REST, bundled demo data)

use crate::domain::RepoRef;
use crate::error::StudioResult;
use crate::tree::{build_tree, ContentSource, RemoteEntry, TreeNode};
use async_trait::async_trait;
use globset::GlobSet;
use std::sync::atomic::{AtomicBool, Ordering};

pub mod context;
pub mod demo;
pub mod github;
pub mod url;

pub use context::{RepoContext, Selection};
pub use demo::DemoRepo;
pub use github::GitHubClient;
pub use url::{explain_invalid_url, is_valid_repo_url, normalize_repo_url, parse_repo_url};

/// Decoded file returned by a [`RepoHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub content: String,
    pub size: u64,
    pub encoding: String,
}

/// Listing and content operations of a repository hosting API.
#[async_trait]
pub trait RepoHost: Send + Sync {
    /// SHA of the root tree of the default branch's head commit.
    async fn default_branch_tree_sha(&self, repo: &RepoRef) -> StudioResult<String>;

    async fn tree_recursive(&self, repo: &RepoRef, sha: &str) -> StudioResult<Vec<RemoteEntry>>;

    async fn file_content(&self, repo: &RepoRef, path: &str) -> StudioResult<FileContent>;
}

/// Fetch the full listing and build a placeholder tree. Nothing is built if
/// either listing call fails.
pub async fn fetch_tree(
    host: &dyn RepoHost,
    repo: &RepoRef,
    exclude: Option<&GlobSet>,
) -> StudioResult<Vec<TreeNode>> {
    let sha = host.default_branch_tree_sha(repo).await?;
    let entries = host.tree_recursive(repo, &sha).await?;
    tracing::debug!("{} listed {} entries", repo, entries.len());
    Ok(build_tree(entries, exclude))
}

/// Binds a host to one repository so the content loader can fetch by path.
pub struct RepoFiles<'a> {
    host: &'a dyn RepoHost,
    repo: &'a RepoRef,
}

impl<'a> RepoFiles<'a> {
    pub fn new(host: &'a dyn RepoHost, repo: &'a RepoRef) -> Self {
        Self { host, repo }
    }
}

#[async_trait]
impl ContentSource for RepoFiles<'_> {
    async fn fetch(&self, path: &str, _file_id: &str) -> StudioResult<String> {
        let path = path.strip_prefix('/').unwrap_or(path);
        Ok(self.host.file_content(self.repo, path).await?.content)
    }
}

/// Serves the demo dataset once the primary host's listing fails.
///
/// After switching, every call (listing and content) goes to the fallback so
/// the tree and its contents always come from the same source.
pub struct WithFallback<P> {
    primary: P,
    fallback: DemoRepo,
    switched: AtomicBool,
}

impl<P: RepoHost> WithFallback<P> {
    pub fn new(primary: P) -> Self {
        Self { primary, fallback: DemoRepo::new(), switched: AtomicBool::new(false) }
    }

    pub fn using_fallback(&self) -> bool {
        self.switched.load(Ordering::SeqCst)
    }

    fn switch(&self, reason: &crate::error::StudioError) {
        tracing::warn!("Repository listing failed ({reason}); using demo data");
        self.switched.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl<P: RepoHost> RepoHost for WithFallback<P> {
    async fn default_branch_tree_sha(&self, repo: &RepoRef) -> StudioResult<String> {
        if self.using_fallback() {
            return self.fallback.default_branch_tree_sha(repo).await;
        }
        match self.primary.default_branch_tree_sha(repo).await {
            Ok(sha) => Ok(sha),
            Err(e) => {
                self.switch(&e);
                self.fallback.default_branch_tree_sha(repo).await
            }
        }
    }

    async fn tree_recursive(&self, repo: &RepoRef, sha: &str) -> StudioResult<Vec<RemoteEntry>> {
        if self.using_fallback() {
            return self.fallback.tree_recursive(repo, sha).await;
        }
        match self.primary.tree_recursive(repo, sha).await {
            Ok(entries) => Ok(entries),
            Err(e) => {
                self.switch(&e);
                let sha = self.fallback.default_branch_tree_sha(repo).await?;
                self.fallback.tree_recursive(repo, &sha).await
            }
        }
    }

    async fn file_content(&self, repo: &RepoRef, path: &str) -> StudioResult<FileContent> {
        if self.using_fallback() {
            self.fallback.file_content(repo, path).await
        } else {
            self.primary.file_content(repo, path).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StudioError;
    use crate::tree::{count_files, is_placeholder, load_content};

    struct Unreachable;

    #[async_trait]
    impl RepoHost for Unreachable {
        async fn default_branch_tree_sha(&self, _repo: &RepoRef) -> StudioResult<String> {
            Err(StudioError::Network("connection refused".into()))
        }
        async fn tree_recursive(&self, _r: &RepoRef, _s: &str) -> StudioResult<Vec<RemoteEntry>> {
            Err(StudioError::Network("connection refused".into()))
        }
        async fn file_content(&self, _r: &RepoRef, _p: &str) -> StudioResult<FileContent> {
            Err(StudioError::Network("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn fetch_tree_propagates_listing_errors() {
        let repo = RepoRef::new("o", "r");
        let err = fetch_tree(&Unreachable, &repo, None).await.unwrap_err();
        assert!(matches!(err, StudioError::Network(_)));
    }

    #[tokio::test]
    async fn fallback_serves_demo_tree_and_contents() {
        let host = WithFallback::new(Unreachable);
        let repo = RepoRef::new("o", "r");
        let tree = fetch_tree(&host, &repo, None).await.unwrap();
        assert!(host.using_fallback());
        assert!(count_files(&tree) > 0);

        let first = crate::tree::flatten_files(&tree).into_iter().next().unwrap();
        assert!(is_placeholder(first.content));
        let id = first.id.to_string();
        let (loaded, content) = load_content(&tree, &id, &RepoFiles::new(&host, &repo)).await.unwrap();
        assert!(!is_placeholder(&content));
        assert_ne!(loaded, tree);
    }
}
