//! Repository session context: the current tree snapshot plus visited files.

use crate::domain::RepoRef;
use crate::error::{StudioError, StudioResult};
use crate::fetch::{fetch_tree, RepoFiles, RepoHost};
use crate::tree::{
    count_files, find_file, is_placeholder, load_content, mark_visited, progress, render_tree,
    TreeNode, VisitedSet,
};
use globset::GlobSet;
use std::sync::Arc;

/// Result of opening a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub id: String,
    pub path: String,
    pub content: String,
    /// Content was fetched by this call rather than already present.
    pub freshly_loaded: bool,
}

/// An analyzed repository.
pub struct RepoContext {
    repo: RepoRef,
    host: Arc<dyn RepoHost>,
    tree: Vec<TreeNode>,
    visited: VisitedSet,
}

impl RepoContext {
    /// List `repo` and build a fresh context. Fails without partial state if
    /// either listing call fails.
    pub async fn analyze(
        host: Arc<dyn RepoHost>,
        repo: RepoRef,
        exclude: Option<&GlobSet>,
    ) -> StudioResult<Self> {
        let tree = fetch_tree(host.as_ref(), &repo, exclude).await?;
        tracing::info!("Analyzed {} ({} files)", repo, count_files(&tree));
        Ok(Self { repo, host, tree, visited: VisitedSet::new() })
    }

    /// Replace the tree with a new listing of `repo`; the visited set resets.
    pub async fn reanalyze(&mut self, repo: RepoRef, exclude: Option<&GlobSet>) -> StudioResult<()> {
        let tree = fetch_tree(self.host.as_ref(), &repo, exclude).await?;
        self.repo = repo;
        self.tree = tree;
        self.visited = VisitedSet::new();
        Ok(())
    }

    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    pub fn tree(&self) -> &[TreeNode] {
        &self.tree
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn total_files(&self) -> usize {
        count_files(&self.tree)
    }

    pub fn progress(&self) -> u8 {
        progress(&self.visited, self.total_files())
    }

    pub fn render(&self, max_depth: usize) -> String {
        render_tree(&self.repo.repo, &self.tree, max_depth, &self.visited)
    }

    /// Open a file: mark it visited, then load its content if still a placeholder.
    ///
    /// The file counts as visited even when loading fails; the tree keeps the
    /// placeholder so a later selection retries the fetch.
    pub async fn select_file(&mut self, id: &str) -> StudioResult<Selection> {
        let (path, was_placeholder) = match find_file(&self.tree, id) {
            Some(file) => (file.path, is_placeholder(file.content)),
            None => return Err(StudioError::InvalidInput(format!("No file with id {id}"))),
        };
        self.visited = mark_visited(&self.visited, id);

        let source = RepoFiles::new(self.host.as_ref(), &self.repo);
        let (tree, content) = load_content(&self.tree, id, &source).await?;
        self.tree = tree;

        Ok(Selection { id: id.to_string(), path, content, freshly_loaded: was_placeholder })
    }

    /// Serialized tree, used as project structure context for the model.
    pub fn structure_json(&self) -> String {
        serde_json::to_string_pretty(&self.tree).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{DemoRepo, FileContent};
    use crate::tree::{find_by_path, RemoteEntry};
    use async_trait::async_trait;

    async fn demo_context() -> RepoContext {
        RepoContext::analyze(Arc::new(DemoRepo::new()), RepoRef::new("demo", "project"), None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn select_loads_once_and_tracks_progress() {
        let mut ctx = demo_context().await;
        assert_eq!(ctx.progress(), 0);

        let first = ctx.select_file("demo-button").await.unwrap();
        assert!(first.freshly_loaded);
        assert_eq!(first.path, "src/components/button.tsx");
        assert!(first.content.contains("Button"));

        let again = ctx.select_file("demo-button").await.unwrap();
        assert!(!again.freshly_loaded);
        assert_eq!(again.content, first.content);

        assert_eq!(ctx.visited().len(), 1);
        assert_eq!(ctx.progress(), 17);
        assert!(ctx.render(8).contains("button.tsx ✓"));
    }

    #[tokio::test]
    async fn unknown_or_folder_ids_are_rejected() {
        let mut ctx = demo_context().await;
        assert!(matches!(ctx.select_file("nope").await, Err(StudioError::InvalidInput(_))));
        assert!(matches!(ctx.select_file("demo-src").await, Err(StudioError::InvalidInput(_))));
        assert!(ctx.visited().is_empty());
    }

    struct BrokenContent;

    #[async_trait]
    impl RepoHost for BrokenContent {
        async fn default_branch_tree_sha(&self, repo: &RepoRef) -> StudioResult<String> {
            DemoRepo::new().default_branch_tree_sha(repo).await
        }
        async fn tree_recursive(&self, repo: &RepoRef, sha: &str) -> StudioResult<Vec<RemoteEntry>> {
            DemoRepo::new().tree_recursive(repo, sha).await
        }
        async fn file_content(&self, _repo: &RepoRef, path: &str) -> StudioResult<FileContent> {
            Err(StudioError::TooLarge(path.to_string()))
        }
    }

    #[tokio::test]
    async fn failed_load_keeps_placeholder_but_marks_visited() {
        let mut ctx =
            RepoContext::analyze(Arc::new(BrokenContent), RepoRef::new("o", "r"), None).await.unwrap();
        let err = ctx.select_file("demo-utils").await.unwrap_err();
        assert!(matches!(err, StudioError::TooLarge(_)));
        assert!(ctx.visited().contains("demo-utils"));
        assert!(is_placeholder(find_by_path(ctx.tree(), "src/lib/utils.ts").unwrap().content));
    }

    #[tokio::test]
    async fn reanalyze_resets_visited() {
        let mut ctx = demo_context().await;
        ctx.select_file("demo-readme").await.unwrap();
        ctx.reanalyze(RepoRef::new("demo", "other"), None).await.unwrap();
        assert!(ctx.visited().is_empty());
        assert_eq!(ctx.repo().repo, "other");
        assert!(is_placeholder(find_by_path(ctx.tree(), "README.md").unwrap().content));
    }
}
