//! On-demand file content loading.

use super::{find_file, is_placeholder, update_content, TreeNode};
use crate::error::StudioResult;
use async_trait::async_trait;

/// Somewhere real file bytes can be fetched from.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, path: &str, file_id: &str) -> StudioResult<String>;
}

/// Replace a file's placeholder with its fetched content.
///
/// Returns the new snapshot plus the file's content. When `file_id` is not a
/// file in `tree`, or is already loaded, nothing is fetched and the snapshot
/// comes back unchanged with the current content (empty for unknown ids).
/// A failed fetch leaves `tree` untouched so the caller may retry.
pub async fn load_content<S>(
    tree: &[TreeNode],
    file_id: &str,
    source: &S,
) -> StudioResult<(Vec<TreeNode>, String)>
where
    S: ContentSource + ?Sized,
{
    let Some(file) = find_file(tree, file_id) else {
        tracing::debug!("load_content: {file_id} not in tree");
        return Ok((tree.to_vec(), String::new()));
    };
    if !is_placeholder(file.content) {
        return Ok((tree.to_vec(), file.content.to_string()));
    }

    tracing::debug!("Fetching content for {} ({})", file.path, file_id);
    let content = source.fetch(&file.path, file_id).await?;
    let updated = update_content(tree, file_id, &content);
    Ok((updated, content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StudioError;
    use crate::tree::tests::sample_tree;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct Recording {
        calls: AtomicUsize,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl Recording {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0), seen: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl ContentSource for Recording {
        async fn fetch(&self, path: &str, file_id: &str) -> StudioResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push((path.to_string(), file_id.to_string()));
            Ok(format!("// real {path}"))
        }
    }

    struct Failing;

    #[async_trait]
    impl ContentSource for Failing {
        async fn fetch(&self, path: &str, _file_id: &str) -> StudioResult<String> {
            Err(StudioError::TooLarge(path.to_string()))
        }
    }

    #[tokio::test]
    async fn loads_placeholder_once() {
        let source = Recording::new();
        let tree = sample_tree();

        let (first, content) = load_content(&tree, "4", &source).await.unwrap();
        assert_eq!(content, "// real src/utils/helper.ts");
        assert_eq!(find_file(&first, "4").unwrap().content, content);
        assert_eq!(
            source.seen.lock().unwrap().as_slice(),
            &[("src/utils/helper.ts".to_string(), "4".to_string())]
        );

        let (second, again) = load_content(&first, "4", &source).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(again, content);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn loaded_file_is_not_refetched() {
        let source = Recording::new();
        let tree = sample_tree();
        let (same, content) = load_content(&tree, "2", &source).await.unwrap();
        assert_eq!(same, tree);
        assert_eq!(content, "export default function App() {}");
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_id_is_noop() {
        let source = Recording::new();
        let tree = sample_tree();
        let (same, content) = load_content(&tree, "missing", &source).await.unwrap();
        assert_eq!(same, tree);
        assert!(content.is_empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failure_propagates_and_keeps_placeholder() {
        let tree = sample_tree();
        let err = load_content(&tree, "4", &Failing).await.unwrap_err();
        assert!(matches!(err, StudioError::TooLarge(_)));
        assert!(is_placeholder(find_file(&tree, "4").unwrap().content));
    }
}
