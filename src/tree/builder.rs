//! Build a [`TreeNode`] forest from a flat remote listing.

use super::{placeholder_content, TreeNode};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Blob,
    Tree,
    Other(String),
}

impl EntryKind {
    /// Map a git object type (`blob`, `tree`, `commit`, ...).
    pub fn from_git_type(kind: &str) -> Self {
        match kind {
            "blob" => EntryKind::Blob,
            "tree" => EntryKind::Tree,
            other => EntryKind::Other(other.to_string()),
        }
    }
}

/// One row of a recursive tree listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub path: String,
    pub kind: EntryKind,
    pub sha: String,
}

impl RemoteEntry {
    pub fn new(path: impl Into<String>, kind: EntryKind, sha: impl Into<String>) -> Self {
        Self { path: path.into(), kind, sha: sha.into() }
    }

    fn depth(&self) -> usize {
        self.path.split('/').count()
    }
}

/// Compile exclude patterns, skipping invalid ones.
pub fn build_exclude_globset(patterns: &[String]) -> Option<GlobSet> {
    if patterns.is_empty() {
        return None;
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => tracing::warn!("Ignoring invalid exclude glob {pattern:?}: {e}"),
        }
    }
    builder.build().ok()
}

struct Pending {
    id: String,
    name: String,
    is_folder: bool,
    children: Vec<usize>,
}

/// Turn a flat listing into a tree whose files carry placeholder content.
///
/// Entries are ordered by segment count, then path, so a parent is always
/// inserted before its children whatever characters the paths contain.
/// Folder children keep that order.
pub fn build_tree(mut entries: Vec<RemoteEntry>, exclude: Option<&GlobSet>) -> Vec<TreeNode> {
    entries.sort_by(|a, b| a.depth().cmp(&b.depth()).then_with(|| a.path.cmp(&b.path)));

    let mut arena: Vec<Pending> = Vec::with_capacity(entries.len());
    let mut by_path: HashMap<String, usize> = HashMap::new();
    let mut roots: Vec<usize> = Vec::new();
    let mut ids: HashSet<String> = HashSet::new();

    for entry in entries {
        let is_folder = match entry.kind {
            EntryKind::Tree => true,
            EntryKind::Blob => false,
            EntryKind::Other(ref kind) => {
                tracing::debug!("Skipping {} entry {}", kind, entry.path);
                continue;
            }
        };
        if entry.path.is_empty() || by_path.contains_key(&entry.path) {
            continue;
        }
        if exclude.is_some_and(|set| set.is_match(&entry.path)) {
            tracing::debug!("Excluded {}", entry.path);
            continue;
        }

        let (parent_path, name) = match entry.path.rsplit_once('/') {
            Some((parent, name)) => (parent, name),
            None => ("", entry.path.as_str()),
        };

        let parent = if parent_path.is_empty() {
            None
        } else {
            match by_path.get(parent_path) {
                Some(&idx) if arena[idx].is_folder => Some(idx),
                _ => {
                    tracing::debug!("Dropping {} (parent {} not listed)", entry.path, parent_path);
                    continue;
                }
            }
        };

        // identical blobs share a sha; ids must stay unique per snapshot
        let id = if ids.contains(&entry.sha) {
            format!("{}:{}", entry.sha, entry.path)
        } else {
            entry.sha.clone()
        };
        ids.insert(id.clone());

        let idx = arena.len();
        arena.push(Pending {
            id,
            name: name.to_string(),
            is_folder,
            children: Vec::new(),
        });
        match parent {
            Some(parent_idx) => arena[parent_idx].children.push(idx),
            None => roots.push(idx),
        }
        by_path.insert(entry.path, idx);
    }

    let mut paths: Vec<String> = vec![String::new(); arena.len()];
    for (path, idx) in by_path {
        paths[idx] = path;
    }

    roots.iter().map(|&idx| materialize(&arena, &paths, idx)).collect()
}

fn materialize(arena: &[Pending], paths: &[String], idx: usize) -> TreeNode {
    let node = &arena[idx];
    if node.is_folder {
        let children = node.children.iter().map(|&c| materialize(arena, paths, c)).collect();
        TreeNode::folder(node.id.clone(), node.name.clone(), children)
    } else {
        TreeNode::file(node.id.clone(), node.name.clone(), placeholder_content(&paths[idx]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{count_files, find_by_path, is_placeholder};

    fn blob(path: &str, sha: &str) -> RemoteEntry {
        RemoteEntry::new(path, EntryKind::Blob, sha)
    }

    fn dir(path: &str, sha: &str) -> RemoteEntry {
        RemoteEntry::new(path, EntryKind::Tree, sha)
    }

    #[test]
    fn builds_nested_tree_with_placeholders() {
        let tree = build_tree(
            vec![dir("src", "t1"), blob("src/app.tsx", "b1"), blob("pkg.json", "b2")],
            None,
        );

        assert_eq!(tree.len(), 2);
        let src = tree.iter().find(|n| n.name() == "src").unwrap();
        match src {
            TreeNode::Folder { id, children, .. } => {
                assert_eq!(id, "t1");
                assert_eq!(children.len(), 1);
                assert_eq!(children[0].name(), "app.tsx");
            }
            other => panic!("expected folder, got {other:?}"),
        }
        let pkg = find_by_path(&tree, "pkg.json").unwrap();
        assert!(is_placeholder(pkg.content));
        assert!(pkg.content.contains("pkg.json"));
        assert!(is_placeholder(find_by_path(&tree, "src/app.tsx").unwrap().content));
        assert_eq!(count_files(&tree), 2);
    }

    #[test]
    fn children_listed_before_parent_still_attach() {
        let tree = build_tree(
            vec![blob("a/c.txt", "b1"), dir("a-b", "t2"), dir("a", "t1"), blob("a-b/d.txt", "b2")],
            None,
        );
        assert_eq!(count_files(&tree), 2);
        assert!(find_by_path(&tree, "a/c.txt").is_some());
        assert!(find_by_path(&tree, "a-b/d.txt").is_some());
    }

    #[test]
    fn skips_unknown_kinds() {
        let tree = build_tree(
            vec![
                RemoteEntry::new("vendor/lib", EntryKind::from_git_type("commit"), "c1"),
                blob("README.md", "b1"),
            ],
            None,
        );
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].name(), "README.md");
    }

    #[test]
    fn orphans_are_dropped() {
        let tree = build_tree(vec![blob("missing/file.rs", "b1"), blob("main.rs", "b2")], None);
        assert_eq!(count_files(&tree), 1);
    }

    #[test]
    fn exclude_globs_prune_subtrees() {
        let set = build_exclude_globset(&["node_modules".to_string(), "**/*.png".to_string()]);
        let tree = build_tree(
            vec![
                dir("node_modules", "t1"),
                blob("node_modules/x/index.js", "b1"),
                dir("assets", "t2"),
                blob("assets/logo.png", "b2"),
                blob("assets/style.css", "b3"),
            ],
            set.as_ref(),
        );
        assert_eq!(tree.len(), 1);
        assert_eq!(count_files(&tree), 1);
        assert!(find_by_path(&tree, "assets/style.css").is_some());
    }

    #[test]
    fn duplicate_blob_shas_get_distinct_ids() {
        let tree = build_tree(vec![blob("a.txt", "same"), blob("b.txt", "same")], None);
        let a = find_by_path(&tree, "a.txt").unwrap();
        let b = find_by_path(&tree, "b.txt").unwrap();
        assert_eq!(a.id, "same");
        assert_eq!(b.id, "same:b.txt");
    }

    #[test]
    fn empty_listing_builds_empty_tree() {
        assert!(build_tree(Vec::new(), None).is_empty());
    }
}
