//! Repository file tree: node model, building from remote listings, lazy
//! content loading and exploration progress.
//!
//! Trees are immutable snapshots. Every edit returns a new `Vec<TreeNode>`;
//! nothing here mutates a tree a caller already holds.

use serde::{Deserialize, Serialize};

pub mod builder;
pub mod loader;
pub mod progress;
pub mod render;

pub use builder::{build_exclude_globset, build_tree, EntryKind, RemoteEntry};
pub use loader::{load_content, ContentSource};
pub use progress::{mark_visited, progress, VisitedSet};
pub use render::render_tree;

/// Substring that marks file content as not yet fetched.
pub const PLACEHOLDER_SENTINEL: &str = "will be loaded on demand.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    File { id: String, name: String, content: String },
    Folder { id: String, name: String, children: Vec<TreeNode> },
}

impl TreeNode {
    pub fn file(id: impl Into<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        TreeNode::File { id: id.into(), name: name.into(), content: content.into() }
    }

    pub fn folder(id: impl Into<String>, name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        TreeNode::Folder { id: id.into(), name: name.into(), children }
    }

    pub fn id(&self) -> &str {
        match self {
            TreeNode::File { id, .. } | TreeNode::Folder { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TreeNode::File { name, .. } | TreeNode::Folder { name, .. } => name,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, TreeNode::File { .. })
    }
}

/// A file located in a tree, with its slash-separated path from the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub content: &'a str,
    pub path: String,
}

/// Placeholder content assigned to a file before its bytes are fetched.
pub fn placeholder_content(path: &str) -> String {
    format!("// Content for {path} {PLACEHOLDER_SENTINEL}")
}

pub fn is_placeholder(content: &str) -> bool {
    content.contains(PLACEHOLDER_SENTINEL)
}

/// Number of file leaves, at any depth.
pub fn count_files(nodes: &[TreeNode]) -> usize {
    nodes
        .iter()
        .map(|node| match node {
            TreeNode::File { .. } => 1,
            TreeNode::Folder { children, .. } => count_files(children),
        })
        .sum()
}

/// Return a copy of `nodes` where the file with `target_id` carries `new_content`.
///
/// An unknown id yields an unchanged copy.
pub fn update_content(nodes: &[TreeNode], target_id: &str, new_content: &str) -> Vec<TreeNode> {
    nodes.iter().map(|node| update_node(node, target_id, new_content)).collect()
}

fn update_node(node: &TreeNode, target_id: &str, new_content: &str) -> TreeNode {
    match node {
        TreeNode::File { id, name, .. } if id == target_id => {
            TreeNode::file(id.clone(), name.clone(), new_content)
        }
        TreeNode::Folder { id, name, children } => {
            TreeNode::folder(id.clone(), name.clone(), update_content(children, target_id, new_content))
        }
        file => file.clone(),
    }
}

/// Pre-order search for the file with `id`.
pub fn find_file<'a>(nodes: &'a [TreeNode], id: &str) -> Option<FileRef<'a>> {
    flatten_files(nodes).into_iter().find(|f| f.id == id)
}

/// Locate a file by its slash path (a leading `/` is ignored).
pub fn find_by_path<'a>(nodes: &'a [TreeNode], path: &str) -> Option<FileRef<'a>> {
    let wanted = path.trim_start_matches('/');
    flatten_files(nodes).into_iter().find(|f| f.path == wanted)
}

/// Every file in pre-order, paired with its full path.
pub fn flatten_files(nodes: &[TreeNode]) -> Vec<FileRef<'_>> {
    let mut out = Vec::new();
    collect_files(nodes, "", &mut out);
    out
}

fn collect_files<'a>(nodes: &'a [TreeNode], base: &str, out: &mut Vec<FileRef<'a>>) {
    for node in nodes {
        let path = if base.is_empty() {
            node.name().to_string()
        } else {
            format!("{base}/{}", node.name())
        };
        match node {
            TreeNode::File { id, name, content } => {
                out.push(FileRef { id, name, content, path });
            }
            TreeNode::Folder { children, .. } => collect_files(children, &path, out),
        }
    }
}
