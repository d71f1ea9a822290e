//! Text rendering of a file tree.

use super::{TreeNode, VisitedSet};

/// Render `nodes` under a `root_label/` line using box-drawing connectors.
///
/// Folders end with `/`; visited files are marked with ` ✓`. Entries deeper
/// than `max_depth` are omitted.
pub fn render_tree(root_label: &str, nodes: &[TreeNode], max_depth: usize, visited: &VisitedSet) -> String {
    let mut lines = vec![format!("{root_label}/")];
    walk(nodes, "", 1, max_depth, visited, &mut lines);
    lines.join("\n")
}

fn walk(
    nodes: &[TreeNode],
    prefix: &str,
    depth: usize,
    max_depth: usize,
    visited: &VisitedSet,
    lines: &mut Vec<String>,
) {
    if depth > max_depth {
        return;
    }

    let total = nodes.len();
    for (idx, node) in nodes.iter().enumerate() {
        let is_last = idx + 1 == total;
        let connector = if is_last { "└── " } else { "├── " };

        match node {
            TreeNode::Folder { name, children, .. } => {
                lines.push(format!("{prefix}{connector}{name}/"));
                let extension = if is_last { "    " } else { "│   " };
                walk(children, &format!("{prefix}{extension}"), depth + 1, max_depth, visited, lines);
            }
            TreeNode::File { id, name, .. } => {
                let marker = if visited.contains(id) { " ✓" } else { "" };
                lines.push(format!("{prefix}{connector}{name}{marker}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::tests::sample_tree;

    #[test]
    fn renders_nested_tree() {
        let visited: VisitedSet = ["2"].into_iter().collect();
        let out = render_tree("demo", &sample_tree(), 8, &visited);
        insta::assert_snapshot!(out, @r"
        demo/
        ├── src/
        │   ├── app.tsx ✓
        │   └── utils/
        │       └── helper.ts
        └── package.json
        ");
    }

    #[test]
    fn depth_limit_hides_nested_entries() {
        let out = render_tree("demo", &sample_tree(), 1, &VisitedSet::new());
        assert!(out.contains("src/"));
        assert!(out.contains("package.json"));
        assert!(!out.contains("app.tsx"));
    }

    #[test]
    fn empty_tree_renders_root_only() {
        assert_eq!(render_tree("r", &[], 4, &VisitedSet::new()), "r/");
    }
}
