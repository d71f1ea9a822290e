//! Exploration progress: which files the user has opened.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Ids of visited nodes. Grows within a session; replaced with an empty set
/// whenever a new tree is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitedSet(BTreeSet<String>);

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for VisitedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

pub fn mark_visited(visited: &VisitedSet, node_id: &str) -> VisitedSet {
    if visited.contains(node_id) {
        return visited.clone();
    }
    let mut next = visited.0.clone();
    next.insert(node_id.to_string());
    VisitedSet(next)
}

/// Percentage of files visited, rounded, in `0..=100`.
pub fn progress(visited: &VisitedSet, total_files: usize) -> u8 {
    if total_files == 0 {
        return 0;
    }
    let pct = (100.0 * visited.len() as f64 / total_files as f64).round();
    pct.clamp(0.0, 100.0) as u8
}
