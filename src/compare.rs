//! Line-by-line file comparison.
//!
//! Lines are compared position by position; there is no alignment, so an
//! inserted line shows up as a difference on every line after it.

use serde::Serialize;

/// How many differences the CLI shows before summarizing the rest.
pub const DISPLAY_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineDiff {
    /// 1-based.
    pub line: usize,
    pub left: Option<String>,
    pub right: Option<String>,
}

/// Every line number where `left` and `right` differ. A missing line counts
/// as empty, so trailing blank lines on one side are not differences.
pub fn line_differences(left: &str, right: &str) -> Vec<LineDiff> {
    let left_lines: Vec<&str> = left.split('\n').collect();
    let right_lines: Vec<&str> = right.split('\n').collect();
    let max = left_lines.len().max(right_lines.len());

    (0..max)
        .filter_map(|i| {
            let l = left_lines.get(i).copied();
            let r = right_lines.get(i).copied();
            (l.unwrap_or("") != r.unwrap_or("")).then(|| LineDiff {
                line: i + 1,
                left: l.map(str::to_string),
                right: r.map(str::to_string),
            })
        })
        .collect()
}

/// Percentage of compared lines that are equal.
pub fn similarity(left: &str, right: &str) -> u8 {
    let total = left.split('\n').count().max(right.split('\n').count());
    let differing = line_differences(left, right).len();
    (100.0 * (total - differing) as f64 / total as f64).round() as u8
}
