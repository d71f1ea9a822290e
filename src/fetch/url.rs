//! GitHub repository URL validation and normalization

use crate::domain::RepoRef;
use crate::error::{StudioError, StudioResult};
use once_cell::sync::Lazy;
use regex::Regex;

static REPO_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https://github\.com/[\w\-.]+/[\w\-.]+/?$").expect("valid regex"));

/// `true` for `https://github.com/{owner}/{repo}` with an optional trailing slash.
pub fn is_valid_repo_url(url: &str) -> bool {
    !url.trim().is_empty() && REPO_URL.is_match(url.trim())
}

/// Reduce a GitHub URL to `https://github.com/owner/repo`.
///
/// Strips the query string, fragment, `.git` suffix and any sub-path such as
/// `/tree/main/src`. Accepts `http://`, `https://` and scheme-less input.
///
/// Examples:
/// - `https://github.com/o/r.git`          → `https://github.com/o/r`
/// - `https://github.com/o/r/tree/main/x`  → `https://github.com/o/r`
/// - `github.com/o/r?tab=readme`           → `https://github.com/o/r`
pub fn normalize_repo_url(url: &str) -> StudioResult<String> {
    parse_repo_url(url).map(|r| r.url())
}

pub fn parse_repo_url(url: &str) -> StudioResult<RepoRef> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(StudioError::InvalidInput("Please enter a repository URL.".to_string()));
    }

    let without_fragment = trimmed.split('#').next().unwrap_or_default();
    let without_query = without_fragment.split('?').next().unwrap_or_default();
    let without_scheme = without_query
        .strip_prefix("https://")
        .or_else(|| without_query.strip_prefix("http://"))
        .unwrap_or(without_query);

    let mut segments = without_scheme.split('/').filter(|s| !s.is_empty());
    let host = segments.next().unwrap_or_default().to_ascii_lowercase();
    if host != "github.com" && host != "www.github.com" {
        return Err(StudioError::InvalidInput(explain_invalid_url(trimmed)));
    }

    let owner = segments.next().unwrap_or_default();
    let repo = segments.next().unwrap_or_default();
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if owner.is_empty() || repo.is_empty() {
        return Err(StudioError::InvalidInput(explain_invalid_url(trimmed)));
    }

    Ok(RepoRef::new(owner, repo))
}

/// Message telling the user what is wrong with a URL that failed validation.
pub fn explain_invalid_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        "Please enter a repository URL.".to_string()
    } else if !url.contains("github.com") {
        "Only GitHub repository URLs are supported. Please use a URL like: \
         https://github.com/owner/repository"
            .to_string()
    } else if !url.starts_with("https://") {
        "Please use HTTPS URLs. Example: https://github.com/owner/repository".to_string()
    } else {
        "Invalid GitHub URL format. Please use: https://github.com/owner/repository".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_repo_urls() {
        assert!(is_valid_repo_url("https://github.com/user/repo"));
        assert!(is_valid_repo_url("https://github.com/user-name/repo-name"));
        assert!(is_valid_repo_url("https://github.com/user.name/repo.name/"));

        assert!(!is_valid_repo_url("https://gitlab.com/user/repo"));
        assert!(!is_valid_repo_url("not-a-url"));
        assert!(!is_valid_repo_url(""));
        assert!(!is_valid_repo_url("https://github.com/"));
        assert!(!is_valid_repo_url("https://github.com/user/repo/tree/main"));
    }

    #[test]
    fn normalizes_variants() {
        let cases = [
            "https://github.com/o/r",
            "https://github.com/o/r/",
            "https://github.com/o/r.git",
            "https://github.com/o/r/tree/main/src",
            "https://github.com/o/r?tab=readme-ov-file#usage",
            "http://github.com/o/r",
            "github.com/o/r",
        ];
        for case in cases {
            assert_eq!(normalize_repo_url(case).unwrap(), "https://github.com/o/r", "{case}");
        }
    }

    #[test]
    fn normalized_url_validates() {
        let url = normalize_repo_url("https://github.com/LeoHNDZ/studio.git").unwrap();
        assert!(is_valid_repo_url(&url));
    }

    #[test]
    fn rejects_other_hosts_with_reason() {
        let err = parse_repo_url("https://gitlab.com/o/r").unwrap_err();
        match err {
            StudioError::InvalidInput(msg) => assert!(msg.contains("Only GitHub")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_repo() {
        assert!(parse_repo_url("https://github.com/onlyowner").is_err());
        assert!(parse_repo_url("   ").is_err());
    }

    #[test]
    fn explains_http() {
        assert!(explain_invalid_url("http://github.com/o").contains("HTTPS"));
    }
}
