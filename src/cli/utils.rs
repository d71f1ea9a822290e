//! Shared CLI utilities.

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{resolve_config, CliOverrides};
use crate::domain::{Config, RepoRef};
use crate::error::StudioError;
use crate::fetch::{parse_repo_url, DemoRepo, GitHubClient, RepoContext, RepoHost, Selection, WithFallback};
use crate::llm::LlmClient;
use crate::tree::{build_exclude_globset, find_by_path};

/// Repository selection shared by every repository command.
#[derive(Args, Debug, Clone)]
pub struct RepoArgs {
    /// GitHub repository URL (https://github.com/owner/repo)
    #[arg(value_name = "URL")]
    pub url: String,

    /// Use the bundled demo repository instead of GitHub
    #[arg(long)]
    pub demo: bool,

    /// Exclude paths matching these globs (comma-separated)
    #[arg(short = 'e', long, value_name = "GLOBS")]
    pub exclude_glob: Option<String>,

    /// Serve demo data if the GitHub listing fails
    #[arg(long)]
    pub fallback_demo: bool,
}

/// Generation settings that override the config file and environment.
#[derive(Args, Debug, Clone, Default)]
pub struct LlmArgs {
    /// Gemini model name
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Maximum output tokens per answer (1-8192)
    #[arg(long, value_name = "N")]
    pub max_output_tokens: Option<u32>,

    /// Sampling temperature (0-2)
    #[arg(long, value_name = "T")]
    pub temperature: Option<f32>,
}

/// Parse a comma-separated string into a `Vec<String>`, trimming whitespace and
/// discarding empty segments.  Returns `None` when `value` is `None`.
pub fn parse_csv(value: &Option<String>) -> Option<Vec<String>> {
    value.as_ref().map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.to_string())
            .collect::<Vec<_>>()
    })
}

/// Parse `A-B` (1-based, inclusive) or a single line `A`.
pub fn parse_line_range(value: &str) -> Result<(usize, usize)> {
    let (start, end) = match value.split_once('-') {
        Some((a, b)) => (a.trim(), b.trim()),
        None => (value.trim(), value.trim()),
    };
    let start: usize = start.parse().with_context(|| format!("Invalid line range {value:?}"))?;
    let end: usize = end.parse().with_context(|| format!("Invalid line range {value:?}"))?;
    if start == 0 || end < start {
        bail!("Invalid line range {value:?}: expected START-END with 1 <= START <= END");
    }
    Ok((start, end))
}

/// Lines `start..=end` of `content`, clamped to what exists.
pub fn slice_lines(content: &str, start: usize, end: usize) -> String {
    content
        .lines()
        .skip(start.saturating_sub(1))
        .take(end.saturating_sub(start).saturating_add(1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Turn a library error into one carrying the user-facing message.
pub fn user_error(err: StudioError) -> anyhow::Error {
    anyhow::anyhow!(err.user_message())
}

pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn load_command_config(
    config_path: Option<&Path>,
    repo: Option<&RepoArgs>,
    llm: Option<&LlmArgs>,
) -> Result<Config> {
    let overrides = CliOverrides {
        model: llm.and_then(|l| l.model.clone()),
        max_output_tokens: llm.and_then(|l| l.max_output_tokens),
        temperature: llm.and_then(|l| l.temperature),
        exclude_globs: repo.and_then(|r| parse_csv(&r.exclude_glob)),
        fallback_to_demo: repo.filter(|r| r.fallback_demo).map(|_| true),
    };
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    resolve_config(&cwd, config_path, overrides)
}

/// Repository reference plus the host serving it.
pub fn repo_host(args: &RepoArgs, config: &Config) -> Result<(RepoRef, Arc<dyn RepoHost>)> {
    let repo: RepoRef = parse_repo_url(&args.url).map_err(user_error)?;
    if args.demo {
        return Ok((repo, Arc::new(DemoRepo::new())));
    }

    let github = GitHubClient::new(config).map_err(user_error)?;
    let host: Arc<dyn RepoHost> = if config.fallback_to_demo {
        Arc::new(WithFallback::new(github))
    } else {
        Arc::new(github)
    };
    Ok((repo, host))
}

pub async fn open_repo(args: &RepoArgs, config: &Config) -> Result<RepoContext> {
    let (repo, host) = repo_host(args, config)?;
    let exclude = build_exclude_globset(&config.exclude_globs);

    let pb = spinner(format!("Fetching file tree for {repo}..."));
    let result = RepoContext::analyze(host, repo, exclude.as_ref()).await;
    pb.finish_and_clear();
    result.map_err(user_error)
}

/// Open `path` in `ctx`, loading its content.
pub async fn open_file(ctx: &mut RepoContext, path: &str) -> Result<Selection> {
    let id = match find_by_path(ctx.tree(), path) {
        Some(file) => file.id.to_string(),
        None => bail!("No file {path:?} in {}", ctx.repo()),
    };
    let pb = spinner(format!("Loading {path}..."));
    let result = ctx.select_file(&id).await;
    pb.finish_and_clear();
    result.map_err(user_error)
}

pub fn llm_client(config: &Config) -> Result<LlmClient> {
    LlmClient::from_config(config).map_err(|e| {
        anyhow::anyhow!(
            "{}. Set GEMINI_API_KEY or gemini_api_key in studioflow.toml to use AI features.",
            e.message
        )
    })
}
