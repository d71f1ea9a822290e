//! Annotate command: per-line notes stored in the local data directory.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use super::utils::{load_command_config, open_file, open_repo, runtime, user_error, RepoArgs};
use crate::fetch::parse_repo_url;
use crate::store::{data_dir, AnnotationStore, DATA_DIR_ENV};

#[derive(Args)]
pub struct AnnotateArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// File the annotations belong to
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Add an annotation with this text (requires --line)
    #[arg(long, value_name = "TEXT", requires = "line", conflicts_with_all = ["remove", "export"])]
    pub add: Option<String>,

    /// Line the new annotation refers to (1-based)
    #[arg(short, long, value_name = "N")]
    pub line: Option<u32>,

    /// Author shown next to the annotation
    #[arg(long, default_value = "anonymous")]
    pub author: String,

    /// Remove the annotation with this id
    #[arg(long, value_name = "ID", conflicts_with = "export")]
    pub remove: Option<String>,

    /// Print the file's annotations as a JSON document
    #[arg(long)]
    pub export: bool,
}

pub fn run(args: AnnotateArgs, config_path: Option<&Path>) -> Result<()> {
    let repo = parse_repo_url(&args.repo.url).map_err(user_error)?;
    let dir = require_data_dir()?;
    let mut store = AnnotationStore::open(&dir, &repo.url())?;

    if let Some(text) = &args.add {
        let line = args.line.context("--line is required with --add")?;
        check_line_exists(&args, config_path, line)?;
        let annotation = store.add(&args.path, line, &args.author, text)?.clone();
        store.save()?;
        println!("Added annotation {} on line {}", annotation.id, annotation.line);
        return Ok(());
    }

    if let Some(id) = &args.remove {
        if !store.remove(&args.path, id) {
            bail!("No annotation {id:?} on {}", args.path);
        }
        store.save()?;
        println!("Removed annotation {id}");
        return Ok(());
    }

    if args.export {
        let doc = store.export(&args.path);
        println!("{}", serde_json::to_string_pretty(&doc).context("Failed to serialize annotations")?);
        return Ok(());
    }

    let annotations = store.list(&args.path);
    if annotations.is_empty() {
        println!("No annotations on {}", args.path);
    }
    for a in annotations {
        let author = if a.author.is_empty() { "anonymous" } else { a.author.as_str() };
        println!(
            "{:>5}  {}  {} ({}, {})",
            a.line,
            a.id,
            a.text,
            author,
            a.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

fn require_data_dir() -> Result<PathBuf> {
    match data_dir() {
        Some(dir) => Ok(dir),
        None => bail!("Cannot determine a data directory; set {DATA_DIR_ENV}"),
    }
}

/// Load the file and reject lines past its end.
fn check_line_exists(args: &AnnotateArgs, config_path: Option<&Path>, line: u32) -> Result<()> {
    let config = load_command_config(config_path, Some(&args.repo), None)?;
    let rt = runtime()?;
    rt.block_on(async {
        let mut ctx = open_repo(&args.repo, &config).await?;
        let selection = open_file(&mut ctx, &args.path).await?;
        let count = selection.content.lines().count().max(1);
        if line as usize > count {
            bail!("{} has only {} lines", selection.path, count);
        }
        Ok(())
    })
}
