//! Compare command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::Path;

use super::utils::{load_command_config, open_file, open_repo, runtime, RepoArgs};
use crate::compare::{line_differences, similarity, DISPLAY_LIMIT};

#[derive(Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// First file, relative to the repository root
    #[arg(value_name = "LEFT")]
    pub left: String,

    /// Second file, relative to the repository root
    #[arg(value_name = "RIGHT")]
    pub right: String,

    /// Print every difference as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: CompareArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_command_config(config_path, Some(&args.repo), None)?;
    let rt = runtime()?;

    rt.block_on(async {
        let mut ctx = open_repo(&args.repo, &config).await?;
        let left = open_file(&mut ctx, &args.left).await?;
        let right = open_file(&mut ctx, &args.right).await?;

        let diffs = line_differences(&left.content, &right.content);
        let score = similarity(&left.content, &right.content);

        if args.json {
            let report = serde_json::json!({
                "left": left.path,
                "right": right.path,
                "similarity": score,
                "differences": diffs,
            });
            println!("{}", serde_json::to_string_pretty(&report).context("Failed to serialize comparison")?);
            return Ok(());
        }

        println!("--- {}", left.path);
        println!("+++ {}", right.path);
        for diff in diffs.iter().take(DISPLAY_LIMIT) {
            println!("@@ line {} @@", diff.line);
            println!("- {}", diff.left.as_deref().unwrap_or(""));
            println!("+ {}", diff.right.as_deref().unwrap_or(""));
        }
        if diffs.len() > DISPLAY_LIMIT {
            println!("... and {} more differences", diffs.len() - DISPLAY_LIMIT);
        }
        println!();
        println!("{} differing lines, {}% similar", diffs.len(), score);
        Ok(())
    })
}
