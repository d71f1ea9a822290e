//! Analyze command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::Path;

use super::utils::{llm_client, load_command_config, open_repo, runtime, spinner, user_error, LlmArgs, RepoArgs};
use crate::fetch::demo::DEMO_OVERVIEW;
use crate::llm::flows::project_overview;
use crate::utils::format_with_commas;

#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    #[command(flatten)]
    pub llm: LlmArgs,

    /// Print the tree as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Maximum folder depth to print
    #[arg(short, long, default_value_t = 4, value_name = "N")]
    pub depth: usize,

    /// Ask the model for an architecture overview of the repository
    #[arg(long)]
    pub overview: bool,
}

pub fn run(args: AnalyzeArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_command_config(config_path, Some(&args.repo), Some(&args.llm))?;
    let rt = runtime()?;

    rt.block_on(async {
        let ctx = open_repo(&args.repo, &config).await?;

        if args.json {
            let json = serde_json::to_string_pretty(ctx.tree()).context("Failed to serialize tree")?;
            println!("{json}");
        } else {
            println!("{}", ctx.render(args.depth));
            println!();
            println!(
                "{} files in {}",
                format_with_commas(ctx.total_files() as u64),
                ctx.repo().url()
            );
        }

        if args.overview {
            println!();
            if args.repo.demo {
                println!("{DEMO_OVERVIEW}");
                return Ok(());
            }
            let client = llm_client(&config)?;
            let pb = spinner("Generating project overview...");
            let structure = ctx.structure_json();
            let result = project_overview(&client, &ctx.repo().url(), Some(&structure)).await;
            pb.finish_and_clear();
            println!("{}", result.map_err(user_error)?.overview);
        }
        Ok(())
    })
}
