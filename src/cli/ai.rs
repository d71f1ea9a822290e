//! Explain, summarize and suggest commands.

use anyhow::{Context, Result};
use clap::Args;
use std::path::Path;

use super::utils::{
    llm_client, load_command_config, open_file, open_repo, parse_line_range, runtime, slice_lines,
    spinner, user_error, LlmArgs, RepoArgs,
};
use crate::llm::flows::{code_suggestions, explain_code, file_summary};
use crate::utils::{file_name, language_for_path};

#[derive(Args)]
pub struct ExplainArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    #[command(flatten)]
    pub llm: LlmArgs,

    /// File to explain, relative to the repository root
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Explain only these lines (START-END, 1-based)
    #[arg(short, long, value_name = "RANGE")]
    pub lines: Option<String>,
}

#[derive(Args)]
pub struct SummarizeArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    #[command(flatten)]
    pub llm: LlmArgs,

    /// File to summarize, relative to the repository root
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct SuggestArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    #[command(flatten)]
    pub llm: LlmArgs,

    /// File to review, relative to the repository root
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Language hint; guessed from the file extension when omitted
    #[arg(long)]
    pub language: Option<String>,

    /// Extra context for the reviewer
    #[arg(long, value_name = "TEXT")]
    pub context: Option<String>,

    /// Print the suggestions as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run_explain(args: ExplainArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_command_config(config_path, Some(&args.repo), Some(&args.llm))?;
    let client = llm_client(&config)?;
    let range = args.lines.as_deref().map(parse_line_range).transpose()?;
    let rt = runtime()?;

    rt.block_on(async {
        let mut ctx = open_repo(&args.repo, &config).await?;
        let selection = open_file(&mut ctx, &args.path).await?;
        let code = match range {
            Some((start, end)) => slice_lines(&selection.content, start, end),
            None => selection.content,
        };

        let pb = spinner(format!("Explaining {}...", args.path));
        let result = explain_code(&client, &code, &selection.path, &ctx.render(usize::MAX)).await;
        pb.finish_and_clear();
        println!("{}", result.map_err(user_error)?.explanation);
        Ok(())
    })
}

pub fn run_summarize(args: SummarizeArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_command_config(config_path, Some(&args.repo), Some(&args.llm))?;
    let client = llm_client(&config)?;
    let rt = runtime()?;

    rt.block_on(async {
        let mut ctx = open_repo(&args.repo, &config).await?;
        let selection = open_file(&mut ctx, &args.path).await?;
        let project = format!("Part of the {} repository", ctx.repo());

        let pb = spinner(format!("Summarizing {}...", args.path));
        let result = file_summary(
            &client,
            file_name(&selection.path),
            &selection.path,
            &selection.content,
            Some(&project),
        )
        .await;
        pb.finish_and_clear();
        let summary = result.map_err(user_error)?;

        if args.json {
            println!("{}", serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?);
            return Ok(());
        }
        println!("{}", summary.summary);
        println!();
        println!("Purpose:    {}", summary.purpose);
        println!("Complexity: {}", summary.complexity);
        if !summary.key_components.is_empty() {
            println!("Components: {}", summary.key_components.join(", "));
        }
        if !summary.tags.is_empty() {
            println!("Tags:       {}", summary.tags.join(", "));
        }
        Ok(())
    })
}

pub fn run_suggest(args: SuggestArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_command_config(config_path, Some(&args.repo), Some(&args.llm))?;
    let client = llm_client(&config)?;
    let rt = runtime()?;

    rt.block_on(async {
        let mut ctx = open_repo(&args.repo, &config).await?;
        let selection = open_file(&mut ctx, &args.path).await?;
        let language = args.language.as_deref().or_else(|| language_for_path(&selection.path));

        let pb = spinner(format!("Reviewing {}...", args.path));
        let result = code_suggestions(
            &client,
            &selection.content,
            &selection.path,
            language,
            args.context.as_deref(),
        )
        .await;
        pb.finish_and_clear();
        let review = result.map_err(user_error)?;

        if args.json {
            println!("{}", serde_json::to_string_pretty(&review).context("Failed to serialize suggestions")?);
            return Ok(());
        }
        println!("Overall quality: {}", review.overall_quality);
        println!("{}", review.summary);
        for (idx, suggestion) in review.suggestions.iter().enumerate() {
            println!();
            println!(
                "{}. [{}] {} ({})",
                idx + 1,
                suggestion.priority,
                suggestion.title,
                suggestion.kind
            );
            println!("   {}", suggestion.description);
            if let Some(example) = suggestion.example.as_deref().filter(|e| !e.is_empty()) {
                for line in example.lines() {
                    println!("   | {line}");
                }
            }
        }
        Ok(())
    })
}
