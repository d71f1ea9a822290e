//! Explore command: open files one at a time and watch exploration progress.

use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Select};
use std::path::Path;

use super::utils::{load_command_config, open_file, open_repo, runtime, spinner, user_error, RepoArgs};
use crate::fetch::{RepoContext, Selection};
use crate::tree::flatten_files;

#[derive(Args)]
pub struct ExploreArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Open these files and exit instead of prompting (repeatable)
    #[arg(long, value_name = "PATH")]
    pub open: Vec<String>,

    /// Print only the first N lines of each opened file
    #[arg(long, value_name = "N")]
    pub head: Option<usize>,
}

pub fn run(args: ExploreArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_command_config(config_path, Some(&args.repo), None)?;
    let rt = runtime()?;

    rt.block_on(async {
        let mut ctx = open_repo(&args.repo, &config).await?;

        if !args.open.is_empty() {
            for path in &args.open {
                let selection = open_file(&mut ctx, path).await?;
                print_selection(&selection, args.head);
            }
            print_progress(&ctx);
            return Ok(());
        }

        loop {
            let files: Vec<(String, String)> = flatten_files(ctx.tree())
                .into_iter()
                .map(|f| (f.id.to_string(), f.path))
                .collect();
            let mut items: Vec<String> = files
                .iter()
                .map(|(id, path)| {
                    if ctx.visited().contains(id) {
                        format!("{path} ✓")
                    } else {
                        path.clone()
                    }
                })
                .collect();
            items.push("Refresh listing".to_string());
            items.push("Quit".to_string());

            let prompt = format!("{} ({}% explored)", ctx.repo(), ctx.progress());
            let choice = Select::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt)
                .default(0)
                .items(&items)
                .interact_opt()?;

            match choice {
                Some(idx) if idx < files.len() => {
                    let pb = spinner(format!("Loading {}...", files[idx].1));
                    let result = ctx.select_file(&files[idx].0).await;
                    pb.finish_and_clear();
                    match result {
                        Ok(selection) => print_selection(&selection, args.head),
                        Err(e) => eprintln!("Error: {}", e.user_message()),
                    }
                }
                Some(idx) if idx == files.len() => {
                    let exclude = crate::tree::build_exclude_globset(&config.exclude_globs);
                    let repo = ctx.repo().clone();
                    ctx.reanalyze(repo, exclude.as_ref()).await.map_err(user_error)?;
                }
                _ => break,
            }
        }
        print_progress(&ctx);
        Ok(())
    })
}

fn print_selection(selection: &Selection, head: Option<usize>) {
    println!("==> {} <==", selection.path);
    match head {
        Some(n) => {
            for line in selection.content.lines().take(n) {
                println!("{line}");
            }
        }
        None => println!("{}", selection.content),
    }
    println!();
}

fn print_progress(ctx: &RepoContext) {
    println!(
        "Explored {} of {} files ({}%)",
        ctx.visited().len(),
        ctx.total_files(),
        ctx.progress()
    );
}
