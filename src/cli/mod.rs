//! Command-line interface for studioflow
//!
//! Each subcommand resolves its config, builds a tokio runtime and drives the
//! library on it.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod ai;
mod analyze;
mod annotate;
mod chat;
mod compare;
mod explore;
mod settings;
mod utils;

/// Explore GitHub repositories and ask an LLM about their code
#[derive(Parser)]
#[command(name = "studioflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (TOML or YAML); defaults to studioflow.toml in the current directory
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a repository's file tree and print it
    Analyze(analyze::AnalyzeArgs),

    /// Browse a repository interactively, loading files on demand
    Explore(explore::ExploreArgs),

    /// Chat with the model about a repository
    Chat(chat::ChatArgs),

    /// Explain a file or a line range of it
    Explain(ai::ExplainArgs),

    /// Summarize a file's purpose and key components
    Summarize(ai::SummarizeArgs),

    /// Suggest improvements for a file
    Suggest(ai::SuggestArgs),

    /// Compare two files of a repository line by line
    Compare(compare::CompareArgs),

    /// List, add or remove line annotations on a file
    Annotate(annotate::AnnotateArgs),

    /// Show or change persisted preferences
    Settings(settings::SettingsArgs),

    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Analyze(args) => analyze::run(args, config),
        Commands::Explore(args) => explore::run(args, config),
        Commands::Chat(args) => chat::run(args, config),
        Commands::Explain(args) => ai::run_explain(args, config),
        Commands::Summarize(args) => ai::run_summarize(args, config),
        Commands::Suggest(args) => ai::run_suggest(args, config),
        Commands::Compare(args) => compare::run(args, config),
        Commands::Annotate(args) => annotate::run(args, config),
        Commands::Settings(args) => settings::run(args),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "studioflow", &mut std::io::stdout());
            Ok(())
        }
    }
}
