//! Interactive chat about a repository.

use anyhow::{bail, Context, Result};
use clap::Args;
use console::style;
use std::future::Future;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::utils::{llm_client, load_command_config, open_repo, runtime, LlmArgs, RepoArgs};
use crate::llm::{CancelSignal, Role};
use crate::session::{Conversation, SessionState, Status};

#[derive(Args)]
pub struct ChatArgs {
    /// Repository to talk about; its file tree is sent as context
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// Use the bundled demo repository instead of GitHub
    #[arg(long, requires = "url")]
    pub demo: bool,

    /// Extra context prepended to every prompt
    #[arg(long, value_name = "TEXT")]
    pub context: Option<String>,

    /// Ask a single question, print the answer and exit
    #[arg(short, long, value_name = "QUESTION")]
    pub message: Option<String>,

    #[command(flatten)]
    pub llm: LlmArgs,
}

pub fn run(args: ChatArgs, config_path: Option<&Path>) -> Result<()> {
    let repo_args = args.url.clone().map(|url| RepoArgs {
        url,
        demo: args.demo,
        exclude_glob: None,
        fallback_demo: false,
    });
    let config = load_command_config(config_path, repo_args.as_ref(), Some(&args.llm))?;
    let client = llm_client(&config)?;
    let rt = runtime()?;

    rt.block_on(async {
        let mut context = args.context.clone().unwrap_or_default();
        if let Some(repo_args) = &repo_args {
            let ctx = open_repo(repo_args, &config).await?;
            if !context.is_empty() {
                context.push_str("\n\n");
            }
            context.push_str(&format!("Repository: {}\n\nFile tree:\n{}", ctx.repo().url(), ctx.render(usize::MAX)));
        }
        let context = (!context.is_empty()).then_some(context);

        let mut convo = Conversation::new(client);
        let cancel = convo.cancel_handle();
        let printed = AtomicUsize::new(0);
        let on_update = |state: &SessionState| print_partial(state, &printed);

        if let Some(message) = &args.message {
            let state = interruptible(convo.send(message, context.as_deref(), &on_update), &cancel).await;
            if state.status == Status::Error {
                bail!("{}", state.error.as_deref().unwrap_or("Request failed"));
            }
            finish_turn(state, &printed);
            return Ok(());
        }

        eprintln!(
            "{}",
            style("Type a question. /retry re-sends after an error, /quit exits. Ctrl-C stops a reply.").dim()
        );
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            eprint!("{} ", style(">").cyan().bold());
            std::io::stderr().flush().ok();

            let line = tokio::select! {
                line = lines.next_line() => line.context("Failed to read input")?,
                _ = tokio::signal::ctrl_c() => None,
            };
            let Some(line) = line else { break };
            let input = line.trim();

            let state = match input {
                "" => continue,
                "/quit" | "/exit" => break,
                "/retry" => {
                    if convo.state().status != Status::Error {
                        eprintln!("{}", style("Nothing to retry.").dim());
                        continue;
                    }
                    interruptible(convo.retry(context.as_deref(), &on_update), &cancel).await
                }
                _ => interruptible(convo.send(input, context.as_deref(), &on_update), &cancel).await,
            };
            finish_turn(state, &printed);
        }
        Ok(())
    })
}

/// Drive `fut` to completion, tripping `cancel` on Ctrl-C.
async fn interruptible<F: Future>(fut: F, cancel: &CancelSignal) -> F::Output {
    tokio::pin!(fut);
    loop {
        tokio::select! {
            out = &mut fut => return out,
            signal = tokio::signal::ctrl_c() => {
                if signal.is_err() {
                    return fut.await;
                }
                cancel.cancel();
            }
        }
    }
}

/// Print whatever streamed text has not been printed yet.
fn print_partial(state: &SessionState, printed: &AtomicUsize) {
    if let Some(partial) = &state.partial {
        let done = printed.load(Ordering::Relaxed);
        if let Some(fresh) = partial.get(done..) {
            print!("{fresh}");
            std::io::stdout().flush().ok();
        }
        printed.store(partial.len(), Ordering::Relaxed);
    }
}

fn finish_turn(state: &SessionState, printed: &AtomicUsize) {
    let streamed = printed.swap(0, Ordering::Relaxed) > 0;
    match state.status {
        Status::Error => {
            if streamed {
                println!();
            }
            let message = state.error.as_deref().unwrap_or("Request failed");
            eprintln!("{} {}", style("error:").red().bold(), message);
            eprintln!("{}", style("Type /retry to try again.").dim());
        }
        _ => match state.messages.last() {
            Some(last) if last.role == Role::Assistant => {
                if !streamed {
                    print!("{}", last.content);
                }
                println!();
            }
            _ => {
                if streamed {
                    println!();
                }
                eprintln!("{}", style("(cancelled)").dim());
            }
        },
    }
}
