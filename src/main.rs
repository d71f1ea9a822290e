//! studioflow: explore GitHub repositories with on-demand file loading and
//! LLM-generated explanations.

use anyhow::Result;

fn main() -> Result<()> {
    studioflow::cli::run()
}
