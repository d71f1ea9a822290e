//! Shared plain-data types used across modules

mod config;
mod repo;

pub use config::{
    Config, DEFAULT_GEMINI_API_BASE, DEFAULT_GITHUB_API_BASE, DEFAULT_MAX_OUTPUT_TOKENS,
    DEFAULT_MODEL, MAX_OUTPUT_TOKENS_LIMIT,
};
pub use repo::RepoRef;
