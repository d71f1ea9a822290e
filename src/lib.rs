//! StudioFlow library
//!
//! Fetches a public GitHub repository's file tree, loads file contents lazily
//! as they are selected, tracks exploration progress, and talks to the Gemini
//! API for overviews, explanations, summaries, suggestions and chat.

pub mod cli;
pub mod compare;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod llm;
pub mod session;
pub mod store;
pub mod tree;
pub mod utils;

pub use error::{StudioError, StudioResult};
