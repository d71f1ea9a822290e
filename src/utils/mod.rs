//! Small helpers shared by the fetch, store and CLI layers

pub mod encoding;
pub mod format;
pub mod hashing;
pub mod paths;

pub use encoding::{decode_bytes, looks_binary};
pub use format::{format_file_size, format_with_commas};
pub use hashing::stable_key;
pub use paths::{file_name, language_for_path, normalize_path};
