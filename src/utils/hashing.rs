//! Stable hashing for storage keys

use sha2::{Digest, Sha256};

/// Hex SHA-256 of the trimmed input, truncated to 16 characters.
pub fn stable_key(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.trim().as_bytes());
    format!("{:x}", hasher.finalize())[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::stable_key;

    #[test]
    fn key_is_stable_and_trimmed() {
        assert_eq!(stable_key("https://github.com/o/r"), stable_key(" https://github.com/o/r\n"));
        assert_ne!(stable_key("https://github.com/o/r"), stable_key("https://github.com/o/s"));
        assert_eq!(stable_key("x").len(), 16);
    }
}
