//! Decoding of fetched file bytes into text.
//!
//! GitHub returns raw blob bytes; most are UTF-8 but some are UTF-16 with a
//! BOM or a legacy single-byte encoding. Decoding order:
//! - BOM detection (UTF-8, UTF-16 LE/BE)
//! - strict UTF-8
//! - chardetng guess, decoded with replacement characters

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

const SAMPLE_SIZE: usize = 8192;

/// Decode `bytes` to a `String`, returning the encoding label used.
pub fn decode_bytes(bytes: &[u8]) -> (String, &'static str) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        let label = if encoding == UTF_8 {
            "utf-8-sig"
        } else if encoding == UTF_16LE {
            "utf-16-le"
        } else if encoding == UTF_16BE {
            "utf-16-be"
        } else {
            encoding.name()
        };
        return (text.into_owned(), label);
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return (text.to_string(), "utf-8");
    }

    let mut detector = EncodingDetector::new();
    detector.feed(&bytes[..bytes.len().min(SAMPLE_SIZE)], true);
    let encoding = detector.guess(None, true);
    let (text, _, _) = encoding.decode(bytes);
    (text.into_owned(), encoding.name())
}

/// Null bytes or fewer than 70% printable bytes in the leading sample.
pub fn looks_binary(bytes: &[u8]) -> bool {
    let sample = &bytes[..bytes.len().min(SAMPLE_SIZE)];
    if sample.is_empty() {
        return false;
    }
    if sample.contains(&0) {
        return true;
    }
    let printable = sample
        .iter()
        .filter(|&&b| (32..=126).contains(&b) || b == 9 || b == 10 || b == 13 || b >= 0x80)
        .count();
    (printable as f64 / sample.len() as f64) < 0.70
}
