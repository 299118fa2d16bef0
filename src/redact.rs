//! Log-safe identifiers for user text. Raw claims never reach the logs.

use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// First 6 bytes of the SHA-256 digest, hex encoded.
pub(crate) fn anon_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
