//! Content fingerprinting.
//!
//! A fingerprint is the SHA-256 hex digest of the variant's fingerprint
//! fields concatenated in registry order, with absent fields contributing
//! the empty string. No separator is inserted between fields, so
//! `("ab", "c")` and `("a", "bc")` collide. Existing stored fingerprints
//! depend on this exact formula.

use sha2::{Digest, Sha256};

use crate::event::EventContent;
use crate::variant::VariantRegistry;

/// Compute the fingerprint of `content`.
///
/// Returns `None` for variants without a fingerprint formula.
pub fn fingerprint(content: &EventContent) -> Option<String> {
    let fields = VariantRegistry::global()
        .spec(content.kind())
        .fingerprint_fields?;

    let mut hasher = Sha256::new();
    for name in fields {
        let part = content
            .field(name)
            .and_then(|f| f.as_text())
            .unwrap_or_default();
        hasher.update(part.as_bytes());
    }
    Some(hex::encode(hasher.finalize()))
}

/// SHA-256 hex digest of raw bytes, as used for attachment content.
pub fn content_digest(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
