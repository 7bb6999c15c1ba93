//! SHA-256 helpers shared by the attachment providers.

use sha2::{Digest, Sha256};

/// Hex digest of a payload.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Whether `reference` is a well-formed content address.
///
/// Providers reject anything else before touching storage, which also
/// keeps references from escaping the local root directory.
pub fn is_content_address(reference: &str) -> bool {
    reference.len() == 64 && reference.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
}
