//! SHA-256 digests (lowercase hex) for input and output bytes.

use sha2::{Digest, Sha256};

/// SHA-256 over raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
