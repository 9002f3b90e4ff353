//! SHA-256 integrity checksums

use sha2::{Digest, Sha256};

/// Compute the lowercase hex SHA-256 digest of `data`.
pub fn checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Verify that `data` hashes to `expected` (case-insensitive hex).
pub fn verify_checksum(data: &[u8], expected: &str) -> bool {
    checksum(data) == expected.to_lowercase()
}
