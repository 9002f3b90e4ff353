//! Error types for the sync protocol

use thiserror::Error;

/// Errors reported while building or consuming sync payloads
#[derive(Error, Debug)]
pub enum Error {
    /// Wire payload fields failed to decode
    #[error("Payload error: {0}")]
    Payload(String),

    /// Plaintext checksum did not match after decryption
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Underlying cryptographic failure
    #[error("{0}")]
    Crypto(#[from] palisade_crypto::Error),
}

/// Result type for sync operations
pub type Result<T> = std::result::Result<T, Error>;
