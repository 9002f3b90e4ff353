//! Error types

/// Crypto errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Cryptography error (bad key/salt length, decode failure, tag mismatch)
    #[error("Cryptography error: {0}")]
    Cryptography(String),

    /// Secret store error
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
