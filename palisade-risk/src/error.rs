//! Error types

/// Risk assessment errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Probe execution error (platform call failed or returned garbage)
    #[error("Probe error: {0}")]
    Probe(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
