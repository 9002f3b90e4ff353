//! Error types for secure transaction signing

use thiserror::Error;

/// Errors reported by the signing pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Transaction failed field validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Signing blocked by the device security posture
    #[error("Security error: {0}")]
    Security(String),

    /// Key vault state problem (not provisioned, double provision, corrupted entry)
    #[error("Key vault error: {0}")]
    Vault(String),

    /// Signature construction failed
    #[error("Signing error: {0}")]
    Signing(String),

    /// Underlying cryptographic failure
    #[error("{0}")]
    Crypto(#[from] palisade_crypto::Error),
}

/// Result type for signer operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True when the error is actionable by the user rather than a defect
    pub fn is_user_error(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Security(_))
    }

    /// Short message safe to surface in the UI.
    ///
    /// Security rejections already carry a redacted summary; vault and
    /// crypto errors collapse to generic messages so key handling details
    /// stay out of the interface.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(msg) => msg.clone(),
            Error::Security(msg) => format!("Signing blocked: {msg}"),
            Error::Vault(_) => "Wallet key unavailable".to_string(),
            Error::Crypto(_) => "Authentication failed".to_string(),
            Error::Signing(_) => "Signing failed".to_string(),
        }
    }
}
