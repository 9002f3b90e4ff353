//! Risk-gated transaction signing for the Palisade wallet
//!
//! - Staged signing flow: risk assessment, field validation,
//!   authentication freshness, key decryption, signing, key clearing
//! - Signing key wrapped at rest inside a [`KeyVault`] and unwrapped
//!   only into zeroizing buffers scoped to the signing stage
//! - Overlay strict mode held by an RAII context for the whole
//!   sensitive window, released on every exit path
//! - Signed records carry the security assessment they were produced
//!   under, for audit
//!
//! Refusals surface redacted summaries only; key handling details never
//! appear in errors or logs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod keyvault;
pub mod reauth;
pub mod signer;
pub mod transaction;
pub mod validation;

pub use error::{Error, Result};
pub use keyvault::KeyVault;
pub use reauth::{ReauthTracker, DEFAULT_REAUTH_VALIDITY};
pub use signer::{SecureContext, SecureTransactionSigner, SigningStage};
pub use transaction::{SignedTransaction, TransactionData, ENCODING_VERSION};
pub use validation::{validate_address, validate_transaction, MAX_GAS_PRICE_WEI};

pub use secp256k1::PublicKey;
