//! Core cryptography for the Palisade wallet
//!
//! - PBKDF2-HMAC-SHA256 key derivation from PINs/passwords
//! - AES-256-GCM authenticated encryption with per-message nonces
//! - SHA-256 integrity checksums
//! - Zeroizing key material and a platform secret store abstraction
//!
//! Everything that touches raw key bytes is wiped on drop.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod checksum;
pub mod cipher;
pub mod error;
pub mod kdf;
pub mod material;
pub mod store;

pub use checksum::{checksum, verify_checksum};
pub use cipher::{decrypt, decrypt_encoded, encrypt, EncryptedBlob, NONCE_LEN, TAG_LEN};
pub use error::{Error, Result};
pub use kdf::{
    derive_key, derive_key_with_iterations, derive_scoped_key, derive_scoped_key_with_iterations,
    generate_salt, DEFAULT_KDF_ITERATIONS, SALT_LEN,
};
pub use material::KeyMaterial;
pub use store::{
    MemorySecretStore, SecretStore, WALLET_BIOMETRIC_KEY_SALT, WALLET_MNEMONIC, WALLET_SIGNING_KEY,
    WALLET_SIGNING_KEY_SALT, WALLET_SYNC_KEY,
};
