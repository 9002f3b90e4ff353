//! Symmetric key material with zeroization

use crate::{Error, Result};
use aes_gcm::aead::OsRng;
use rand::RngCore;
use std::fmt;
use zeroize::Zeroizing;

/// 256-bit symmetric key, zeroed on drop.
///
/// Every call path that derives or decrypts a key owns exactly one of
/// these; dropping it (including when a task is cancelled mid-await)
/// wipes the bytes.
#[derive(Clone)]
pub struct KeyMaterial {
    key: Zeroizing<[u8; 32]>,
}

impl KeyMaterial {
    /// Key length in bytes
    pub const LEN: usize = 32;

    /// Generate a new random key
    pub fn generate() -> Self {
        let mut key = [0u8; Self::LEN];
        OsRng.fill_bytes(&mut key);

        Self {
            key: Zeroizing::new(key),
        }
    }

    /// Create from raw key bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self {
            key: Zeroizing::new(bytes),
        }
    }

    /// Create from a byte slice, rejecting anything but a 32-byte key
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::LEN {
            return Err(Error::Cryptography(format!(
                "Invalid key length: expected {} bytes, got {}",
                Self::LEN,
                bytes.len()
            )));
        }

        let mut key = [0u8; Self::LEN];
        key.copy_from_slice(bytes);
        Ok(Self {
            key: Zeroizing::new(key),
        })
    }

    /// Get key bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.key
    }
}

/// Key bytes must never reach logs or panic output, so the impl is
/// hand-written to redact them.
impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KeyMaterial").field(&"[REDACTED]").finish()
    }
}
