//! AES-256-GCM authenticated encryption
//!
//! Every encryption draws a fresh random 96-bit nonce. The GCM tag is
//! kept as a separate field so tampering with any of nonce, ciphertext
//! or tag fails decryption with a single opaque error.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use zeroize::Zeroizing;

use crate::{Error, KeyMaterial, Result};

/// AES-GCM nonce length in bytes
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes
pub const TAG_LEN: usize = 16;

/// Result of an authenticated encryption: nonce, ciphertext and tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBlob {
    iv: [u8; NONCE_LEN],
    ciphertext: Vec<u8>,
    tag: [u8; TAG_LEN],
}

impl EncryptedBlob {
    /// Reassemble a blob from its raw parts.
    pub fn from_parts(iv: &[u8], ciphertext: &[u8], tag: &[u8]) -> Result<Self> {
        let iv: [u8; NONCE_LEN] = iv
            .try_into()
            .map_err(|_| Error::Cryptography(format!("Invalid IV length: {}", iv.len())))?;
        let tag: [u8; TAG_LEN] = tag
            .try_into()
            .map_err(|_| Error::Cryptography(format!("Invalid tag length: {}", tag.len())))?;
        Ok(Self {
            iv,
            ciphertext: ciphertext.to_vec(),
            tag,
        })
    }

    /// Nonce used for this encryption
    pub fn iv(&self) -> &[u8; NONCE_LEN] {
        &self.iv
    }

    /// Ciphertext without the tag
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// GCM authentication tag
    pub fn tag(&self) -> &[u8; TAG_LEN] {
        &self.tag
    }

    /// Encode as base64 of `iv || ciphertext || tag` for storage or transport.
    pub fn encode(&self) -> String {
        let mut combined = Vec::with_capacity(NONCE_LEN + self.ciphertext.len() + TAG_LEN);
        combined.extend_from_slice(&self.iv);
        combined.extend_from_slice(&self.ciphertext);
        combined.extend_from_slice(&self.tag);
        STANDARD.encode(combined)
    }

    /// Decode a blob previously produced by [`encode`](Self::encode).
    pub fn decode(encoded: &str) -> Result<Self> {
        let combined = STANDARD
            .decode(encoded)
            .map_err(|e| Error::Cryptography(format!("Invalid base64: {}", e)))?;

        if combined.len() < NONCE_LEN + TAG_LEN {
            return Err(Error::Cryptography(format!(
                "Encrypted data too short: {} bytes",
                combined.len()
            )));
        }

        let tag_start = combined.len() - TAG_LEN;
        Self::from_parts(
            &combined[..NONCE_LEN],
            &combined[NONCE_LEN..tag_start],
            &combined[tag_start..],
        )
    }
}

/// Encrypt plaintext under a 256-bit key with a fresh random nonce.
pub fn encrypt(plaintext: &[u8], key: &KeyMaterial) -> Result<EncryptedBlob> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let mut iv = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut iv);
    let nonce = Nonce::from_slice(&iv);

    let mut sealed = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| Error::Cryptography("Encryption failed".to_string()))?;

    // aes-gcm appends the tag to the ciphertext; split it back out.
    let tag_start = sealed.len() - TAG_LEN;
    let tag: [u8; TAG_LEN] = sealed[tag_start..]
        .try_into()
        .map_err(|_| Error::Cryptography("Encryption produced malformed output".to_string()))?;
    sealed.truncate(tag_start);

    Ok(EncryptedBlob {
        iv,
        ciphertext: sealed,
        tag,
    })
}

/// Decrypt an [`EncryptedBlob`], verifying the authentication tag.
///
/// Any failure (wrong key, modified nonce, modified ciphertext, modified
/// tag) surfaces as the same opaque error.
pub fn decrypt(blob: &EncryptedBlob, key: &KeyMaterial) -> Result<Zeroizing<Vec<u8>>> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let nonce = Nonce::from_slice(&blob.iv);

    let mut sealed = Vec::with_capacity(blob.ciphertext.len() + TAG_LEN);
    sealed.extend_from_slice(&blob.ciphertext);
    sealed.extend_from_slice(&blob.tag);

    let plaintext = cipher.decrypt(nonce, sealed.as_ref()).map_err(|_| {
        Error::Cryptography("authentication failed (tampered data or wrong key)".to_string())
    })?;

    Ok(Zeroizing::new(plaintext))
}

/// Decrypt a base64-encoded blob in one step.
pub fn decrypt_encoded(encoded: &str, key: &KeyMaterial) -> Result<Zeroizing<Vec<u8>>> {
    let blob = EncryptedBlob::decode(encoded)?;
    decrypt(&blob, key)
}
