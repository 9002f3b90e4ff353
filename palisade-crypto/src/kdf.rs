//! PIN/password key derivation
//!
//! Stretches a short user secret into a 256-bit key with
//! PBKDF2-HMAC-SHA256 and a per-secret random salt.

use crate::{Error, KeyMaterial, Result};
use aes_gcm::aead::OsRng;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Salt length in bytes
pub const SALT_LEN: usize = 32;

/// Default PBKDF2 iteration count
pub const DEFAULT_KDF_ITERATIONS: u32 = 100_000;

/// Generate a cryptographically secure random 32-byte salt.
///
/// Generated once per secret and persisted alongside the encrypted blob;
/// immutable thereafter.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive a 256-bit key from a PIN/password using the default iteration count.
pub fn derive_key(secret: &str, salt: &[u8]) -> Result<KeyMaterial> {
    derive_key_with_iterations(secret, salt, DEFAULT_KDF_ITERATIONS)
}

/// Derive a 256-bit key with an explicit iteration count.
///
/// Deterministic: identical `(secret, salt, iterations)` always yields
/// the identical key.
pub fn derive_key_with_iterations(
    secret: &str,
    salt: &[u8],
    iterations: u32,
) -> Result<KeyMaterial> {
    derive_scoped_key_with_iterations(secret, salt, "", iterations)
}

/// Derive a key bound to a logical context.
///
/// The context bytes are folded into the salt, so two contexts never
/// share a key even when secret and salt are identical. An empty
/// context is equivalent to [`derive_key`].
pub fn derive_scoped_key(secret: &str, salt: &[u8], context: &str) -> Result<KeyMaterial> {
    derive_scoped_key_with_iterations(secret, salt, context, DEFAULT_KDF_ITERATIONS)
}

/// Context-bound derivation with an explicit iteration count.
pub fn derive_scoped_key_with_iterations(
    secret: &str,
    salt: &[u8],
    context: &str,
    iterations: u32,
) -> Result<KeyMaterial> {
    if salt.len() != SALT_LEN {
        return Err(Error::Cryptography(format!(
            "Invalid salt length: expected {} bytes, got {}",
            SALT_LEN,
            salt.len()
        )));
    }

    if iterations == 0 {
        return Err(Error::Cryptography(
            "Iteration count must be nonzero".to_string(),
        ));
    }

    let mut salted = Vec::with_capacity(salt.len() + context.len());
    salted.extend_from_slice(salt);
    salted.extend_from_slice(context.as_bytes());

    let mut key = Zeroizing::new([0u8; KeyMaterial::LEN]);
    pbkdf2_hmac::<Sha256>(secret.as_bytes(), &salted, iterations, &mut *key);

    Ok(KeyMaterial::from_bytes(*key))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Keep test iteration counts low; determinism is independent of the count.
    const TEST_ITERATIONS: u32 = 1_000;

    #[test]
    fn test_derive_key_deterministic() {
        let salt = [0x42u8; SALT_LEN];
        let k1 = derive_key_with_iterations("123456", &salt, TEST_ITERATIONS).unwrap();
        let k2 = derive_key_with_iterations("123456", &salt, TEST_ITERATIONS).unwrap();
        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_secret() {
        let salt = [0x42u8; SALT_LEN];
        let k1 = derive_key_with_iterations("123456", &salt, TEST_ITERATIONS).unwrap();
        let k2 = derive_key_with_iterations("654321", &salt, TEST_ITERATIONS).unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_salt() {
        let k1 = derive_key_with_iterations("123456", &[0x01; SALT_LEN], TEST_ITERATIONS).unwrap();
        let k2 = derive_key_with_iterations("123456", &[0x02; SALT_LEN], TEST_ITERATIONS).unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_derive_key_iteration_count_changes_key() {
        let salt = [0x42u8; SALT_LEN];
        let k1 = derive_key_with_iterations("123456", &salt, 1_000).unwrap();
        let k2 = derive_key_with_iterations("123456", &salt, 2_000).unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_derive_key_rejects_bad_salt_length() {
        assert!(derive_key_with_iterations("123456", &[0u8; 16], TEST_ITERATIONS).is_err());
        assert!(derive_key_with_iterations("123456", &[], TEST_ITERATIONS).is_err());
    }

    #[test]
    fn test_derive_key_rejects_zero_iterations() {
        let salt = [0x42u8; SALT_LEN];
        assert!(derive_key_with_iterations("123456", &salt, 0).is_err());
    }

    #[test]
    fn test_scoped_key_differs_by_context() {
        let salt = [0x42u8; SALT_LEN];
        let audit =
            derive_scoped_key_with_iterations("master", &salt, "audit_log", TEST_ITERATIONS)
                .unwrap();
        let registry =
            derive_scoped_key_with_iterations("master", &salt, "device_registry", TEST_ITERATIONS)
                .unwrap();
        assert_ne!(audit.as_bytes(), registry.as_bytes());
    }

    #[test]
    fn test_empty_context_matches_unscoped() {
        let salt = [0x42u8; SALT_LEN];
        let scoped = derive_scoped_key_with_iterations("master", &salt, "", TEST_ITERATIONS).unwrap();
        let plain = derive_key_with_iterations("master", &salt, TEST_ITERATIONS).unwrap();
        assert_eq!(scoped.as_bytes(), plain.as_bytes());
    }

    #[test]
    fn test_generate_salt_unique() {
        let s1 = generate_salt();
        let s2 = generate_salt();
        assert_ne!(s1, s2);
    }

    #[test]
    fn test_derived_key_not_all_zeros() {
        let salt = generate_salt();
        let key = derive_key_with_iterations("pin", &salt, TEST_ITERATIONS).unwrap();
        assert!(key.as_bytes().iter().any(|&b| b != 0));
    }
}
