//! Encrypted at-rest storage for the wallet signing key
//!
//! The signing key never touches the secret store in plaintext. It is
//! wrapped with a key-encryption key derived from the user's auth secret,
//! and only ever unwrapped into zeroizing buffers.

use crate::error::{Error, Result};
use palisade_crypto::{
    decrypt_encoded, derive_key_with_iterations, encrypt, generate_salt, KeyMaterial, SecretStore,
    DEFAULT_KDF_ITERATIONS, WALLET_SIGNING_KEY, WALLET_SIGNING_KEY_SALT,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Manages the encrypted signing key inside a [`SecretStore`]
pub struct KeyVault {
    store: Arc<dyn SecretStore>,
    kdf_iterations: u32,
}

impl KeyVault {
    /// Create a vault over the given secret store with the default KDF
    /// work factor
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self {
            store,
            kdf_iterations: DEFAULT_KDF_ITERATIONS,
        }
    }

    /// Override the KDF work factor.
    ///
    /// Intended for tests, which would otherwise pay the full derivation
    /// cost on every unlock. Production callers keep the default.
    pub fn with_kdf_iterations(mut self, iterations: u32) -> Self {
        self.kdf_iterations = iterations;
        self
    }

    /// Whether a signing key has been provisioned
    pub fn is_provisioned(&self) -> Result<bool> {
        Ok(self.store.read(WALLET_SIGNING_KEY)?.is_some())
    }

    /// Generate a fresh signing key and store it wrapped under the auth
    /// secret.
    ///
    /// Fails if the vault already holds a key: provisioning must never
    /// silently overwrite existing key material.
    pub fn provision(&self, auth_secret: &str) -> Result<()> {
        if self.is_provisioned()? {
            return Err(Error::Vault("Key vault already provisioned".to_string()));
        }

        let signing_key = KeyMaterial::generate();
        let salt = generate_salt();
        let kek = derive_key_with_iterations(auth_secret, &salt, self.kdf_iterations)?;
        let blob = encrypt(signing_key.as_bytes(), &kek)?;

        self.store.write(WALLET_SIGNING_KEY_SALT, &hex::encode(salt))?;
        self.store.write(WALLET_SIGNING_KEY, &blob.encode())?;
        info!("Key vault provisioned");
        Ok(())
    }

    /// Decrypt the signing key using the auth secret.
    ///
    /// The returned material zeroizes on drop; callers must keep it scoped
    /// to the operation that needs it.
    pub fn unlock(&self, auth_secret: &str) -> Result<KeyMaterial> {
        let salt_hex = self.read_required(WALLET_SIGNING_KEY_SALT)?;
        let salt = hex::decode(&salt_hex)
            .map_err(|_| Error::Vault("Stored key salt is corrupted".to_string()))?;
        let kek = derive_key_with_iterations(auth_secret, &salt, self.kdf_iterations)?;

        let encoded = self.read_required(WALLET_SIGNING_KEY)?;
        let plaintext = decrypt_encoded(&encoded, &kek)?;
        let key = KeyMaterial::from_slice(&plaintext)?;
        debug!("Key vault unlocked");
        Ok(key)
    }

    /// Re-wrap the signing key under a new auth secret.
    ///
    /// The key itself is unchanged; a fresh salt is drawn so the old and
    /// new wrappings share nothing.
    pub fn rotate_auth_secret(&self, current: &str, new_secret: &str) -> Result<()> {
        let signing_key = self.unlock(current)?;

        let salt = generate_salt();
        let kek = derive_key_with_iterations(new_secret, &salt, self.kdf_iterations)?;
        let blob = encrypt(signing_key.as_bytes(), &kek)?;

        self.store.write(WALLET_SIGNING_KEY_SALT, &hex::encode(salt))?;
        self.store.write(WALLET_SIGNING_KEY, &blob.encode())?;
        info!("Key vault auth secret rotated");
        Ok(())
    }

    /// Remove the wrapped key and its salt from the store.
    ///
    /// Idempotent: destroying an empty vault succeeds.
    pub fn destroy(&self) -> Result<()> {
        self.store.delete(WALLET_SIGNING_KEY)?;
        self.store.delete(WALLET_SIGNING_KEY_SALT)?;
        info!("Key vault destroyed");
        Ok(())
    }

    fn read_required(&self, key: &str) -> Result<String> {
        self.store
            .read(key)?
            .ok_or_else(|| Error::Vault("Key vault not provisioned".to_string()))
    }
}
