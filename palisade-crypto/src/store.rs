//! Platform secret store abstraction
//!
//! Native builds back this with the OS keystore (Android Keystore /
//! iOS Keychain); tests and headless tools use [`MemorySecretStore`].

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::Result;

/// Entry name for the encrypted mnemonic
pub const WALLET_MNEMONIC: &str = "wallet_mnemonic";
/// Entry name for the encrypted signing key
pub const WALLET_SIGNING_KEY: &str = "wallet_signing_key";
/// Entry name for the signing key KDF salt
pub const WALLET_SIGNING_KEY_SALT: &str = "wallet_signing_key_salt";
/// Entry name for the biometric unlock KDF salt
pub const WALLET_BIOMETRIC_KEY_SALT: &str = "wallet_biometric_key_salt";
/// Entry name for the device sync key
pub const WALLET_SYNC_KEY: &str = "wallet_sync_key";

/// Backend-agnostic secret storage.
///
/// Values are opaque strings; callers encrypt before writing anything
/// sensitive. Implementations must be safe to share across threads.
pub trait SecretStore: Send + Sync {
    /// Store a value under `key`, replacing any existing entry.
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Read the value stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Delete the entry under `key`. Deleting a missing entry is not an error.
    fn delete(&self, key: &str) -> Result<()>;
}

/// In-memory [`SecretStore`] for tests and non-persistent contexts.
#[derive(Default)]
pub struct MemorySecretStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySecretStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl SecretStore for MemorySecretStore {
    fn write(&self, key: &str, value: &str) -> Result<()> {
        debug!("Secret store write: {}", key);
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<()> {
        debug!("Secret store delete: {}", key);
        self.entries.write().remove(key);
        Ok(())
    }
}
