//! Versioned encrypted sync payloads

use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use palisade_crypto::EncryptedBlob;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Logical channels that can be synchronized between devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncDataType {
    /// Wallet settings
    Settings,
    /// Address book entries
    AddressBook,
    /// Transaction history
    Transactions,
    /// Audit log entries
    AuditLog,
    /// Known paired devices
    DeviceRegistry,
}

impl SyncDataType {
    /// Channel name exactly as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            SyncDataType::Settings => "settings",
            SyncDataType::AddressBook => "addressBook",
            SyncDataType::Transactions => "transactions",
            SyncDataType::AuditLog => "auditLog",
            SyncDataType::DeviceRegistry => "deviceRegistry",
        }
    }
}

/// One end-to-end encrypted unit of synchronized state.
///
/// Immutable once constructed; a higher version supersedes an older one
/// on the same channel. The checksum covers the plaintext, so parties
/// that never hold the key can still compare record content across
/// devices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
    id: Uuid,
    data_type: SyncDataType,
    encrypted_data: String,
    iv: String,
    auth_tag: String,
    version: u64,
    timestamp: DateTime<Utc>,
    device_id: String,
    checksum: String,
}

impl SyncPayload {
    pub(crate) fn from_blob(
        blob: &EncryptedBlob,
        data_type: SyncDataType,
        version: u64,
        device_id: &str,
        checksum: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            data_type,
            encrypted_data: STANDARD.encode(blob.ciphertext()),
            iv: STANDARD.encode(blob.iv()),
            auth_tag: STANDARD.encode(blob.tag()),
            version,
            timestamp: Utc::now(),
            device_id: device_id.to_string(),
            checksum,
        }
    }

    /// Unique id of this payload instance
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Channel this payload belongs to
    pub fn data_type(&self) -> SyncDataType {
        self.data_type
    }

    /// Base64 ciphertext
    pub fn encrypted_data(&self) -> &str {
        &self.encrypted_data
    }

    /// Base64 nonce
    pub fn iv(&self) -> &str {
        &self.iv
    }

    /// Base64 authentication tag
    pub fn auth_tag(&self) -> &str {
        &self.auth_tag
    }

    /// Record version, monotonically increasing per channel
    pub fn version(&self) -> u64 {
        self.version
    }

    /// When this payload was constructed (UTC)
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Device that produced this payload
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Hex SHA-256 checksum of the plaintext
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// Decode the wire fields back into an encrypted blob
    pub fn envelope(&self) -> Result<EncryptedBlob> {
        let iv = STANDARD
            .decode(&self.iv)
            .map_err(|e| Error::Payload(format!("Invalid IV encoding: {e}")))?;
        let ciphertext = STANDARD
            .decode(&self.encrypted_data)
            .map_err(|e| Error::Payload(format!("Invalid ciphertext encoding: {e}")))?;
        let tag = STANDARD
            .decode(&self.auth_tag)
            .map_err(|e| Error::Payload(format!("Invalid tag encoding: {e}")))?;
        Ok(EncryptedBlob::from_parts(&iv, &ciphertext, &tag)?)
    }

    /// True when this payload supersedes `other`: higher version, or same
    /// version with a later timestamp
    pub fn supersedes(&self, other: &SyncPayload) -> bool {
        self.version > other.version
            || (self.version == other.version && self.timestamp > other.timestamp)
    }

    /// Timestamp comparison used for equal-version conflicts
    pub fn is_newer_than(&self, other: &SyncPayload) -> bool {
        self.timestamp > other.timestamp
    }
}
