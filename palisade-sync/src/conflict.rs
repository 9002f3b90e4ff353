//! Cross-device write conflict detection
//!
//! Version wins; on equal versions the later timestamp wins; when both
//! are indistinguishable the conflict is surfaced as pending rather
//! than silently resolved.

use crate::payload::{SyncDataType, SyncPayload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a conflict between a local and a remote payload was, or was not,
/// resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictResolution {
    /// The local payload stands
    KeepLocal,
    /// The remote payload supersedes the local one
    KeepRemote,
    /// Resolved externally by merging both payloads
    Merge,
    /// Indistinguishable; requires external resolution
    Pending,
}

/// Pick a winner between two payloads for the same logical record.
///
/// Never returns [`ConflictResolution::Merge`]; that variant records
/// decisions made by an external resolver.
pub fn resolve_conflict(local: &SyncPayload, remote: &SyncPayload) -> ConflictResolution {
    if remote.version() != local.version() {
        return if remote.version() > local.version() {
            ConflictResolution::KeepRemote
        } else {
            ConflictResolution::KeepLocal
        };
    }

    if remote.is_newer_than(local) {
        return ConflictResolution::KeepRemote;
    }
    if local.is_newer_than(remote) {
        return ConflictResolution::KeepLocal;
    }

    // Same version and timestamp. Identical content is no conflict at
    // all; divergent content never gets a silent winner.
    if local.checksum() == remote.checksum() {
        ConflictResolution::KeepLocal
    } else {
        ConflictResolution::Pending
    }
}

/// A contested or resolved pair of payloads for one logical record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConflict {
    payload_id: Uuid,
    data_type: SyncDataType,
    resolution: ConflictResolution,
    local_timestamp: DateTime<Utc>,
    remote_timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    local_payload: Option<SyncPayload>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    remote_payload: Option<SyncPayload>,
}

impl SyncConflict {
    /// Compare two payloads for the same logical record.
    ///
    /// Pending conflicts keep both payloads attached so the caller can
    /// resolve them; decided conflicts carry metadata only.
    pub fn between(local: &SyncPayload, remote: &SyncPayload) -> Self {
        let resolution = resolve_conflict(local, remote);
        let pending = resolution == ConflictResolution::Pending;
        Self {
            payload_id: remote.id(),
            data_type: remote.data_type(),
            resolution,
            local_timestamp: local.timestamp(),
            remote_timestamp: remote.timestamp(),
            local_payload: pending.then(|| local.clone()),
            remote_payload: pending.then(|| remote.clone()),
        }
    }

    /// Id of the contested incoming payload
    pub fn payload_id(&self) -> Uuid {
        self.payload_id
    }

    /// Channel the contested record belongs to
    pub fn data_type(&self) -> SyncDataType {
        self.data_type
    }

    /// Outcome of the comparison
    pub fn resolution(&self) -> ConflictResolution {
        self.resolution
    }

    /// Timestamp of the local payload
    pub fn local_timestamp(&self) -> DateTime<Utc> {
        self.local_timestamp
    }

    /// Timestamp of the remote payload
    pub fn remote_timestamp(&self) -> DateTime<Utc> {
        self.remote_timestamp
    }

    /// Local payload, attached for pending conflicts
    pub fn local_payload(&self) -> Option<&SyncPayload> {
        self.local_payload.as_ref()
    }

    /// Remote payload, attached for pending conflicts
    pub fn remote_payload(&self) -> Option<&SyncPayload> {
        self.remote_payload.as_ref()
    }

    /// True when external resolution is required
    pub fn is_pending(&self) -> bool {
        self.resolution == ConflictResolution::Pending
    }
}
