//! End-to-end encrypted sync protocol
//!
//! Wraps wallet records in authenticated envelopes keyed per channel,
//! verifies plaintext checksums after decryption, and merges remote
//! state against local state without ever silently dropping a
//! contested record.

use std::collections::HashMap;

use palisade_crypto::{checksum, decrypt, derive_scoped_key, encrypt, verify_checksum, KeyMaterial};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::conflict::{resolve_conflict, ConflictResolution, SyncConflict};
use crate::error::{Error, Result};
use crate::payload::{SyncDataType, SyncPayload};

/// Outcome classification for one merge pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncStatus {
    /// Every incoming change applied cleanly
    Success,
    /// Nothing new to apply
    NoChanges,
    /// Some records applied, others were contested or rejected
    PartialSuccess,
    /// No record applied and at least one was rejected outright
    Failed,
    /// Every affected record is contested
    Conflict,
}

/// Result of merging a batch of remote payloads into local state
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    status: SyncStatus,
    applied: Vec<SyncPayload>,
    conflicts: Vec<SyncConflict>,
    rejected: Vec<Uuid>,
}

impl MergeOutcome {
    /// Overall classification of the merge
    pub fn status(&self) -> SyncStatus {
        self.status
    }

    /// Remote payloads that should replace or extend local state
    pub fn applied(&self) -> &[SyncPayload] {
        &self.applied
    }

    /// Contested records awaiting resolution
    pub fn conflicts(&self) -> &[SyncConflict] {
        &self.conflicts
    }

    /// Ids of remote payloads rejected as malformed
    pub fn rejected(&self) -> &[Uuid] {
        &self.rejected
    }
}

/// Derive a channel-separated sync key from the wallet master secret.
///
/// Different contexts yield unrelated keys, so compromising one sync
/// channel reveals nothing about the others.
pub fn derive_sync_key(master_secret: &str, salt: &[u8], context: &str) -> Result<KeyMaterial> {
    Ok(derive_scoped_key(master_secret, salt, context)?)
}

/// Encrypts outgoing records and merges incoming ones for one device
#[derive(Debug, Clone)]
pub struct SyncProtocol {
    device_id: String,
}

impl SyncProtocol {
    /// Create a protocol instance identified as `device_id` on the wire
    pub fn new(device_id: &str) -> Self {
        Self {
            device_id: device_id.to_string(),
        }
    }

    /// Identifier stamped on every outgoing payload
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Wrap a record in an encrypted sync payload.
    ///
    /// The checksum is computed over the plaintext before encryption,
    /// so a relay that never holds the key can still compare record
    /// content across devices.
    pub fn encrypt_payload(
        &self,
        data: &[u8],
        data_type: SyncDataType,
        sync_key: &KeyMaterial,
        version: u64,
    ) -> Result<SyncPayload> {
        let digest = checksum(data);
        let blob = encrypt(data, sync_key)?;
        let payload = SyncPayload::from_blob(&blob, data_type, version, &self.device_id, digest);
        debug!(
            "Encrypted {} payload {} v{} ({} bytes)",
            data_type.name(),
            payload.id(),
            version,
            data.len()
        );
        Ok(payload)
    }

    /// Recover and verify the plaintext of a sync payload.
    ///
    /// Authentication failures and checksum mismatches are both fatal;
    /// the plaintext is never returned unverified.
    pub fn decrypt_payload(
        &self,
        payload: &SyncPayload,
        sync_key: &KeyMaterial,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let blob = payload.envelope()?;
        let plaintext = decrypt(&blob, sync_key)?;
        if !verify_checksum(&plaintext, payload.checksum()) {
            return Err(Error::Integrity(format!(
                "Checksum mismatch after decryption for payload {}",
                payload.id()
            )));
        }
        Ok(plaintext)
    }

    /// Merge remote payloads against local state.
    ///
    /// Each data type is one logical record; only the latest payload on
    /// each side competes. Malformed remote payloads are rejected,
    /// decidable conflicts resolve by version then timestamp, and
    /// indistinguishable ones are surfaced for external resolution.
    pub fn merge_remote(&self, local: &[SyncPayload], remote: &[SyncPayload]) -> MergeOutcome {
        let local_latest = latest_per_channel(local);
        let remote_latest = latest_per_channel(remote);

        let mut applied = Vec::new();
        let mut conflicts = Vec::new();
        let mut rejected = Vec::new();

        for (data_type, candidate) in remote_latest {
            if let Err(e) = candidate.envelope() {
                warn!("Rejecting remote {} payload {}: {}", data_type.name(), candidate.id(), e);
                rejected.push(candidate.id());
                continue;
            }

            let Some(current) = local_latest.get(&data_type) else {
                debug!("Applying new {} payload {}", data_type.name(), candidate.id());
                applied.push(candidate.clone());
                continue;
            };

            match resolve_conflict(current, candidate) {
                ConflictResolution::KeepRemote => {
                    debug!(
                        "Applying {} payload {} over local v{}",
                        data_type.name(),
                        candidate.id(),
                        current.version()
                    );
                    applied.push(candidate.clone());
                }
                ConflictResolution::KeepLocal => {
                    debug!("Keeping local {} payload {}", data_type.name(), current.id());
                }
                ConflictResolution::Merge | ConflictResolution::Pending => {
                    conflicts.push(SyncConflict::between(current, candidate));
                }
            }
        }

        let status = classify(applied.len(), conflicts.len(), rejected.len());
        info!(
            "Sync merge: {} applied, {} contested, {} rejected -> {:?}",
            applied.len(),
            conflicts.len(),
            rejected.len(),
            status
        );
        MergeOutcome {
            status,
            applied,
            conflicts,
            rejected,
        }
    }
}

/// Reduce a payload list to the winning payload per data type
fn latest_per_channel(payloads: &[SyncPayload]) -> HashMap<SyncDataType, &SyncPayload> {
    let mut latest: HashMap<SyncDataType, &SyncPayload> = HashMap::new();
    for payload in payloads {
        latest
            .entry(payload.data_type())
            .and_modify(|current| {
                if payload.supersedes(current) {
                    *current = payload;
                }
            })
            .or_insert(payload);
    }
    latest
}

fn classify(applied: usize, contested: usize, rejected: usize) -> SyncStatus {
    match (applied > 0, contested > 0, rejected > 0) {
        (false, false, false) => SyncStatus::NoChanges,
        (true, false, false) => SyncStatus::Success,
        (false, true, false) => SyncStatus::Conflict,
        (false, false, true) => SyncStatus::Failed,
        _ => SyncStatus::PartialSuccess,
    }
}
