//! End-to-end encrypted multi-device sync for the Palisade wallet
//!
//! - Channel-separated sync keys derived from the wallet master
//!   secret, one per data type context
//! - Authenticated payload envelopes with plaintext checksums a
//!   keyless relay can compare
//! - Deterministic conflict resolution by version then timestamp;
//!   indistinguishable writes surface as pending instead of being
//!   silently resolved
//!
//! The relay sees only ciphertext, identifiers and checksums; record
//! content never leaves a device unencrypted.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod conflict;
pub mod error;
pub mod payload;
pub mod protocol;

pub use conflict::{resolve_conflict, ConflictResolution, SyncConflict};
pub use error::{Error, Result};
pub use payload::{SyncDataType, SyncPayload};
pub use protocol::{derive_sync_key, MergeOutcome, SyncProtocol, SyncStatus};
