//! Transaction payloads, canonical encoding, and signed records

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use palisade_risk::SecurityAssessment;
use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

/// Version byte prepended to the canonical encoding
pub const ENCODING_VERSION: u8 = 1;

/// Unsigned transaction fields as supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionData {
    /// Recipient address, `0x` followed by 40 hex digits
    pub to: String,
    /// Transfer amount in the smallest unit
    pub value: i128,
    /// Gas price in wei
    pub gas_price: u64,
    /// Gas limit for execution
    pub gas_limit: u64,
    /// Account nonce
    pub nonce: u64,
    /// Optional contract call data
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<Vec<u8>>,
    /// Chain the transaction is bound to
    pub chain_id: u64,
}

impl TransactionData {
    /// Serialize to the canonical byte layout that gets signed.
    ///
    /// Layout:
    /// - version byte
    /// - recipient length (4 bytes LE) + recipient UTF-8 bytes
    /// - value (16 bytes LE)
    /// - gas price (8 bytes LE)
    /// - gas limit (8 bytes LE)
    /// - nonce (8 bytes LE)
    /// - call data length (4 bytes LE, zero when absent) + call data bytes
    /// - chain id (8 bytes LE)
    ///
    /// Every field is length-delimited or fixed-width, so two distinct
    /// transactions cannot share an encoding.
    pub fn canonical_encoding(&self) -> Vec<u8> {
        let data = self.data.as_deref().unwrap_or(&[]);
        let mut out = Vec::with_capacity(1 + 4 + self.to.len() + 16 + 8 + 8 + 8 + 4 + data.len() + 8);
        out.push(ENCODING_VERSION);
        out.extend_from_slice(&(self.to.len() as u32).to_le_bytes());
        out.extend_from_slice(self.to.as_bytes());
        out.extend_from_slice(&self.value.to_le_bytes());
        out.extend_from_slice(&self.gas_price.to_le_bytes());
        out.extend_from_slice(&self.gas_limit.to_le_bytes());
        out.extend_from_slice(&self.nonce.to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
        out.extend_from_slice(&self.chain_id.to_le_bytes());
        out
    }

    /// Keccak-256 digest of the canonical encoding.
    ///
    /// This is the 32-byte message that actually gets signed.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Keccak256::new();
        hasher.update(self.canonical_encoding());
        hasher.finalize().into()
    }
}

/// A signed transaction together with the security context it was signed under
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    transaction: TransactionData,
    signature: String,
    tx_hash: String,
    signed_at: DateTime<Utc>,
    security_context: SecurityAssessment,
}

impl SignedTransaction {
    /// Assemble a signed record from a compact ECDSA signature.
    ///
    /// The transaction hash commits to both the canonical encoding and the
    /// signature bytes, so any post-signing mutation is detectable.
    pub fn new(
        transaction: TransactionData,
        signature: [u8; 64],
        security_context: SecurityAssessment,
    ) -> Self {
        let mut hasher = Keccak256::new();
        hasher.update(transaction.canonical_encoding());
        hasher.update(signature);
        let tx_hash = format!("0x{}", hex::encode(hasher.finalize()));

        Self {
            transaction,
            signature: hex::encode(signature),
            tx_hash,
            signed_at: Utc::now(),
            security_context,
        }
    }

    /// The transaction that was signed
    pub fn transaction(&self) -> &TransactionData {
        &self.transaction
    }

    /// Compact ECDSA signature, hex encoded (128 characters)
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Transaction hash, `0x` followed by 64 hex digits
    pub fn tx_hash(&self) -> &str {
        &self.tx_hash
    }

    /// When the signature was produced (UTC)
    pub fn signed_at(&self) -> DateTime<Utc> {
        self.signed_at
    }

    /// Security assessment that gated this signing
    pub fn security_context(&self) -> &SecurityAssessment {
        &self.security_context
    }

    /// Verify the signature against the given public key
    pub fn verify(&self, public_key: &PublicKey) -> Result<()> {
        let sig_bytes = hex::decode(&self.signature)
            .map_err(|e| Error::Signing(format!("Signature is not valid hex: {e}")))?;
        let sig = Signature::from_compact(&sig_bytes)
            .map_err(|e| Error::Signing(format!("Malformed signature: {e}")))?;
        let msg = Message::from_slice(&self.transaction.digest())
            .map_err(|e| Error::Signing(format!("Malformed digest: {e}")))?;

        let secp = Secp256k1::verification_only();
        secp.verify_ecdsa(&msg, &sig, public_key)
            .map_err(|_| Error::Signing("Signature does not match transaction".to_string()))
    }
}
