//! The hardened signing flow
//!
//! Signing is a staged pipeline: assess the environment, validate the
//! transaction, unwrap the key, sign, clear. Each stage can refuse and
//! nothing downstream of a refusal runs. The decrypted signing key exists
//! only inside the signing stage and zeroizes when that scope ends.

use crate::error::{Error, Result};
use crate::keyvault::KeyVault;
use crate::reauth::ReauthTracker;
use crate::transaction::{SignedTransaction, TransactionData};
use crate::validation::validate_transaction;
use palisade_crypto::KeyMaterial;
use palisade_risk::probes::{OverlayMonitor, StrictModeGuard};
use palisade_risk::{RiskAssessmentEngine, SecurityAssessment};
use secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Stages of the signing flow, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningStage {
    /// No signing in progress
    Idle,
    /// Running the pre-signing risk assessment
    AssessingRisk,
    /// Checking transaction fields and authentication freshness
    ValidatingTransaction,
    /// Unwrapping the signing key from the vault
    DecryptingKey,
    /// Producing the ECDSA signature
    Signing,
    /// Dropping decrypted key material
    ClearingKey,
    /// Flow finished
    Done,
}

impl SigningStage {
    /// Stage name as it appears in logs
    pub fn name(&self) -> &'static str {
        match self {
            SigningStage::Idle => "idle",
            SigningStage::AssessingRisk => "assessingRisk",
            SigningStage::ValidatingTransaction => "validatingTransaction",
            SigningStage::DecryptingKey => "decryptingKey",
            SigningStage::Signing => "signing",
            SigningStage::ClearingKey => "clearingKey",
            SigningStage::Done => "done",
        }
    }

    fn advance_to(&mut self, next: SigningStage) {
        debug!("Signing stage {} -> {}", self.name(), next.name());
        *self = next;
    }
}

/// A cleared security context for one sensitive operation.
///
/// Holding the context keeps overlay strict mode engaged when a monitor
/// is wired in. Dropping it releases the protection, on success and
/// failure paths alike.
pub struct SecureContext {
    assessment: SecurityAssessment,
    _strict: Option<StrictModeGuard>,
}

impl SecureContext {
    /// The assessment that cleared this context
    pub fn assessment(&self) -> &SecurityAssessment {
        &self.assessment
    }
}

/// Signs transactions once the device passes its security assessment
pub struct SecureTransactionSigner {
    engine: RiskAssessmentEngine,
    vault: KeyVault,
    reauth: ReauthTracker,
    overlay: Option<Arc<dyn OverlayMonitor>>,
    secp: Secp256k1<All>,
}

impl SecureTransactionSigner {
    /// Create a signer gating the given vault behind the given engine
    pub fn new(engine: RiskAssessmentEngine, vault: KeyVault) -> Self {
        Self {
            engine,
            vault,
            reauth: ReauthTracker::new(),
            overlay: None,
            secp: Secp256k1::new(),
        }
    }

    /// Wire in an overlay monitor so strict mode covers the signing window
    pub fn with_overlay_monitor(mut self, monitor: Arc<dyn OverlayMonitor>) -> Self {
        self.overlay = Some(monitor);
        self
    }

    /// Replace the default reauthentication tracker
    pub fn with_reauth_tracker(mut self, tracker: ReauthTracker) -> Self {
        self.reauth = tracker;
        self
    }

    /// The vault holding the wrapped signing key
    pub fn vault(&self) -> &KeyVault {
        &self.vault
    }

    /// The reauthentication tracker; callers record successful user
    /// authentications here
    pub fn reauth(&self) -> &ReauthTracker {
        &self.reauth
    }

    /// Run the risk assessment and, if the device is clear, open a secure
    /// context for a sensitive operation.
    ///
    /// Refusals carry only the redacted failure summary.
    pub async fn prepare_secure_context(&self) -> Result<SecureContext> {
        let assessment = self.engine.assess().await;
        if !assessment.is_safe_for_signing() {
            warn!("Signing refused: {}", assessment.failure_summary());
            return Err(Error::Security(assessment.failure_summary()));
        }

        let strict = match &self.overlay {
            Some(monitor) => Some(
                StrictModeGuard::engage(Arc::clone(monitor)).map_err(|e| {
                    Error::Security(format!("Could not engage overlay protection: {e}"))
                })?,
            ),
            None => None,
        };

        Ok(SecureContext {
            assessment,
            _strict: strict,
        })
    }

    /// Sign a transaction after the full gating sequence.
    ///
    /// Order is fixed: risk assessment, then field validation and
    /// authentication freshness, and only then key decryption. The
    /// decrypted key never leaves the signing block.
    pub async fn sign_transaction(
        &self,
        tx: &TransactionData,
        auth_secret: &str,
    ) -> Result<SignedTransaction> {
        let mut stage = SigningStage::Idle;

        stage.advance_to(SigningStage::AssessingRisk);
        let context = self.prepare_secure_context().await?;

        stage.advance_to(SigningStage::ValidatingTransaction);
        validate_transaction(tx)?;
        if self.engine.config().require_recent_auth && !self.reauth.is_session_valid() {
            return Err(Error::Security(
                "Recent authentication required before signing".to_string(),
            ));
        }

        stage.advance_to(SigningStage::DecryptingKey);
        let signature = {
            let key = self.vault.unlock(auth_secret)?;
            stage.advance_to(SigningStage::Signing);
            self.sign_digest(&tx.digest(), &key)?
            // key zeroizes here
        };

        stage.advance_to(SigningStage::ClearingKey);
        let signed = SignedTransaction::new(tx.clone(), signature, context.assessment().clone());

        stage.advance_to(SigningStage::Done);
        info!(
            "Transaction signed: {} (risk {}%)",
            signed.tx_hash(),
            signed.security_context().risk_percent()
        );
        Ok(signed)
    }

    /// Public key matching the vaulted signing key
    pub fn verifying_key(&self, auth_secret: &str) -> Result<PublicKey> {
        let key = self.vault.unlock(auth_secret)?;
        let secret = self.secret_key(&key)?;
        Ok(PublicKey::from_secret_key(&self.secp, &secret))
    }

    fn sign_digest(&self, digest: &[u8; 32], key: &KeyMaterial) -> Result<[u8; 64]> {
        let secret = self.secret_key(key)?;
        let msg = Message::from_slice(digest)
            .map_err(|e| Error::Signing(format!("Malformed digest: {e}")))?;
        Ok(self.secp.sign_ecdsa(&msg, &secret).serialize_compact())
    }

    fn secret_key(&self, key: &KeyMaterial) -> Result<SecretKey> {
        SecretKey::from_slice(key.as_bytes())
            .map_err(|e| Error::Signing(format!("Stored key is not a valid signing key: {e}")))
    }
}
