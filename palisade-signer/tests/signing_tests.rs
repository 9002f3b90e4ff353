//! End-to-end tests for the risk-gated signing flow
//!
//! Tests cover:
//! - Full pipeline in a clean environment through signature verification
//! - Gating on rooted devices, tampered binaries, and probe failures
//! - Stage ordering: assessment before validation before any key access
//! - Overlay strict mode engagement and release on every exit path
//! - Authentication freshness under the strict profile

use std::sync::Arc;
use std::time::Duration;

use palisade_crypto::MemorySecretStore;
use palisade_risk::probes::{
    DeviceIntegrityProbe, MockDeviceInspector, MockIntegritySource, MockOverlayMonitor,
    OverlayInjectionProbe, TamperDetectionProbe,
};
use palisade_risk::{RiskAssessmentEngine, SecurityConfig};
use palisade_signer::{
    Error, KeyVault, ReauthTracker, SecureTransactionSigner, SignedTransaction, TransactionData,
    MAX_GAS_PRICE_WEI,
};

const TEST_ITERATIONS: u32 = 1_000;
const AUTH_SECRET: &str = "correct horse battery staple";

fn empty_vault() -> KeyVault {
    KeyVault::new(Arc::new(MemorySecretStore::new())).with_kdf_iterations(TEST_ITERATIONS)
}

fn provisioned_vault() -> KeyVault {
    let vault = empty_vault();
    vault.provision(AUTH_SECRET).unwrap();
    vault
}

fn clean_engine(config: SecurityConfig) -> RiskAssessmentEngine {
    RiskAssessmentEngine::new(config.clone())
        .with_probe(Arc::new(
            DeviceIntegrityProbe::new(Arc::new(MockDeviceInspector::secure()))
                .with_hard_block(config.block_compromised),
        ))
        .with_probe(Arc::new(TamperDetectionProbe::new(Arc::new(
            MockIntegritySource::clean(),
        ))))
}

fn clean_signer() -> SecureTransactionSigner {
    SecureTransactionSigner::new(clean_engine(SecurityConfig::standard()), provisioned_vault())
}

fn sample_tx() -> TransactionData {
    TransactionData {
        to: "0x742d35cc6634c0532925a3b844bc9e7595f0beb1".to_string(),
        value: 1_000_000_000,
        gas_price: 30_000_000_000,
        gas_limit: 21_000,
        nonce: 3,
        data: None,
        chain_id: 1,
    }
}

// =============================================================================
// Clean path
// =============================================================================

#[tokio::test]
async fn test_sign_in_clean_environment() {
    let signer = clean_signer();
    let signed = signer
        .sign_transaction(&sample_tx(), AUTH_SECRET)
        .await
        .unwrap();

    assert!(signed.tx_hash().starts_with("0x"));
    assert_eq!(signed.tx_hash().len(), 66);
    assert_eq!(signed.transaction(), &sample_tx());

    // The attached assessment recorded a secure environment
    assert!(signed.security_context().is_secure());
    assert_eq!(signed.security_context().risk_percent(), 0);

    let public = signer.verifying_key(AUTH_SECRET).unwrap();
    signed.verify(&public).unwrap();
}

#[tokio::test]
async fn test_signed_record_survives_wire_roundtrip() {
    let signer = clean_signer();
    let signed = signer
        .sign_transaction(&sample_tx(), AUTH_SECRET)
        .await
        .unwrap();

    let json = serde_json::to_string(&signed).unwrap();
    let back: SignedTransaction = serde_json::from_str(&json).unwrap();

    assert_eq!(back.tx_hash(), signed.tx_hash());
    assert_eq!(back.signed_at(), signed.signed_at());
    back.verify(&signer.verifying_key(AUTH_SECRET).unwrap())
        .unwrap();
}

#[tokio::test]
async fn test_single_low_weight_signal_does_not_block() {
    // One weak indicator must not cross the threshold on its own
    let mut inspector = MockDeviceInspector::secure();
    inspector.signals.abnormal_symlinks = true;

    let engine = RiskAssessmentEngine::new(SecurityConfig::standard())
        .with_probe(Arc::new(
            DeviceIntegrityProbe::new(Arc::new(inspector)).with_hard_block(true),
        ))
        .with_probe(Arc::new(TamperDetectionProbe::new(Arc::new(
            MockIntegritySource::clean(),
        ))));
    let signer = SecureTransactionSigner::new(engine, provisioned_vault());

    let signed = signer
        .sign_transaction(&sample_tx(), AUTH_SECRET)
        .await
        .unwrap();
    assert!(signed.security_context().risk_score() > 0.0);
}

// =============================================================================
// Security gating
// =============================================================================

#[tokio::test]
async fn test_rooted_device_blocks_signing() {
    let engine = RiskAssessmentEngine::new(SecurityConfig::standard()).with_probe(Arc::new(
        DeviceIntegrityProbe::new(Arc::new(MockDeviceInspector::rooted())).with_hard_block(true),
    ));
    let signer = SecureTransactionSigner::new(engine, provisioned_vault());

    let err = signer
        .sign_transaction(&sample_tx(), AUTH_SECRET)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Security(_)));

    // Redacted summary: percentage and reasons, nothing else
    let message = err.to_string();
    assert!(message.contains("Risk"));
    assert!(message.contains('%'));
}

#[tokio::test]
async fn test_tampered_app_blocks_signing() {
    let engine = RiskAssessmentEngine::new(SecurityConfig::standard()).with_probe(Arc::new(
        TamperDetectionProbe::new(Arc::new(MockIntegritySource::resigned())),
    ));
    let signer = SecureTransactionSigner::new(engine, provisioned_vault());

    let err = signer
        .sign_transaction(&sample_tx(), AUTH_SECRET)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Security(_)));
}

#[tokio::test]
async fn test_probe_failure_fails_safe() {
    // A broken integrity source must block signing, not wave it through
    let engine = RiskAssessmentEngine::new(SecurityConfig::standard()).with_probe(Arc::new(
        TamperDetectionProbe::new(Arc::new(MockIntegritySource::failing("ipc broken"))),
    ));
    let signer = SecureTransactionSigner::new(engine, provisioned_vault());

    let err = signer
        .sign_transaction(&sample_tx(), AUTH_SECRET)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Security(_)));
    assert!(err.to_string().contains("Risk 100%"));
}

#[tokio::test]
async fn test_relaxed_profile_still_blocks_compromised_device() {
    let config = SecurityConfig::relaxed();
    let engine = RiskAssessmentEngine::new(config.clone()).with_probe(Arc::new(
        DeviceIntegrityProbe::new(Arc::new(MockDeviceInspector::rooted()))
            .with_hard_block(config.block_compromised),
    ));
    let signer = SecureTransactionSigner::new(engine, provisioned_vault());

    let err = signer
        .sign_transaction(&sample_tx(), AUTH_SECRET)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Security(_)));
}

// =============================================================================
// Stage ordering
// =============================================================================

#[tokio::test]
async fn test_assessment_runs_before_validation() {
    let engine = RiskAssessmentEngine::new(SecurityConfig::standard()).with_probe(Arc::new(
        DeviceIntegrityProbe::new(Arc::new(MockDeviceInspector::rooted())).with_hard_block(true),
    ));
    let signer = SecureTransactionSigner::new(engine, provisioned_vault());

    // Both the environment and the transaction are bad; the security
    // refusal must come first
    let mut tx = sample_tx();
    tx.to = "bogus".to_string();
    let err = signer.sign_transaction(&tx, AUTH_SECRET).await.unwrap_err();
    assert!(matches!(err, Error::Security(_)));
}

#[tokio::test]
async fn test_validation_runs_before_key_access() {
    let signer =
        SecureTransactionSigner::new(clean_engine(SecurityConfig::standard()), empty_vault());

    // Invalid transaction surfaces as a validation error, not a vault error
    let mut tx = sample_tx();
    tx.gas_price = MAX_GAS_PRICE_WEI + 1;
    let err = signer.sign_transaction(&tx, AUTH_SECRET).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    // A valid transaction then reaches the (empty) vault
    let err = signer
        .sign_transaction(&sample_tx(), AUTH_SECRET)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Vault(_)));
}

#[tokio::test]
async fn test_wrong_auth_secret_rejected() {
    let signer = clean_signer();
    let err = signer
        .sign_transaction(&sample_tx(), "not the secret")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Crypto(_)));
    assert_eq!(err.user_message(), "Authentication failed");
}

// =============================================================================
// Strict mode window
// =============================================================================

#[tokio::test]
async fn test_strict_mode_wraps_signing_window() {
    let monitor = Arc::new(MockOverlayMonitor::clear());
    let signer =
        SecureTransactionSigner::new(clean_engine(SecurityConfig::standard()), provisioned_vault())
            .with_overlay_monitor(Arc::clone(&monitor) as _);

    signer
        .sign_transaction(&sample_tx(), AUTH_SECRET)
        .await
        .unwrap();

    assert!(!monitor.strict_mode_enabled());
    assert_eq!(monitor.strict_mode_transitions(), vec![true, false]);
}

#[tokio::test]
async fn test_strict_mode_released_when_signing_fails() {
    let monitor = Arc::new(MockOverlayMonitor::clear());
    let signer =
        SecureTransactionSigner::new(clean_engine(SecurityConfig::standard()), empty_vault())
            .with_overlay_monitor(Arc::clone(&monitor) as _);

    let err = signer
        .sign_transaction(&sample_tx(), AUTH_SECRET)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Vault(_)));

    // The failure happened mid-flow, after strict mode was engaged
    assert!(!monitor.strict_mode_enabled());
    assert_eq!(monitor.strict_mode_transitions(), vec![true, false]);
}

#[tokio::test]
async fn test_overlay_attack_refused_before_strict_window_opens() {
    let monitor = Arc::new(MockOverlayMonitor::threatening(0.9, &["com.evil.overlay"]));
    let engine = RiskAssessmentEngine::new(SecurityConfig::standard()).with_probe(Arc::new(
        OverlayInjectionProbe::new(Arc::clone(&monitor) as _),
    ));
    let signer = SecureTransactionSigner::new(engine, provisioned_vault())
        .with_overlay_monitor(Arc::clone(&monitor) as _);

    let err = signer
        .sign_transaction(&sample_tx(), AUTH_SECRET)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Security(_)));

    // Refused at assessment; strict mode was never toggled
    assert!(monitor.strict_mode_transitions().is_empty());
}

// =============================================================================
// Authentication freshness
// =============================================================================

#[tokio::test]
async fn test_strict_profile_requires_recent_auth() {
    let signer =
        SecureTransactionSigner::new(clean_engine(SecurityConfig::strict()), provisioned_vault());

    let err = signer
        .sign_transaction(&sample_tx(), AUTH_SECRET)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Security(_)));
    assert!(err.to_string().contains("authentication required"));

    signer.reauth().record_authentication();
    signer
        .sign_transaction(&sample_tx(), AUTH_SECRET)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_expired_session_blocks_under_strict_profile() {
    let signer =
        SecureTransactionSigner::new(clean_engine(SecurityConfig::strict()), provisioned_vault())
            .with_reauth_tracker(ReauthTracker::with_validity(Duration::ZERO));

    signer.reauth().record_authentication();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let err = signer
        .sign_transaction(&sample_tx(), AUTH_SECRET)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Security(_)));
}

#[tokio::test]
async fn test_standard_profile_does_not_require_recent_auth() {
    let signer = clean_signer();
    assert!(!signer.reauth().is_session_valid());

    signer
        .sign_transaction(&sample_tx(), AUTH_SECRET)
        .await
        .unwrap();
}
