//! Tamper detection probe
//!
//! Checks the installed app against its expected identity: signing
//! certificate, code-integrity hash, attached debugger, emulator
//! execution, and hooking frameworks. A signature or code-hash mismatch
//! is critical and forces rejection on its own, independent of the
//! aggregate score.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::{
    assessment::SecurityCheckResult,
    probe::{ProbeKind, SecurityProbe},
    Error, Result,
};

/// Check name reported by this probe
pub const TAMPER_DETECTION_CHECK: &str = "tamper_detection";

/// Severity: signing identity does not match the expected value
pub const SEVERITY_SIGNATURE_MISMATCH: f64 = 1.0;

/// Severity: code-integrity hash does not match
pub const SEVERITY_CODE_HASH_MISMATCH: f64 = 0.9;

/// Severity: hooking framework present
pub const SEVERITY_HOOKING_FRAMEWORK: f64 = 0.8;

/// Severity: debugger attached
pub const SEVERITY_DEBUGGER: f64 = 0.7;

/// Severity: running inside an emulator
pub const SEVERITY_EMULATOR: f64 = 0.4;

/// Summed severity at which the app counts as tampered
pub const TAMPER_THRESHOLD: f64 = 0.3;

/// Raw integrity signals from the platform source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegritySignals {
    /// App signing identity matches the expected value
    pub signature_matches: bool,
    /// Code-integrity hash matches
    pub code_hash_matches: bool,
    /// A debugger is attached to the process
    pub debugger_attached: bool,
    /// Running inside an emulator
    pub emulator_detected: bool,
    /// A hooking framework is present
    pub hooking_framework_detected: bool,
}

impl Default for IntegritySignals {
    /// Untampered app: identity intact, nothing attached.
    fn default() -> Self {
        Self {
            signature_matches: true,
            code_hash_matches: true,
            debugger_attached: false,
            emulator_detected: false,
            hooking_framework_detected: false,
        }
    }
}

/// Detailed tamper inspection outcome
#[derive(Debug, Clone)]
pub struct TamperReport {
    /// Whether the summed severity crossed [`TAMPER_THRESHOLD`]
    pub tampered: bool,
    /// Summed severity in `[0, 1]`
    pub severity: f64,
    /// Indicators that fired, human-readable
    pub indicators: Vec<String>,
}

/// Platform adapter collecting raw app-integrity signals
#[async_trait]
pub trait AppIntegritySource: Send + Sync {
    /// Collect raw integrity signals.
    async fn inspect(&self) -> Result<IntegritySignals>;
}

/// App tamper detection probe
pub struct TamperDetectionProbe {
    source: Arc<dyn AppIntegritySource>,
}

impl TamperDetectionProbe {
    /// Create a probe over a platform integrity source.
    pub fn new(source: Arc<dyn AppIntegritySource>) -> Self {
        Self { source }
    }

    /// Inspect the app and score its integrity.
    pub async fn report(&self) -> Result<TamperReport> {
        let signals = self.source.inspect().await?;
        Ok(score(&signals))
    }
}

/// Fold signals into a summed severity and tamper verdict.
fn score(signals: &IntegritySignals) -> TamperReport {
    let mut severity = 0.0;
    let mut indicators = Vec::new();

    if !signals.signature_matches {
        severity += SEVERITY_SIGNATURE_MISMATCH;
        indicators.push("App signature mismatch".to_string());
    }
    if !signals.code_hash_matches {
        severity += SEVERITY_CODE_HASH_MISMATCH;
        indicators.push("Code integrity hash mismatch".to_string());
    }
    if signals.hooking_framework_detected {
        severity += SEVERITY_HOOKING_FRAMEWORK;
        indicators.push("Hooking framework detected".to_string());
    }
    if signals.debugger_attached {
        severity += SEVERITY_DEBUGGER;
        indicators.push("Debugger attached".to_string());
    }
    if signals.emulator_detected {
        severity += SEVERITY_EMULATOR;
        indicators.push("Emulator execution detected".to_string());
    }

    let severity = severity.min(1.0);
    TamperReport {
        tampered: severity >= TAMPER_THRESHOLD,
        severity,
        indicators,
    }
}

#[async_trait]
impl SecurityProbe for TamperDetectionProbe {
    fn name(&self) -> &str {
        TAMPER_DETECTION_CHECK
    }

    fn kind(&self) -> ProbeKind {
        ProbeKind::TamperDetection
    }

    async fn run(&self) -> Result<SecurityCheckResult> {
        let report = self.report().await?;

        if report.tampered {
            warn!(
                "App tampering detected (severity {:.2}): {}",
                report.severity,
                report.indicators.join(", ")
            );
            Ok(SecurityCheckResult::failed(
                TAMPER_DETECTION_CHECK,
                format!("App tampering: {}", report.indicators.join(", ")),
                report.severity,
            ))
        } else if report.severity > 0.0 {
            Ok(SecurityCheckResult::passed_with_signal(
                TAMPER_DETECTION_CHECK,
                report.severity,
            ))
        } else {
            Ok(SecurityCheckResult::passed(TAMPER_DETECTION_CHECK))
        }
    }
}

/// Test integrity source returning fixed signals
pub struct MockIntegritySource {
    /// Signals returned by `inspect`
    pub signals: IntegritySignals,
    /// When set, `inspect` fails with this message instead
    pub error: Option<String>,
}

impl MockIntegritySource {
    /// Untampered app
    pub fn clean() -> Self {
        Self {
            signals: IntegritySignals::default(),
            error: None,
        }
    }

    /// App repackaged under a different signing identity
    pub fn resigned() -> Self {
        Self {
            signals: IntegritySignals {
                signature_matches: false,
                ..Default::default()
            },
            error: None,
        }
    }

    /// App with a debugger attached
    pub fn debugged() -> Self {
        Self {
            signals: IntegritySignals {
                debugger_attached: true,
                ..Default::default()
            },
            error: None,
        }
    }

    /// Source whose platform call fails
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            signals: IntegritySignals::default(),
            error: Some(message.into()),
        }
    }
}

#[async_trait]
impl AppIntegritySource for MockIntegritySource {
    async fn inspect(&self) -> Result<IntegritySignals> {
        match &self.error {
            Some(message) => Err(Error::Probe(message.clone())),
            None => Ok(self.signals),
        }
    }
}
