//! Security profiles
//!
//! An explicit, immutable configuration value passed into the engine
//! and signer constructors. Profiles choose which probes run and how
//! much aggregate risk is tolerated before signing is refused.

use std::time::Duration;

use crate::probe::ProbeKind;

/// Default maximum tolerated risk score
pub const DEFAULT_MAX_RISK_SCORE: f64 = 0.3;

/// Risk ceiling for the strict profile
pub const STRICT_MAX_RISK_SCORE: f64 = 0.1;

/// Risk ceiling for the relaxed profile
pub const RELAXED_MAX_RISK_SCORE: f64 = 0.7;

/// Default per-probe timeout
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Probe selection and risk tolerance for a signing context
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityConfig {
    /// Run the overlay-injection probe
    pub overlay_detection: bool,
    /// Run the screen-recording probe
    pub screen_recording_detection: bool,
    /// Run the screenshot probe
    pub screenshot_detection: bool,
    /// Report compromised device verdicts at critical severity, so a
    /// rooted or jailbroken device blocks signing regardless of the
    /// aggregate score
    pub block_compromised: bool,
    /// Maximum tolerated aggregate risk score
    pub max_risk_score: f64,
    /// Require a recent re-authentication before signing
    pub require_recent_auth: bool,
    /// Per-probe deadline; a probe that exceeds it counts as a failed
    /// check with severity 1.0
    pub probe_timeout: Duration,
}

impl SecurityConfig {
    /// Default profile: every probe on, risk ceiling 0.3.
    pub fn standard() -> Self {
        Self {
            overlay_detection: true,
            screen_recording_detection: true,
            screenshot_detection: true,
            block_compromised: true,
            max_risk_score: DEFAULT_MAX_RISK_SCORE,
            require_recent_auth: false,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// High-value profile: risk ceiling 0.1 and mandatory recent
    /// re-authentication.
    pub fn strict() -> Self {
        Self {
            max_risk_score: STRICT_MAX_RISK_SCORE,
            require_recent_auth: true,
            ..Self::standard()
        }
    }

    /// Low-friction profile for low-value operations: capture and
    /// overlay probes off, risk ceiling 0.7. Device and tamper checks
    /// still run and compromised devices are still blocked.
    pub fn relaxed() -> Self {
        Self {
            overlay_detection: false,
            screen_recording_detection: false,
            screenshot_detection: false,
            max_risk_score: RELAXED_MAX_RISK_SCORE,
            ..Self::standard()
        }
    }

    /// Whether this profile runs probes of the given kind.
    ///
    /// Device-integrity and tamper probes run under every profile.
    pub fn enables(&self, kind: ProbeKind) -> bool {
        match kind {
            ProbeKind::DeviceIntegrity | ProbeKind::TamperDetection => true,
            ProbeKind::OverlayInjection => self.overlay_detection,
            ProbeKind::ScreenRecording => self.screen_recording_detection,
            ProbeKind::Screenshot => self.screenshot_detection,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self::standard()
    }
}
