//! Device integrity probe (root/jailbreak detection)
//!
//! Five independent detection layers feed a weighted sum. No single
//! low-weight layer can cross the compromise threshold on its own, so
//! hiding one artifact (e.g. renaming `su`) still leaves the other
//! layers contributing signal.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
    assessment::SecurityCheckResult,
    probe::{ProbeKind, SecurityProbe},
    Error, Result,
};

/// Check name reported by this probe
pub const DEVICE_INTEGRITY_CHECK: &str = "device_integrity";

/// Weight: privileged-access binaries or manager apps present
pub const WEIGHT_PRIVILEGED_BINARIES: f64 = 0.4;

/// Weight: normally-forbidden system paths accessible
pub const WEIGHT_FORBIDDEN_PATHS: f64 = 0.3;

/// Weight: sandbox-escape test succeeded
pub const WEIGHT_SANDBOX_ESCAPE: f64 = 0.25;

/// Weight: abnormal symlinks in system directories
pub const WEIGHT_ABNORMAL_SYMLINKS: f64 = 0.15;

/// Weight: hooking-framework libraries mapped into the process
pub const WEIGHT_HOOKING_LIBRARIES: f64 = 0.2;

/// Weighted sum at which the device counts as compromised
pub const COMPROMISE_THRESHOLD: f64 = 0.3;

/// Severity reported when inspection itself fails
pub const UNKNOWN_SEVERITY: f64 = 0.5;

/// Device operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Android
    Android,
    /// iOS
    Ios,
}

/// Raw compromise signals from the platform inspector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceSignals {
    /// su/magisk/cydia style binaries or manager apps present
    pub privileged_binaries: bool,
    /// Normally-forbidden system paths are readable or writable
    pub forbidden_paths_accessible: bool,
    /// The app can operate outside its sandbox
    pub sandbox_escape: bool,
    /// Abnormal symlinks in system directories
    pub abnormal_symlinks: bool,
    /// Hooking-framework libraries loaded
    pub hooking_libraries: bool,
}

/// Categorical device verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    /// No compromise indicators above the threshold
    Secure,
    /// Android device with root indicators
    Rooted,
    /// iOS device with jailbreak indicators
    Jailbroken,
    /// Inspection could not complete
    Unknown,
}

impl DeviceStatus {
    /// Lowercase status name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Secure => "secure",
            Self::Rooted => "rooted",
            Self::Jailbroken => "jailbroken",
            Self::Unknown => "unknown",
        }
    }
}

/// Detailed inspection outcome
#[derive(Debug, Clone)]
pub struct DeviceReport {
    /// Categorical verdict
    pub status: DeviceStatus,
    /// Weighted risk level in `[0, 1]`
    pub risk_level: f64,
    /// Indicators that fired, human-readable
    pub indicators: Vec<String>,
}

/// Platform adapter collecting raw device signals.
///
/// Implemented natively per platform; [`MockDeviceInspector`] serves
/// tests.
#[async_trait]
pub trait DeviceInspector: Send + Sync {
    /// OS family this inspector reports for
    fn platform(&self) -> Platform;

    /// Collect raw compromise signals.
    async fn inspect(&self) -> Result<DeviceSignals>;
}

/// Root/jailbreak detection probe
pub struct DeviceIntegrityProbe {
    inspector: Arc<dyn DeviceInspector>,
    hard_block: bool,
}

impl DeviceIntegrityProbe {
    /// Create a probe over a platform inspector.
    pub fn new(inspector: Arc<dyn DeviceInspector>) -> Self {
        Self {
            inspector,
            hard_block: false,
        }
    }

    /// Report compromised verdicts at critical severity, so a rooted or
    /// jailbroken device blocks signing regardless of the aggregate
    /// score. Wired from `SecurityConfig::block_compromised`. An
    /// `Unknown` verdict is not escalated.
    pub fn with_hard_block(mut self, enabled: bool) -> Self {
        self.hard_block = enabled;
        self
    }

    /// Inspect the device and classify it.
    ///
    /// Never fails: an inspector error yields an `Unknown` report with
    /// moderate severity instead of propagating.
    pub async fn report(&self) -> DeviceReport {
        match self.inspector.inspect().await {
            Ok(signals) => classify(self.inspector.platform(), &signals),
            Err(e) => {
                warn!("Device inspection failed: {}", e);
                DeviceReport {
                    status: DeviceStatus::Unknown,
                    risk_level: UNKNOWN_SEVERITY,
                    indicators: vec![format!("Inspection failed: {}", e)],
                }
            }
        }
    }
}

/// Fold signals into a weighted risk level and categorical verdict.
fn classify(platform: Platform, signals: &DeviceSignals) -> DeviceReport {
    let mut risk = 0.0;
    let mut indicators = Vec::new();

    if signals.privileged_binaries {
        risk += WEIGHT_PRIVILEGED_BINARIES;
        indicators.push("Privileged access binaries detected".to_string());
    }
    if signals.forbidden_paths_accessible {
        risk += WEIGHT_FORBIDDEN_PATHS;
        indicators.push("Protected system paths accessible".to_string());
    }
    if signals.sandbox_escape {
        risk += WEIGHT_SANDBOX_ESCAPE;
        indicators.push("Sandbox escape possible".to_string());
    }
    if signals.abnormal_symlinks {
        risk += WEIGHT_ABNORMAL_SYMLINKS;
        indicators.push("Abnormal system symlinks".to_string());
    }
    if signals.hooking_libraries {
        risk += WEIGHT_HOOKING_LIBRARIES;
        indicators.push("Hooking framework libraries loaded".to_string());
    }

    let risk_level = risk.min(1.0);
    let status = if risk_level >= COMPROMISE_THRESHOLD {
        match platform {
            Platform::Android => DeviceStatus::Rooted,
            Platform::Ios => DeviceStatus::Jailbroken,
        }
    } else {
        DeviceStatus::Secure
    };

    DeviceReport {
        status,
        risk_level,
        indicators,
    }
}

#[async_trait]
impl SecurityProbe for DeviceIntegrityProbe {
    fn name(&self) -> &str {
        DEVICE_INTEGRITY_CHECK
    }

    fn kind(&self) -> ProbeKind {
        ProbeKind::DeviceIntegrity
    }

    async fn run(&self) -> Result<SecurityCheckResult> {
        let report = self.report().await;

        let result = match report.status {
            DeviceStatus::Secure if report.risk_level == 0.0 => {
                SecurityCheckResult::passed(DEVICE_INTEGRITY_CHECK)
            }
            // Sub-threshold indicators fired; keep their signal in the score.
            DeviceStatus::Secure => {
                debug!(
                    "Device secure with residual signal {:.2}: {}",
                    report.risk_level,
                    report.indicators.join(", ")
                );
                SecurityCheckResult::passed_with_signal(DEVICE_INTEGRITY_CHECK, report.risk_level)
            }
            DeviceStatus::Unknown => SecurityCheckResult::failed(
                DEVICE_INTEGRITY_CHECK,
                "Device status unknown",
                report.risk_level,
            ),
            status => {
                let severity = if self.hard_block {
                    1.0
                } else {
                    report.risk_level
                };
                SecurityCheckResult::failed(
                    DEVICE_INTEGRITY_CHECK,
                    format!("Device {}: {}", status.name(), report.indicators.join(", ")),
                    severity,
                )
            }
        };

        Ok(result)
    }
}

/// Test inspector returning fixed signals
pub struct MockDeviceInspector {
    /// Platform to report
    pub platform: Platform,
    /// Signals returned by `inspect`
    pub signals: DeviceSignals,
    /// When set, `inspect` fails with this message instead
    pub error: Option<String>,
}

impl MockDeviceInspector {
    /// Clean Android device
    pub fn secure() -> Self {
        Self {
            platform: Platform::Android,
            signals: DeviceSignals::default(),
            error: None,
        }
    }

    /// Android device with root binaries and accessible system paths
    pub fn rooted() -> Self {
        Self {
            platform: Platform::Android,
            signals: DeviceSignals {
                privileged_binaries: true,
                forbidden_paths_accessible: true,
                ..Default::default()
            },
            error: None,
        }
    }

    /// iOS device with jailbreak artifacts
    pub fn jailbroken() -> Self {
        Self {
            platform: Platform::Ios,
            signals: DeviceSignals {
                privileged_binaries: true,
                sandbox_escape: true,
                ..Default::default()
            },
            error: None,
        }
    }

    /// Inspector whose platform call fails
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            platform: Platform::Android,
            signals: DeviceSignals::default(),
            error: Some(message.into()),
        }
    }
}

#[async_trait]
impl DeviceInspector for MockDeviceInspector {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn inspect(&self) -> Result<DeviceSignals> {
        match &self.error {
            Some(message) => Err(Error::Probe(message.clone())),
            None => Ok(self.signals),
        }
    }
}
