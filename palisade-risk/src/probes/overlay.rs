//! Overlay injection probe
//!
//! Detects other apps drawing over the wallet at transaction time
//! (tapjacking / fake-UI attacks). The monitor also exposes a strict
//! mode that the signing flow engages for its whole duration via an
//! RAII guard.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
    assessment::SecurityCheckResult,
    probe::{ProbeKind, SecurityProbe},
    Error, Result,
};

/// Check name reported by this probe
pub const OVERLAY_INJECTION_CHECK: &str = "overlay_injection";

/// Threat level at which an overlay counts as an active attack
pub const OVERLAY_THREAT_THRESHOLD: f64 = 0.3;

/// Result of one overlay scan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayScan {
    /// Threat level in `[0, 1]`
    pub threat_level: f64,
    /// Package identifiers of apps drawing over the screen
    pub suspicious_packages: Vec<String>,
}

/// Platform adapter for overlay detection.
///
/// `set_strict_mode` must be cheap and non-blocking: it is called from
/// [`StrictModeGuard::drop`].
#[async_trait]
pub trait OverlayMonitor: Send + Sync {
    /// Scan for apps drawing over the current screen.
    async fn scan(&self) -> Result<OverlayScan>;

    /// Toggle strict mode (e.g. reject all touches while an overlay is
    /// present).
    fn set_strict_mode(&self, enabled: bool) -> Result<()>;
}

/// Overlay detection probe
pub struct OverlayInjectionProbe {
    monitor: Arc<dyn OverlayMonitor>,
}

impl OverlayInjectionProbe {
    /// Create a probe over a platform overlay monitor.
    pub fn new(monitor: Arc<dyn OverlayMonitor>) -> Self {
        Self { monitor }
    }
}

#[async_trait]
impl SecurityProbe for OverlayInjectionProbe {
    fn name(&self) -> &str {
        OVERLAY_INJECTION_CHECK
    }

    fn kind(&self) -> ProbeKind {
        ProbeKind::OverlayInjection
    }

    async fn run(&self) -> Result<SecurityCheckResult> {
        let scan = self.monitor.scan().await?;

        if scan.threat_level >= OVERLAY_THREAT_THRESHOLD {
            let reason = if scan.suspicious_packages.is_empty() {
                "Screen overlay active".to_string()
            } else {
                format!(
                    "Screen overlay active: {}",
                    scan.suspicious_packages.join(", ")
                )
            };
            warn!(
                "Overlay threat {:.2} from {} package(s)",
                scan.threat_level,
                scan.suspicious_packages.len()
            );
            Ok(SecurityCheckResult::failed(
                OVERLAY_INJECTION_CHECK,
                reason,
                scan.threat_level,
            ))
        } else if scan.threat_level > 0.0 {
            Ok(SecurityCheckResult::passed_with_signal(
                OVERLAY_INJECTION_CHECK,
                scan.threat_level,
            ))
        } else {
            Ok(SecurityCheckResult::passed(OVERLAY_INJECTION_CHECK))
        }
    }
}

/// RAII guard holding overlay strict mode engaged.
///
/// Strict mode is released on drop, so it cannot outlive the signing
/// flow even on error or cancellation paths.
pub struct StrictModeGuard {
    monitor: Arc<dyn OverlayMonitor>,
}

impl StrictModeGuard {
    /// Engage strict mode; it stays engaged until the guard drops.
    pub fn engage(monitor: Arc<dyn OverlayMonitor>) -> Result<Self> {
        monitor.set_strict_mode(true)?;
        debug!("Overlay strict mode engaged");
        Ok(Self { monitor })
    }
}

impl Drop for StrictModeGuard {
    fn drop(&mut self) {
        if let Err(e) = self.monitor.set_strict_mode(false) {
            warn!("Failed to release overlay strict mode: {}", e);
        } else {
            debug!("Overlay strict mode released");
        }
    }
}

/// Test overlay monitor with a fixed scan result
pub struct MockOverlayMonitor {
    scan: std::result::Result<OverlayScan, String>,
    strict_mode: parking_lot::RwLock<bool>,
    transitions: parking_lot::RwLock<Vec<bool>>,
}

impl MockOverlayMonitor {
    /// No overlays present
    pub fn clear() -> Self {
        Self {
            scan: Ok(OverlayScan::default()),
            strict_mode: parking_lot::RwLock::new(false),
            transitions: parking_lot::RwLock::new(Vec::new()),
        }
    }

    /// Active overlay attack from the given packages
    pub fn threatening(threat_level: f64, packages: &[&str]) -> Self {
        Self {
            scan: Ok(OverlayScan {
                threat_level,
                suspicious_packages: packages.iter().map(|s| s.to_string()).collect(),
            }),
            strict_mode: parking_lot::RwLock::new(false),
            transitions: parking_lot::RwLock::new(Vec::new()),
        }
    }

    /// Monitor whose scan fails
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            scan: Err(message.into()),
            strict_mode: parking_lot::RwLock::new(false),
            transitions: parking_lot::RwLock::new(Vec::new()),
        }
    }

    /// Whether strict mode is currently engaged
    pub fn strict_mode_enabled(&self) -> bool {
        *self.strict_mode.read()
    }

    /// Every `set_strict_mode` call in order
    pub fn strict_mode_transitions(&self) -> Vec<bool> {
        self.transitions.read().clone()
    }
}

#[async_trait]
impl OverlayMonitor for MockOverlayMonitor {
    async fn scan(&self) -> Result<OverlayScan> {
        match &self.scan {
            Ok(scan) => Ok(scan.clone()),
            Err(message) => Err(Error::Probe(message.clone())),
        }
    }

    fn set_strict_mode(&self, enabled: bool) -> Result<()> {
        *self.strict_mode.write() = enabled;
        self.transitions.write().push(enabled);
        Ok(())
    }
}
