//! Probe trait
//!
//! Every environmental check implements [`SecurityProbe`]: one async
//! method producing a structured result. Platform-specific detection
//! lives behind adapter traits inside each probe module, so a test
//! double can drive the whole engine without native dependencies.

use async_trait::async_trait;

use crate::{assessment::SecurityCheckResult, Result};

/// Probe category, used for profile-based selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeKind {
    /// Root/jailbreak detection
    DeviceIntegrity,
    /// App signature, code hash, debugger, emulator, hooking
    TamperDetection,
    /// Other apps drawing over the screen
    OverlayInjection,
    /// Active screen recording
    ScreenRecording,
    /// Screenshot capture
    Screenshot,
}

/// An independent environmental security check.
///
/// Implementations must never panic in `run`; errors are reported via
/// `Err` and converted to fail-safe results by the engine.
#[async_trait]
pub trait SecurityProbe: Send + Sync {
    /// Stable check name carried into the assessment
    fn name(&self) -> &str;

    /// Probe category
    fn kind(&self) -> ProbeKind;

    /// Execute the check and report an outcome.
    async fn run(&self) -> Result<SecurityCheckResult>;
}
