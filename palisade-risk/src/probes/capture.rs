//! Screen capture probes
//!
//! Two binary probes over one detector: active screen recording and
//! screenshot capture. Platforms without capture APIs report `Unknown`,
//! which passes; capture detection is an extra layer, not a gate, on
//! those platforms.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::{
    assessment::SecurityCheckResult,
    probe::{ProbeKind, SecurityProbe},
    Error, Result,
};

/// Check name reported by the screen-recording probe
pub const SCREEN_RECORDING_CHECK: &str = "screen_recording";

/// Check name reported by the screenshot probe
pub const SCREENSHOT_CHECK: &str = "screenshot";

/// Severity of an active screen recording
pub const SEVERITY_RECORDING_ACTIVE: f64 = 0.8;

/// Severity of active screenshot capture
pub const SEVERITY_SCREENSHOT_ACTIVE: f64 = 0.6;

/// Capture state reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    /// Capture in progress
    Active,
    /// No capture in progress
    Inactive,
    /// Platform cannot report capture state
    Unknown,
}

/// Platform adapter for capture detection
#[async_trait]
pub trait CaptureDetector: Send + Sync {
    /// Current screen-recording state.
    async fn recording_status(&self) -> Result<CaptureStatus>;

    /// Current screenshot-capture state.
    async fn screenshot_status(&self) -> Result<CaptureStatus>;
}

fn status_to_result(check_name: &str, status: CaptureStatus, severity: f64) -> SecurityCheckResult {
    match status {
        CaptureStatus::Active => SecurityCheckResult::failed(
            check_name,
            format!("Active capture detected ({})", check_name),
            severity,
        ),
        CaptureStatus::Inactive => SecurityCheckResult::passed(check_name),
        CaptureStatus::Unknown => {
            debug!("{} status unknown on this platform", check_name);
            SecurityCheckResult::passed(check_name)
        }
    }
}

/// Active screen-recording probe
pub struct ScreenRecordingProbe {
    detector: Arc<dyn CaptureDetector>,
}

impl ScreenRecordingProbe {
    /// Create a probe over a platform capture detector.
    pub fn new(detector: Arc<dyn CaptureDetector>) -> Self {
        Self { detector }
    }
}

#[async_trait]
impl SecurityProbe for ScreenRecordingProbe {
    fn name(&self) -> &str {
        SCREEN_RECORDING_CHECK
    }

    fn kind(&self) -> ProbeKind {
        ProbeKind::ScreenRecording
    }

    async fn run(&self) -> Result<SecurityCheckResult> {
        let status = self.detector.recording_status().await?;
        Ok(status_to_result(
            SCREEN_RECORDING_CHECK,
            status,
            SEVERITY_RECORDING_ACTIVE,
        ))
    }
}

/// Screenshot capture probe
pub struct ScreenshotProbe {
    detector: Arc<dyn CaptureDetector>,
}

impl ScreenshotProbe {
    /// Create a probe over a platform capture detector.
    pub fn new(detector: Arc<dyn CaptureDetector>) -> Self {
        Self { detector }
    }
}

#[async_trait]
impl SecurityProbe for ScreenshotProbe {
    fn name(&self) -> &str {
        SCREENSHOT_CHECK
    }

    fn kind(&self) -> ProbeKind {
        ProbeKind::Screenshot
    }

    async fn run(&self) -> Result<SecurityCheckResult> {
        let status = self.detector.screenshot_status().await?;
        Ok(status_to_result(
            SCREENSHOT_CHECK,
            status,
            SEVERITY_SCREENSHOT_ACTIVE,
        ))
    }
}

/// Test capture detector with fixed statuses
pub struct MockCaptureDetector {
    /// Status returned for screen recording
    pub recording: CaptureStatus,
    /// Status returned for screenshots
    pub screenshot: CaptureStatus,
    /// When set, both calls fail with this message instead
    pub error: Option<String>,
}

impl MockCaptureDetector {
    /// Nothing capturing
    pub fn inactive() -> Self {
        Self {
            recording: CaptureStatus::Inactive,
            screenshot: CaptureStatus::Inactive,
            error: None,
        }
    }

    /// Screen recording in progress
    pub fn recording_active() -> Self {
        Self {
            recording: CaptureStatus::Active,
            screenshot: CaptureStatus::Inactive,
            error: None,
        }
    }

    /// Screenshot capture in progress
    pub fn screenshot_active() -> Self {
        Self {
            recording: CaptureStatus::Inactive,
            screenshot: CaptureStatus::Active,
            error: None,
        }
    }

    /// Platform without capture APIs
    pub fn unsupported() -> Self {
        Self {
            recording: CaptureStatus::Unknown,
            screenshot: CaptureStatus::Unknown,
            error: None,
        }
    }

    /// Detector whose platform calls fail
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            recording: CaptureStatus::Unknown,
            screenshot: CaptureStatus::Unknown,
            error: Some(message.into()),
        }
    }
}

#[async_trait]
impl CaptureDetector for MockCaptureDetector {
    async fn recording_status(&self) -> Result<CaptureStatus> {
        match &self.error {
            Some(message) => Err(Error::Probe(message.clone())),
            None => Ok(self.recording),
        }
    }

    async fn screenshot_status(&self) -> Result<CaptureStatus> {
        match &self.error {
            Some(message) => Err(Error::Probe(message.clone())),
            None => Ok(self.screenshot),
        }
    }
}
