//! Probe implementations
//!
//! Each probe pairs a platform adapter trait with the scoring logic
//! that turns raw signals into a check result. Mock adapters live next
//! to each probe so higher layers can be tested without any native
//! dependency.

pub mod capture;
pub mod device;
pub mod overlay;
pub mod tamper;

pub use capture::{
    CaptureDetector, CaptureStatus, MockCaptureDetector, ScreenRecordingProbe, ScreenshotProbe,
};
pub use device::{
    DeviceIntegrityProbe, DeviceInspector, DeviceReport, DeviceSignals, DeviceStatus,
    MockDeviceInspector, Platform,
};
pub use overlay::{
    MockOverlayMonitor, OverlayInjectionProbe, OverlayMonitor, OverlayScan, StrictModeGuard,
};
pub use tamper::{
    AppIntegritySource, IntegritySignals, MockIntegritySource, TamperDetectionProbe, TamperReport,
};
