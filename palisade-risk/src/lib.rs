//! Environmental risk assessment for the Palisade wallet
//!
//! - Independent async security probes: device integrity (root/
//!   jailbreak), app tamper detection, overlay injection, screen
//!   capture
//! - Concurrent fan-out with fail-safe collection: a probe error,
//!   panic or timeout becomes a failed check, never a crash
//! - Weighted aggregation into a bounded risk score with a critical
//!   override for single high-severity findings
//!
//! No single probe is trusted: bypassing one detection layer still
//! leaves the others contributing to the score.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod assessment;
pub mod config;
pub mod engine;
pub mod error;
pub mod probe;
pub mod probes;

pub use assessment::{
    SecurityAssessment, SecurityCheckResult, CRITICAL_SEVERITY, MIN_FAILURE_SEVERITY,
};
pub use config::{SecurityConfig, DEFAULT_MAX_RISK_SCORE, DEFAULT_PROBE_TIMEOUT};
pub use engine::RiskAssessmentEngine;
pub use error::{Error, Result};
pub use probe::{ProbeKind, SecurityProbe};
