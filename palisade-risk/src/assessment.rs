//! Assessment data model
//!
//! A [`SecurityCheckResult`] is the outcome of one probe; a
//! [`SecurityAssessment`] folds every result into a bounded risk score
//! and a categorical verdict. Both are immutable once constructed and
//! serialize to camelCase JSON for the signing audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity at or above which a single check forces an unsafe verdict,
/// regardless of the aggregate score.
pub const CRITICAL_SEVERITY: f64 = 0.85;

/// Severity floor for failed checks. A failed check always carries a
/// severity above zero.
pub const MIN_FAILURE_SEVERITY: f64 = 0.1;

/// Outcome of a single security check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityCheckResult {
    check_name: String,
    passed: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    failure_reason: Option<String>,
    severity: f64,
}

impl SecurityCheckResult {
    /// A clean pass with zero severity.
    pub fn passed(check_name: impl Into<String>) -> Self {
        Self {
            check_name: check_name.into(),
            passed: true,
            failure_reason: None,
            severity: 0.0,
        }
    }

    /// A pass that still carries residual signal below the probe's own
    /// flagging threshold. The residual contributes to the aggregate
    /// score so that sub-threshold layers are never discarded.
    pub fn passed_with_signal(check_name: impl Into<String>, severity: f64) -> Self {
        Self {
            check_name: check_name.into(),
            passed: true,
            failure_reason: None,
            severity: severity.clamp(0.0, 1.0),
        }
    }

    /// A failed check. Severity is clamped to `[MIN_FAILURE_SEVERITY, 1.0]`.
    pub fn failed(
        check_name: impl Into<String>,
        reason: impl Into<String>,
        severity: f64,
    ) -> Self {
        Self {
            check_name: check_name.into(),
            passed: false,
            failure_reason: Some(reason.into()),
            severity: severity.clamp(MIN_FAILURE_SEVERITY, 1.0),
        }
    }

    /// Stable check identifier
    pub fn check_name(&self) -> &str {
        &self.check_name
    }

    /// Whether the check passed
    pub fn is_passed(&self) -> bool {
        self.passed
    }

    /// Human-readable reason when the check failed
    pub fn reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Severity in `[0, 1]`
    pub fn severity(&self) -> f64 {
        self.severity
    }

    /// Whether this single result forces an unsafe verdict
    pub fn is_critical(&self) -> bool {
        self.severity >= CRITICAL_SEVERITY
    }
}

/// Aggregated outcome of one assessment run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityAssessment {
    checks: Vec<SecurityCheckResult>,
    risk_score: f64,
    is_secure: bool,
    timestamp: DateTime<Utc>,
}

impl SecurityAssessment {
    /// Fold check results into an assessment.
    ///
    /// The risk score is the mean severity over all results (0 when no
    /// probes ran). `is_secure` requires the score to stay at or below
    /// `max_risk_score` and no single check to reach
    /// [`CRITICAL_SEVERITY`].
    pub fn from_checks(checks: Vec<SecurityCheckResult>, max_risk_score: f64) -> Self {
        let risk_score = if checks.is_empty() {
            0.0
        } else {
            checks.iter().map(|c| c.severity()).sum::<f64>() / checks.len() as f64
        };

        let has_critical = checks.iter().any(|c| c.is_critical());
        let is_secure = risk_score <= max_risk_score && !has_critical;

        Self {
            checks,
            risk_score,
            is_secure,
            timestamp: Utc::now(),
        }
    }

    /// All check results, in probe registration order
    pub fn checks(&self) -> &[SecurityCheckResult] {
        &self.checks
    }

    /// Mean severity over all checks, in `[0, 1]`
    pub fn risk_score(&self) -> f64 {
        self.risk_score
    }

    /// Whether the environment passed the configured risk threshold
    pub fn is_secure(&self) -> bool {
        self.is_secure
    }

    /// When the assessment ran
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Whether any single check reached [`CRITICAL_SEVERITY`]
    pub fn has_critical_failure(&self) -> bool {
        self.checks.iter().any(|c| c.is_critical())
    }

    /// The gate signing decisions use: secure and free of critical failures.
    pub fn is_safe_for_signing(&self) -> bool {
        self.is_secure && !self.has_critical_failure()
    }

    /// Checks that did not pass
    pub fn failed_checks(&self) -> Vec<&SecurityCheckResult> {
        self.checks.iter().filter(|c| !c.is_passed()).collect()
    }

    /// Risk score as a whole percentage
    pub fn risk_percent(&self) -> u8 {
        (self.risk_score * 100.0).round() as u8
    }

    /// Caller-facing summary: risk percentage plus the failure reasons.
    /// Probe internals beyond the reason strings are never disclosed.
    pub fn failure_summary(&self) -> String {
        let reasons: Vec<&str> = self.checks.iter().filter_map(|c| c.reason()).collect();
        if reasons.is_empty() {
            format!("Risk {}%", self.risk_percent())
        } else {
            format!("Risk {}%: {}", self.risk_percent(), reasons.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_check_severity_floor() {
        let check = SecurityCheckResult::failed("device_integrity", "rooted", 0.0);
        assert!(!check.is_passed());
        assert!(check.severity() >= MIN_FAILURE_SEVERITY);

        let check = SecurityCheckResult::failed("device_integrity", "rooted", 7.5);
        assert_eq!(check.severity(), 1.0);
    }

    #[test]
    fn test_passed_check_has_zero_severity() {
        let check = SecurityCheckResult::passed("tamper_detection");
        assert!(check.is_passed());
        assert_eq!(check.severity(), 0.0);
        assert_eq!(check.reason(), None);
    }

    #[test]
    fn test_risk_score_is_mean_severity() {
        let checks = vec![
            SecurityCheckResult::passed("a"),
            SecurityCheckResult::failed("b", "x", 0.6),
            SecurityCheckResult::failed("c", "y", 0.3),
        ];
        let assessment = SecurityAssessment::from_checks(checks, 0.3);
        assert!((assessment.risk_score() - 0.3).abs() < 1e-9);
        assert_eq!(assessment.risk_percent(), 30);
    }

    #[test]
    fn test_all_passing_is_secure() {
        let checks = vec![
            SecurityCheckResult::passed("a"),
            SecurityCheckResult::passed("b"),
        ];
        let assessment = SecurityAssessment::from_checks(checks, 0.3);
        assert_eq!(assessment.risk_score(), 0.0);
        assert!(assessment.is_secure());
        assert!(assessment.is_safe_for_signing());
        assert_eq!(assessment.failure_summary(), "Risk 0%");
    }

    #[test]
    fn test_empty_assessment_is_secure() {
        let assessment = SecurityAssessment::from_checks(vec![], 0.3);
        assert_eq!(assessment.risk_score(), 0.0);
        assert!(assessment.is_secure());
    }

    #[test]
    fn test_score_over_threshold_is_insecure() {
        let checks = vec![SecurityCheckResult::failed("a", "x", 0.5)];
        let assessment = SecurityAssessment::from_checks(checks, 0.3);
        assert!(assessment.risk_score() > 0.3);
        assert!(!assessment.is_secure());
        assert!(!assessment.is_safe_for_signing());
    }

    #[test]
    fn test_critical_check_overrides_low_mean() {
        // One critical failure diluted by many passes: mean stays under
        // the threshold but the verdict must still be unsafe.
        let mut checks = vec![SecurityCheckResult::failed(
            "tamper_detection",
            "signature mismatch",
            1.0,
        )];
        for i in 0..9 {
            checks.push(SecurityCheckResult::passed(format!("probe_{}", i)));
        }
        let assessment = SecurityAssessment::from_checks(checks, 0.3);
        assert!(assessment.risk_score() <= 0.3);
        assert!(assessment.has_critical_failure());
        assert!(!assessment.is_secure());
        assert!(!assessment.is_safe_for_signing());
    }

    #[test]
    fn test_adding_failure_to_passing_set_raises_score() {
        let passing = vec![
            SecurityCheckResult::passed("a"),
            SecurityCheckResult::passed("b"),
        ];
        let base = SecurityAssessment::from_checks(passing.clone(), 0.3);

        let mut with_failure = passing;
        with_failure.push(SecurityCheckResult::failed("c", "x", 0.4));
        let raised = SecurityAssessment::from_checks(with_failure, 0.3);

        assert!(raised.risk_score() > base.risk_score());
    }

    #[test]
    fn test_failure_summary_lists_reasons() {
        let checks = vec![
            SecurityCheckResult::failed("device_integrity", "Privileged binaries detected", 0.4),
            SecurityCheckResult::failed("overlay_injection", "Overlay active", 0.4),
        ];
        let assessment = SecurityAssessment::from_checks(checks, 0.3);
        let summary = assessment.failure_summary();
        assert!(summary.starts_with("Risk 40%"));
        assert!(summary.contains("Privileged binaries detected"));
        assert!(summary.contains("Overlay active"));
    }

    #[test]
    fn test_serializes_to_camel_case() {
        let checks = vec![SecurityCheckResult::failed("device_integrity", "rooted", 0.5)];
        let assessment = SecurityAssessment::from_checks(checks, 0.3);
        let json = serde_json::to_string(&assessment).unwrap();

        assert!(json.contains("\"riskScore\""));
        assert!(json.contains("\"isSecure\""));
        assert!(json.contains("\"checkName\""));
        assert!(json.contains("\"failureReason\""));

        let back: SecurityAssessment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, assessment);
    }

    #[test]
    fn test_passed_check_omits_reason_field() {
        let check = SecurityCheckResult::passed("screenshot");
        let json = serde_json::to_string(&check).unwrap();
        assert!(!json.contains("failureReason"));
    }
}
