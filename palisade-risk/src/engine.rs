//! Risk assessment engine
//!
//! Fans out every enabled probe as a concurrent task, joins all of
//! them, then folds the outcomes into one [`SecurityAssessment`]. A
//! probe error, panic or timeout becomes a failed check with severity
//! 1.0; the assessment itself never fails. No probe is trusted alone:
//! every joined outcome contributes to the aggregate score.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    assessment::{SecurityAssessment, SecurityCheckResult},
    config::SecurityConfig,
    probe::SecurityProbe,
};

/// Concurrent probe runner and score aggregator
pub struct RiskAssessmentEngine {
    probes: Vec<Arc<dyn SecurityProbe>>,
    config: SecurityConfig,
}

impl RiskAssessmentEngine {
    /// Create an engine with no probes registered.
    pub fn new(config: SecurityConfig) -> Self {
        Self {
            probes: Vec::new(),
            config,
        }
    }

    /// Register a probe. The profile decides per assessment whether it
    /// actually runs.
    pub fn with_probe(mut self, probe: Arc<dyn SecurityProbe>) -> Self {
        self.probes.push(probe);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &SecurityConfig {
        &self.config
    }

    /// Number of registered probes
    pub fn probe_count(&self) -> usize {
        self.probes.len()
    }

    /// Run all enabled probes concurrently and aggregate the outcome.
    ///
    /// The returned assessment always contains one check per enabled
    /// probe: errors, panics and timeouts are substituted with failed
    /// checks instead of being propagated.
    pub async fn assess(&self) -> SecurityAssessment {
        let enabled: Vec<Arc<dyn SecurityProbe>> = self
            .probes
            .iter()
            .filter(|p| self.config.enables(p.kind()))
            .cloned()
            .collect();

        if enabled.is_empty() {
            warn!("No probes enabled; assessment is trivially secure");
        }

        let timeout = self.config.probe_timeout;
        let mut tasks = Vec::with_capacity(enabled.len());
        for probe in enabled {
            let name = probe.name().to_string();
            let task = tokio::spawn(async move {
                match tokio::time::timeout(timeout, probe.run()).await {
                    Ok(Ok(result)) => result,
                    Ok(Err(e)) => {
                        warn!("Probe {} failed: {}", probe.name(), e);
                        SecurityCheckResult::failed(
                            probe.name(),
                            format!("Probe error: {}", e),
                            1.0,
                        )
                    }
                    Err(_) => {
                        warn!("Probe {} timed out after {:?}", probe.name(), timeout);
                        SecurityCheckResult::failed(
                            probe.name(),
                            format!("Probe timed out after {:?}", timeout),
                            1.0,
                        )
                    }
                }
            });
            tasks.push((name, task));
        }

        let mut checks = Vec::with_capacity(tasks.len());
        for (name, task) in tasks {
            let check = match task.await {
                Ok(result) => result,
                Err(e) => {
                    warn!("Probe {} panicked: {}", name, e);
                    SecurityCheckResult::failed(&name, "Probe panicked", 1.0)
                }
            };
            debug!(
                "Check {}: passed={} severity={:.2}",
                check.check_name(),
                check.is_passed(),
                check.severity()
            );
            checks.push(check);
        }

        let assessment = SecurityAssessment::from_checks(checks, self.config.max_risk_score);
        info!(
            "Assessment complete: risk {}%, secure={}, {} check(s)",
            assessment.risk_percent(),
            assessment.is_secure(),
            assessment.checks().len()
        );
        assessment
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::probe::ProbeKind;
    use crate::probes::{
        DeviceIntegrityProbe, MockCaptureDetector, MockDeviceInspector, MockIntegritySource,
        MockOverlayMonitor, OverlayInjectionProbe, ScreenRecordingProbe, ScreenshotProbe,
        TamperDetectionProbe,
    };
    use crate::{Error, Result};

    enum Behavior {
        Pass,
        Fail(f64),
        Error,
        Panic,
        Hang,
    }

    struct TestProbe {
        name: &'static str,
        kind: ProbeKind,
        behavior: Behavior,
    }

    impl TestProbe {
        fn passing(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                kind: ProbeKind::DeviceIntegrity,
                behavior: Behavior::Pass,
            })
        }
    }

    #[async_trait]
    impl SecurityProbe for TestProbe {
        fn name(&self) -> &str {
            self.name
        }

        fn kind(&self) -> ProbeKind {
            self.kind
        }

        async fn run(&self) -> Result<SecurityCheckResult> {
            match self.behavior {
                Behavior::Pass => Ok(SecurityCheckResult::passed(self.name)),
                Behavior::Fail(severity) => Ok(SecurityCheckResult::failed(
                    self.name,
                    "simulated failure",
                    severity,
                )),
                Behavior::Error => Err(Error::Probe("simulated error".to_string())),
                Behavior::Panic => panic!("simulated panic"),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(600)).await;
                    Ok(SecurityCheckResult::passed(self.name))
                }
            }
        }
    }

    fn full_engine(config: SecurityConfig) -> RiskAssessmentEngine {
        let capture = Arc::new(MockCaptureDetector::inactive());
        RiskAssessmentEngine::new(config.clone())
            .with_probe(Arc::new(
                DeviceIntegrityProbe::new(Arc::new(MockDeviceInspector::secure()))
                    .with_hard_block(config.block_compromised),
            ))
            .with_probe(Arc::new(TamperDetectionProbe::new(Arc::new(
                MockIntegritySource::clean(),
            ))))
            .with_probe(Arc::new(OverlayInjectionProbe::new(Arc::new(
                MockOverlayMonitor::clear(),
            ))))
            .with_probe(Arc::new(ScreenRecordingProbe::new(
                Arc::clone(&capture) as _
            )))
            .with_probe(Arc::new(ScreenshotProbe::new(capture as _)))
    }

    #[tokio::test]
    async fn test_clean_environment_is_secure() {
        let engine = full_engine(SecurityConfig::standard());
        let assessment = engine.assess().await;

        assert_eq!(assessment.checks().len(), 5);
        assert_eq!(assessment.risk_score(), 0.0);
        assert!(assessment.is_secure());
        assert!(assessment.is_safe_for_signing());
    }

    #[tokio::test]
    async fn test_relaxed_profile_skips_capture_probes() {
        let engine = full_engine(SecurityConfig::relaxed());
        assert_eq!(engine.probe_count(), 5);

        let assessment = engine.assess().await;
        // Overlay, recording and screenshot probes are disabled.
        assert_eq!(assessment.checks().len(), 2);
    }

    #[tokio::test]
    async fn test_probe_error_becomes_critical_failure() {
        let engine = RiskAssessmentEngine::new(SecurityConfig::standard())
            .with_probe(TestProbe::passing("a"))
            .with_probe(Arc::new(TestProbe {
                name: "b",
                kind: ProbeKind::TamperDetection,
                behavior: Behavior::Error,
            }));

        let assessment = engine.assess().await;
        assert_eq!(assessment.checks().len(), 2);

        let failed = assessment.failed_checks();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].check_name(), "b");
        assert_eq!(failed[0].severity(), 1.0);
        assert!(!assessment.is_safe_for_signing());
    }

    #[tokio::test]
    async fn test_probe_panic_becomes_critical_failure() {
        let engine = RiskAssessmentEngine::new(SecurityConfig::standard())
            .with_probe(TestProbe::passing("a"))
            .with_probe(Arc::new(TestProbe {
                name: "explosive",
                kind: ProbeKind::TamperDetection,
                behavior: Behavior::Panic,
            }));

        let assessment = engine.assess().await;
        assert_eq!(assessment.checks().len(), 2);
        assert!(assessment.has_critical_failure());
        assert!(!assessment.is_secure());
    }

    #[tokio::test]
    async fn test_hung_probe_times_out_as_critical_failure() {
        let config = SecurityConfig {
            probe_timeout: Duration::from_millis(50),
            ..SecurityConfig::standard()
        };
        let engine = RiskAssessmentEngine::new(config).with_probe(Arc::new(TestProbe {
            name: "hung",
            kind: ProbeKind::DeviceIntegrity,
            behavior: Behavior::Hang,
        }));

        let assessment = engine.assess().await;
        assert_eq!(assessment.checks().len(), 1);
        let check = &assessment.checks()[0];
        assert!(!check.is_passed());
        assert_eq!(check.severity(), 1.0);
        assert!(check.reason().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_tamper_critical_overrides_passing_environment() {
        let capture = Arc::new(MockCaptureDetector::inactive());
        let engine = RiskAssessmentEngine::new(SecurityConfig::standard())
            .with_probe(Arc::new(DeviceIntegrityProbe::new(Arc::new(
                MockDeviceInspector::secure(),
            ))))
            .with_probe(Arc::new(TamperDetectionProbe::new(Arc::new(
                MockIntegritySource::resigned(),
            ))))
            .with_probe(Arc::new(OverlayInjectionProbe::new(Arc::new(
                MockOverlayMonitor::clear(),
            ))))
            .with_probe(Arc::new(ScreenRecordingProbe::new(
                Arc::clone(&capture) as _
            )))
            .with_probe(Arc::new(ScreenshotProbe::new(capture as _)));

        let assessment = engine.assess().await;
        // Diluted mean stays low, but the signature mismatch is critical.
        assert!(assessment.risk_score() <= SecurityConfig::standard().max_risk_score);
        assert!(assessment.has_critical_failure());
        assert!(!assessment.is_safe_for_signing());
    }

    #[tokio::test]
    async fn test_rooted_device_blocked_under_standard_profile() {
        let config = SecurityConfig::standard();
        let engine = RiskAssessmentEngine::new(config.clone()).with_probe(Arc::new(
            DeviceIntegrityProbe::new(Arc::new(MockDeviceInspector::rooted()))
                .with_hard_block(config.block_compromised),
        ));

        let assessment = engine.assess().await;
        assert!(assessment.has_critical_failure());
        assert!(!assessment.is_safe_for_signing());
    }

    #[tokio::test]
    async fn test_moderate_failures_accumulate_past_threshold() {
        let engine = RiskAssessmentEngine::new(SecurityConfig::standard())
            .with_probe(Arc::new(TestProbe {
                name: "a",
                kind: ProbeKind::DeviceIntegrity,
                behavior: Behavior::Fail(0.4),
            }))
            .with_probe(Arc::new(TestProbe {
                name: "b",
                kind: ProbeKind::TamperDetection,
                behavior: Behavior::Fail(0.4),
            }));

        let assessment = engine.assess().await;
        // Mean 0.4 exceeds the 0.3 ceiling without any single critical.
        assert!(!assessment.has_critical_failure());
        assert!(!assessment.is_secure());
    }

    #[tokio::test]
    async fn test_empty_engine_is_trivially_secure() {
        let engine = RiskAssessmentEngine::new(SecurityConfig::standard());
        let assessment = engine.assess().await;
        assert!(assessment.checks().is_empty());
        assert!(assessment.is_secure());
    }
}
