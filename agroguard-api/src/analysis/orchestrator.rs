//! Analysis orchestrator: remote provider with simulator fallback
//!
//! Drives one analysis request through an explicit state machine so the
//! fallback conditions are enumerable instead of buried in nested error
//! handling:
//!
//! ```text
//! Idle ──▶ RemoteAttempt ──▶ Done          (well-formed remote verdict)
//!   │            │
//!   │            └──▶ Fallback ──▶ Done    (any remote failure)
//!   └──▶ Fallback ──▶ Done                 (no credential / simulator forced)
//! ```
//!
//! No state retries: the remote provider is attempted at most once per
//! call, and the simulator only fails on invalid input size, which is the
//! single error surfaced to the caller.

use agroguard_common::models::AnalysisResult;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{AnalysisProvider, ProviderError};

/// States of one analysis request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    Idle,
    RemoteAttempt,
    Fallback,
    Done,
}

/// A completed analysis with its provenance
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    /// Name of the provider that produced the verdict
    pub provider: &'static str,
    /// Transition trace of this request, ending in `Done`
    pub states: Vec<AnalysisState>,
}

/// Chains the remote provider and the simulator
pub struct Orchestrator {
    remote: Option<Arc<dyn AnalysisProvider>>,
    simulator: Arc<dyn AnalysisProvider>,
    force_simulator: bool,
}

impl Orchestrator {
    pub fn new(
        remote: Option<Arc<dyn AnalysisProvider>>,
        simulator: Arc<dyn AnalysisProvider>,
        force_simulator: bool,
    ) -> Self {
        Self {
            remote,
            simulator,
            force_simulator,
        }
    }

    /// Run one analysis request through the state machine.
    pub async fn analyze(&self, image: &[u8]) -> Result<AnalysisOutcome, ProviderError> {
        let mut states = vec![AnalysisState::Idle];

        if let Some(remote) = self.remote.as_ref().filter(|_| !self.force_simulator) {
            states.push(AnalysisState::RemoteAttempt);
            debug!(provider = remote.name(), "attempting remote analysis");

            match remote.analyze(image).await {
                Ok(result) => {
                    states.push(AnalysisState::Done);
                    info!(provider = remote.name(), "remote analysis succeeded");
                    return Ok(AnalysisOutcome {
                        result,
                        provider: remote.name(),
                        states,
                    });
                }
                Err(e) => {
                    warn!(
                        provider = remote.name(),
                        error = %e,
                        "remote analysis failed, falling back to simulator"
                    );
                }
            }
        } else if self.force_simulator {
            debug!("simulator-only mode forced");
        } else {
            debug!("no remote credential configured, using simulator");
        }

        states.push(AnalysisState::Fallback);
        let result = self.simulator.analyze(image).await?;
        states.push(AnalysisState::Done);

        Ok(AnalysisOutcome {
            result,
            provider: self.simulator.name(),
            states,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agroguard_common::models::Severity;
    use async_trait::async_trait;

    struct StubProvider {
        name: &'static str,
        outcome: fn() -> Result<AnalysisResult, ProviderError>,
    }

    fn verdict(name: &str) -> AnalysisResult {
        AnalysisResult {
            detected: true,
            disease_name: name.to_string(),
            disease_name_amharic: None,
            disease_name_oromifa: None,
            confidence: 80,
            description: String::new(),
            symptoms: vec![],
            treatment: vec![],
            prevention: vec![],
            affected_crops: vec![],
            severity: Severity::Medium,
            is_healthy: false,
        }
    }

    #[async_trait]
    impl AnalysisProvider for StubProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn analyze(&self, _image: &[u8]) -> Result<AnalysisResult, ProviderError> {
            (self.outcome)()
        }
    }

    fn remote_ok() -> Arc<dyn AnalysisProvider> {
        Arc::new(StubProvider {
            name: "remote",
            outcome: || Ok(verdict("Remote Verdict")),
        })
    }

    fn remote_quota() -> Arc<dyn AnalysisProvider> {
        Arc::new(StubProvider {
            name: "remote",
            outcome: || Err(ProviderError::Quota),
        })
    }

    fn simulator_ok() -> Arc<dyn AnalysisProvider> {
        Arc::new(StubProvider {
            name: "simulator",
            outcome: || Ok(verdict("Simulated Verdict")),
        })
    }

    #[tokio::test]
    async fn remote_success_completes_without_fallback() {
        let orch = Orchestrator::new(Some(remote_ok()), simulator_ok(), false);
        let outcome = orch.analyze(&[0u8; 200]).await.unwrap();

        assert_eq!(outcome.provider, "remote");
        assert_eq!(
            outcome.states,
            vec![
                AnalysisState::Idle,
                AnalysisState::RemoteAttempt,
                AnalysisState::Done
            ]
        );
    }

    #[tokio::test]
    async fn quota_exhaustion_yields_simulated_verdict() {
        let orch = Orchestrator::new(Some(remote_quota()), simulator_ok(), false);
        let outcome = orch.analyze(&[0u8; 200]).await.unwrap();

        assert_eq!(outcome.provider, "simulator");
        assert_eq!(outcome.result.disease_name, "Simulated Verdict");
        assert_eq!(
            outcome.states,
            vec![
                AnalysisState::Idle,
                AnalysisState::RemoteAttempt,
                AnalysisState::Fallback,
                AnalysisState::Done
            ]
        );
    }

    #[tokio::test]
    async fn missing_credential_skips_remote_entirely() {
        let orch = Orchestrator::new(None, simulator_ok(), false);
        let outcome = orch.analyze(&[0u8; 200]).await.unwrap();

        assert_eq!(outcome.provider, "simulator");
        assert_eq!(
            outcome.states,
            vec![
                AnalysisState::Idle,
                AnalysisState::Fallback,
                AnalysisState::Done
            ]
        );
    }

    #[tokio::test]
    async fn forced_simulator_ignores_configured_remote() {
        let orch = Orchestrator::new(Some(remote_ok()), simulator_ok(), true);
        let outcome = orch.analyze(&[0u8; 200]).await.unwrap();

        assert_eq!(outcome.provider, "simulator");
        assert!(!outcome.states.contains(&AnalysisState::RemoteAttempt));
    }

    #[tokio::test]
    async fn each_remote_failure_kind_falls_back() {
        let failures: Vec<fn() -> Result<AnalysisResult, ProviderError>> = vec![
            || Err(ProviderError::Http("502".to_string())),
            || Err(ProviderError::Quota),
            || Err(ProviderError::EmptyResponse),
            || Err(ProviderError::Parse("bad json".to_string())),
        ];
        for outcome_fn in failures {
            let remote = Arc::new(StubProvider {
                name: "remote",
                outcome: outcome_fn,
            });
            let orch = Orchestrator::new(Some(remote), simulator_ok(), false);
            let outcome = orch.analyze(&[0u8; 200]).await.unwrap();
            assert_eq!(outcome.provider, "simulator");
        }
    }

    #[tokio::test]
    async fn real_simulator_invalid_input_is_surfaced() {
        let simulator: Arc<dyn AnalysisProvider> =
            Arc::new(super::super::SimulatedProvider::new().without_latency());
        let orch = Orchestrator::new(None, simulator, false);

        let err = orch.analyze(&[0u8; 10]).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidImage(_)));
    }
}
