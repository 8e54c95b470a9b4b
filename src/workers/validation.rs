use crate::config::ValidationConfig;
use crate::pipeline::{classify_probe, Outcome};
use crate::state::ValidationStatus;
use crate::url::{parse_absolute, LinkCandidate};
use crate::workers::{LinkProbe, Operation, ProbeResult};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Probes the health of one link per candidate
///
/// The timeout is enforced here, around the whole probe, so a probe that
/// never answers still ends as `Timeout`.
pub struct ValidationWorker {
    probe: Arc<dyn LinkProbe>,
    timeout: Duration,
}

impl ValidationWorker {
    pub fn new(probe: Arc<dyn LinkProbe>, timeout: Duration) -> Self {
        Self { probe, timeout }
    }

    pub fn from_config(probe: Arc<dyn LinkProbe>, config: &ValidationConfig) -> Self {
        Self::new(probe, Duration::from_millis(config.timeout_ms))
    }
}

#[async_trait]
impl Operation for ValidationWorker {
    type Status = ValidationStatus;

    async fn execute(&self, candidate: &LinkCandidate) -> Outcome<ValidationStatus> {
        let url = &candidate.normalized_url;
        if let Err(e) = parse_absolute(url) {
            return Outcome::failed(e.to_string());
        }

        let started = Instant::now();
        let result = match tokio::time::timeout(self.timeout, self.probe.probe(url)).await {
            Ok(result) => result,
            Err(_) => ProbeResult::TimedOut {
                elapsed: started.elapsed(),
            },
        };

        let outcome = classify_probe(result);
        tracing::debug!("Probed {}: {}", url, outcome.status);
        outcome
    }
}
