//! Outcome classification
//!
//! Workers hand their raw collaborator results to these functions, which map
//! them onto the closed status set of each pipeline. Classification is pure and
//! deterministic: the same collaborator result always yields the same outcome.

use crate::state::{ImportStatus, PipelineStatus, StatusDetails, ValidationStatus};
use crate::workers::{CreateError, CreatedBookmark, ProbeResult};
use tokio::task::JoinError;

/// Classified result of one operation on one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<S> {
    pub status: S,
    pub details: StatusDetails,
}

impl<S: PipelineStatus> Outcome<S> {
    pub fn new(status: S) -> Self {
        Self {
            status,
            details: StatusDetails::default(),
        }
    }

    /// The pipeline's failure status carrying an error message
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(S::failure()).with_details(StatusDetails::error(message))
    }

    pub fn with_details(mut self, details: StatusDetails) -> Self {
        self.details = details;
        self
    }
}

/// Classifies the answer of the bookmark storage collaborator
///
/// | Storage answer | Status |
/// |----------------|--------|
/// | created | `Success`, adopting the canonical title |
/// | conflict | `Duplicate` |
/// | rejected | `Failed` with the rejection message |
/// | unreachable | `Failed` with the transport error |
pub fn classify_import(result: Result<CreatedBookmark, CreateError>) -> Outcome<ImportStatus> {
    match result {
        Ok(created) => Outcome::new(ImportStatus::Success)
            .with_details(StatusDetails::default().with_title(created.title)),
        Err(CreateError::Conflict) => Outcome::new(ImportStatus::Duplicate),
        Err(CreateError::Rejected(message)) | Err(CreateError::Transport(message)) => {
            Outcome::failed(message)
        }
    }
}

/// Classifies a probe result, in priority order
///
/// 1. The probe ran out of time → `Timeout`
/// 2. A 3xx answer with a `Location` → `Redirect`, recording the target
/// 3. A 2xx answer, or a 3xx without a target such as 304 → `Healthy`
/// 4. A 4xx/5xx answer, any other code, or a network error → `Broken`
pub fn classify_probe(result: ProbeResult) -> Outcome<ValidationStatus> {
    match result {
        ProbeResult::TimedOut { elapsed } => Outcome::new(ValidationStatus::Timeout).with_details(
            StatusDetails::error(format!("Timed out after {} ms", elapsed.as_millis()))
                .with_latency_ms(elapsed.as_millis() as u64),
        ),

        ProbeResult::Response {
            status_code,
            location,
            latency,
        } => {
            let details = StatusDetails::default()
                .with_status_code(status_code)
                .with_latency_ms(latency.as_millis() as u64);

            match status_code {
                300..=399 if location.is_some() => Outcome::new(ValidationStatus::Redirect)
                    .with_details(details.with_redirect_target(location)),
                200..=399 => Outcome::new(ValidationStatus::Healthy).with_details(details),
                400..=599 => Outcome::new(ValidationStatus::Broken).with_details(StatusDetails {
                    error: Some(format!("HTTP {}", status_code)),
                    ..details
                }),
                _ => Outcome::new(ValidationStatus::Broken).with_details(StatusDetails {
                    error: Some(format!("Unexpected HTTP {}", status_code)),
                    ..details
                }),
            }
        }

        ProbeResult::NetworkError { error } => Outcome::failed(error),
    }
}

/// Classifies a worker task that did not return
///
/// A panic becomes the pipeline's failure status with the panic message, so
/// the rest of the window is unaffected.
pub(crate) fn classify_crash<S: PipelineStatus>(error: JoinError) -> Outcome<S> {
    if !error.is_panic() {
        return Outcome::failed("Worker task was cancelled");
    }

    let payload = error.into_panic();
    let message = if let Some(message) = payload.downcast_ref::<&str>() {
        format!("Worker panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("Worker panicked: {}", message)
    } else {
        "Worker panicked".to_string()
    };

    Outcome::failed(message)
}
