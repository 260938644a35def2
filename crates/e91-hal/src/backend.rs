//! Backend trait and configuration.
//!
//! The [`Backend`] trait defines the lifecycle for sampling a circuit:
//!
//! ```text
//!   capabilities() ──→ validate() ──→ submit() ──→ status() ──→ result()
//!    (sync, &ref)       (async)       (async)      (async)      (async)
//! ```
//!
//! | Method | Kind | Required | Returns |
//! |--------|------|----------|---------|
//! | `name()` | sync | yes | `&str` |
//! | `capabilities()` | sync | yes | `&Capabilities` |
//! | `availability()` | async | yes | `HalResult<BackendAvailability>` |
//! | `validate()` | async | yes | `HalResult<ValidationResult>` |
//! | `submit()` | async | yes | `HalResult<JobId>` |
//! | `status()` | async | yes | `HalResult<JobStatus>` |
//! | `result()` | async | yes | `HalResult<ExecutionResult>` |
//! | `cancel()` | async | yes | `HalResult<()>` |
//! | `wait()` | async | provided | `HalResult<ExecutionResult>` |

use std::time::Duration;

use async_trait::async_trait;
use e91_ir::Circuit;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::result::ExecutionResult;

/// Configuration for a backend instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Name of the backend.
    pub name: String,
    /// Seed for the backend's sampling RNG. `None` draws from entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Maximum number of qubits the backend should accept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_qubits: Option<u32>,
}

impl BackendConfig {
    /// Create a new backend configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the sampling seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Limit the number of qubits.
    pub fn with_max_qubits(mut self, max_qubits: u32) -> Self {
        self.max_qubits = Some(max_qubits);
        self
    }
}

/// Trait for measurement backends.
///
/// # Contract
///
/// - `capabilities()` is synchronous and infallible; implementations cache
///   it at construction time.
/// - `validate()` checks the circuit against backend constraints before
///   submission.
/// - `submit()` returns a `JobId` whose initial status is `Queued`.
/// - `result()` is only called when status is `Completed`. It hands the
///   result over once and releases the job; later calls for the same id
///   return `HalError::JobNotFound`.
/// - A job whose run fails is released before `submit()` returns the error.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Get the capabilities of this backend.
    fn capabilities(&self) -> &Capabilities;

    /// Check backend availability.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Validate a circuit against backend constraints.
    ///
    /// Checks at minimum the qubit count against `capabilities().num_qubits`
    /// and every gate against `capabilities().gate_set`.
    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult>;

    /// Submit a circuit for execution.
    ///
    /// `parameters` binds named circuit parameters; backends without
    /// parametric support return `HalError::Unsupported` when it is
    /// non-empty.
    async fn submit(
        &self,
        circuit: &Circuit,
        shots: u32,
        parameters: Option<&std::collections::HashMap<String, f64>>,
    ) -> HalResult<JobId>;

    /// Get the status of a job.
    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Take the result of a completed job, releasing it from the backend.
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult>;

    /// Cancel a running job.
    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Wait for a job to complete and return its result.
    ///
    /// Default implementation polls every 500ms for up to 5 minutes.
    async fn wait(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let poll_interval = Duration::from_millis(500);
        let max_polls = 600;

        for _ in 0..max_polls {
            match self.status(job_id).await? {
                JobStatus::Completed => return self.result(job_id).await,
                JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                JobStatus::Queued | JobStatus::Running => {
                    debug!(job = %job_id, "job pending, polling again");
                    tokio::time::sleep(poll_interval).await;
                }
            }
        }

        Err(HalError::Timeout(job_id.0.clone()))
    }
}

/// Backend availability information.
#[derive(Debug, Clone)]
pub struct BackendAvailability {
    /// Whether the backend is currently accepting jobs.
    pub is_available: bool,
    /// Number of jobs currently in queue (if known).
    pub queue_depth: Option<u32>,
    /// Estimated wait time for a new job (if known).
    pub estimated_wait: Option<Duration>,
    /// Human-readable status message.
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// Availability for a backend that never queues.
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            queue_depth: Some(0),
            estimated_wait: Some(Duration::ZERO),
            status_message: None,
        }
    }
}

/// Result of circuit validation against backend constraints.
#[derive(Debug, Clone)]
pub enum ValidationResult {
    /// Circuit is valid and can be submitted directly.
    Valid,
    /// Circuit is invalid for this backend.
    Invalid {
        /// Reasons the circuit is invalid.
        reasons: Vec<String>,
    },
}

impl ValidationResult {
    /// Check if the circuit is valid (can be submitted as-is).
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Turn an `Invalid` result into `HalError::InvalidCircuit`.
    pub fn into_result(self) -> HalResult<()> {
        match self {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid { reasons } => {
                Err(HalError::InvalidCircuit(reasons.join("; ")))
            }
        }
    }
}

/// Trait for creating backends from configuration.
pub trait BackendFactory: Backend + Sized {
    /// Create a backend from configuration.
    fn from_config(config: BackendConfig) -> HalResult<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_config() {
        let config = BackendConfig::new("statevector")
            .with_seed(7)
            .with_max_qubits(12);

        assert_eq!(config.name, "statevector");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.max_qubits, Some(12));
    }

    #[test]
    fn test_backend_availability() {
        let avail = BackendAvailability::always_available();
        assert!(avail.is_available);
        assert_eq!(avail.estimated_wait, Some(Duration::ZERO));
        assert_eq!(avail.queue_depth, Some(0));
        assert!(avail.status_message.is_none());
    }

    #[test]
    fn test_validation_into_result() {
        assert!(ValidationResult::Valid.into_result().is_ok());
        let invalid = ValidationResult::Invalid {
            reasons: vec!["too many qubits".into(), "unknown gate".into()],
        };
        assert!(!invalid.is_valid());
        match invalid.into_result() {
            Err(HalError::InvalidCircuit(msg)) => {
                assert_eq!(msg, "too many qubits; unknown gate");
            }
            other => panic!("expected InvalidCircuit, got {other:?}"),
        }
    }
}
