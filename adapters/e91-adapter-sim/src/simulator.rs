//! Simulator backend implementation.

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, instrument};
use uuid::Uuid;

use e91_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, Counts,
    ExecutionResult, HalError, HalResult, JobId, JobStatus, ValidationResult,
};
use e91_ir::{Circuit, InstructionKind};

use crate::statevector::Statevector;

/// Largest register the simulator accepts by default.
pub const DEFAULT_MAX_QUBITS: u32 = 20;

/// Local simulator backend.
///
/// This backend simulates circuits with a full statevector and samples the
/// final state once per shot. Bitstrings are indexed by classical bit: the
/// character at position `c` is the qubit measured into clbit `c`. A circuit
/// with no measurements reports every qubit in index order.
///
/// Jobs run inline during `submit()`, so every job the backend knows about
/// is `Completed`. Its result is held until `result()` takes it.
pub struct SimulatorBackend {
    /// Backend configuration.
    config: BackendConfig,
    /// Cached capabilities.
    capabilities: Capabilities,
    /// Completed jobs whose results have not been collected yet.
    jobs: Mutex<FxHashMap<String, ExecutionResult>>,
    /// Sampling RNG.
    rng: Mutex<StdRng>,
}

impl SimulatorBackend {
    /// Create a new simulator backend with default settings.
    pub fn new() -> Self {
        Self::build(BackendConfig::new("statevector"))
    }

    /// Create a simulator with custom max qubits.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self::build(BackendConfig::new("statevector").with_max_qubits(max_qubits))
    }

    /// Create a simulator whose sampling is reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::build(BackendConfig::new("statevector").with_seed(seed))
    }

    fn build(config: BackendConfig) -> Self {
        let max_qubits = config.max_qubits.unwrap_or(DEFAULT_MAX_QUBITS);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut capabilities = Capabilities::simulator(max_qubits);
        capabilities.name.clone_from(&config.name);
        if config.seed.is_some() {
            capabilities = capabilities.with_feature("seeded");
        }

        Self {
            config,
            capabilities,
            jobs: Mutex::new(FxHashMap::default()),
            rng: Mutex::new(rng),
        }
    }

    fn check_circuit(&self, circuit: &Circuit) -> ValidationResult {
        let mut reasons = Vec::new();

        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            reasons.push(format!(
                "Circuit has {} qubits but simulator only supports {}",
                circuit.num_qubits(),
                self.capabilities.num_qubits
            ));
        }

        match circuit.dag().topological_ops() {
            Ok(ops) => {
                for (_, inst) in ops {
                    if let Some(gate) = inst.as_gate() {
                        if !self.capabilities.gate_set.contains(gate.name()) {
                            reasons.push(format!("Unsupported gate '{}'", gate.name()));
                        }
                    }
                }
            }
            Err(e) => reasons.push(e.to_string()),
        }

        if reasons.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid { reasons }
        }
    }

    /// Run simulation synchronously.
    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    fn run_simulation(&self, circuit: &Circuit, shots: u32) -> HalResult<ExecutionResult> {
        let start = Instant::now();

        let num_qubits = circuit.num_qubits();
        debug!("Starting simulation: {} qubits, {} shots", num_qubits, shots);

        let ops = circuit
            .dag()
            .topological_ops()
            .map_err(|e| HalError::InvalidCircuit(e.to_string()))?;

        let mut sv = Statevector::new(num_qubits);
        let mut readout: Vec<Option<usize>> = vec![None; circuit.num_clbits()];
        for (_, inst) in &ops {
            if matches!(inst.kind, InstructionKind::Measure) {
                for (q, c) in inst.qubits.iter().zip(&inst.clbits) {
                    readout[c.index()] = Some(q.index());
                }
            }
            sv.apply(inst);
        }
        if readout.iter().all(Option::is_none) {
            readout = (0..num_qubits).map(Some).collect();
        }

        let mut counts = Counts::new();
        {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            for _ in 0..shots {
                let outcome = sv.sample(&mut *rng);
                let bitstring: String = readout
                    .iter()
                    .map(|slot| match slot {
                        Some(q) if Statevector::qubit_value(outcome, *q) => '1',
                        _ => '0',
                    })
                    .collect();
                counts.insert(bitstring, 1);
            }
        }

        let elapsed = start.elapsed();
        debug!("Simulation completed in {:?}", elapsed);

        Ok(ExecutionResult::new(counts, shots)
            .with_execution_time(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)))
    }

    /// Number of completed jobs whose results have not been taken yet.
    pub fn held_results(&self) -> usize {
        self.jobs().len()
    }

    fn jobs(&self) -> MutexGuard<'_, FxHashMap<String, ExecutionResult>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        Ok(self.check_circuit(circuit))
    }

    #[instrument(skip(self, circuit, parameters))]
    async fn submit(
        &self,
        circuit: &Circuit,
        shots: u32,
        parameters: Option<&HashMap<String, f64>>,
    ) -> HalResult<JobId> {
        if parameters.is_some_and(|p| !p.is_empty()) {
            return Err(HalError::Unsupported(
                "the statevector simulator has no parametric gates".into(),
            ));
        }
        if shots == 0 || shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{shots} (allowed 1..={})",
                self.capabilities.max_shots
            )));
        }
        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            return Err(HalError::CircuitTooLarge(format!(
                "Circuit has {} qubits but simulator only supports {}",
                circuit.num_qubits(),
                self.capabilities.num_qubits
            )));
        }
        self.check_circuit(circuit).into_result()?;

        let job_id = JobId::new(Uuid::new_v4().to_string());
        debug!("Submitted job: {}", job_id);

        let result = self
            .run_simulation(circuit, shots)
            .map_err(|e| HalError::JobFailed(format!("{job_id}: {e}")))?;
        self.jobs().insert(job_id.0.clone(), result);

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        if self.jobs().contains_key(&job_id.0) {
            Ok(JobStatus::Completed)
        } else {
            Err(HalError::JobNotFound(job_id.0.clone()))
        }
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        self.jobs()
            .remove(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        // Already terminal; cancelling a completed job is a no-op.
        self.status(job_id).await.map(drop)
    }
}

impl BackendFactory for SimulatorBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        if config.max_qubits == Some(0) {
            return Err(HalError::Backend("max_qubits must be at least 1".into()));
        }
        Ok(Self::build(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use e91_ir::QubitId;

    fn singlet() -> Circuit {
        let mut circuit = Circuit::with_size("singlet", 2, 0);
        circuit
            .x(QubitId(0))
            .unwrap()
            .h(QubitId(0))
            .unwrap()
            .x(QubitId(1))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .measure_all()
            .unwrap();
        circuit
    }

    #[test]
    fn test_simulator_capabilities() {
        let backend = SimulatorBackend::new();
        let caps = backend.capabilities();

        assert!(caps.is_simulator);
        assert_eq!(caps.num_qubits, DEFAULT_MAX_QUBITS);
        assert!(!caps.has_feature("seeded"));
        assert!(SimulatorBackend::with_seed(3).capabilities().has_feature("seeded"));
    }

    #[tokio::test]
    async fn test_simulator_singlet_state() {
        let backend = SimulatorBackend::with_seed(11);

        let job_id = backend.submit(&singlet(), 1000, None).await.unwrap();
        assert_eq!(backend.status(&job_id).await.unwrap(), JobStatus::Completed);

        let result = backend.wait(&job_id).await.unwrap();
        assert_eq!(result.shots, 1000);

        let counts = &result.counts;
        assert_eq!(counts.get("01") + counts.get("10"), 1000);
        assert!(counts.get("01") > 350 && counts.get("10") > 350);
    }

    #[tokio::test]
    async fn test_result_releases_job() {
        let backend = SimulatorBackend::with_seed(2);

        let job_id = backend.submit(&singlet(), 4, None).await.unwrap();
        assert_eq!(backend.held_results(), 1);
        backend.cancel(&job_id).await.unwrap();
        assert_eq!(backend.status(&job_id).await.unwrap(), JobStatus::Completed);

        assert_eq!(backend.result(&job_id).await.unwrap().shots, 4);
        assert_eq!(backend.held_results(), 0);
        assert!(matches!(
            backend.result(&job_id).await,
            Err(HalError::JobNotFound(_))
        ));
        assert!(matches!(
            backend.status(&job_id).await,
            Err(HalError::JobNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_job_table_stays_empty_across_many_rounds() {
        let backend = SimulatorBackend::with_seed(9);
        let circuit = singlet();

        for _ in 0..2000 {
            let job_id = backend.submit(&circuit, 1, None).await.unwrap();
            let result = backend.wait(&job_id).await.unwrap();
            assert_eq!(result.shots, 1);
        }
        assert_eq!(backend.held_results(), 0);
    }

    #[tokio::test]
    async fn test_same_seed_same_samples() {
        let a = SimulatorBackend::with_seed(5);
        let b = SimulatorBackend::with_seed(5);
        let circuit = singlet();

        let ra = a.wait(&a.submit(&circuit, 64, None).await.unwrap()).await.unwrap();
        let rb = b.wait(&b.submit(&circuit, 64, None).await.unwrap()).await.unwrap();
        assert_eq!(ra.counts, rb.counts);
    }

    #[tokio::test]
    async fn test_readout_follows_clbit_mapping() {
        let mut circuit = Circuit::with_size("swapped", 2, 2);
        circuit
            .x(QubitId(0))
            .unwrap()
            .measure(QubitId(0), e91_ir::ClbitId(1))
            .unwrap()
            .measure(QubitId(1), e91_ir::ClbitId(0))
            .unwrap();

        let backend = SimulatorBackend::new();
        let result = backend
            .wait(&backend.submit(&circuit, 8, None).await.unwrap())
            .await
            .unwrap();
        assert_eq!(result.counts.get("01"), 8);
    }

    #[tokio::test]
    async fn test_simulator_too_many_qubits() {
        let backend = SimulatorBackend::with_max_qubits(5);

        let circuit = Circuit::with_size("test", 10, 0);
        let result = backend.submit(&circuit, 1, None).await;
        assert!(matches!(result, Err(HalError::CircuitTooLarge(_))));

        let validation = backend.validate(&circuit).await.unwrap();
        assert!(!validation.is_valid());
    }

    #[tokio::test]
    async fn test_rejects_parameters_and_zero_shots() {
        let backend = SimulatorBackend::new();
        let circuit = singlet();

        let mut params = HashMap::new();
        params.insert("theta".to_string(), 0.5);
        assert!(matches!(
            backend.submit(&circuit, 1, Some(&params)).await,
            Err(HalError::Unsupported(_))
        ));
        assert!(matches!(
            backend.submit(&circuit, 0, None).await,
            Err(HalError::InvalidShots(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let backend = SimulatorBackend::new();
        let missing = JobId::new("nope");
        assert!(matches!(
            backend.status(&missing).await,
            Err(HalError::JobNotFound(_))
        ));
        assert!(backend.cancel(&missing).await.is_err());
    }

    #[test]
    fn test_from_config() {
        let backend =
            SimulatorBackend::from_config(BackendConfig::new("lab-sim").with_max_qubits(8))
                .unwrap();
        assert_eq!(backend.name(), "lab-sim");
        assert_eq!(backend.capabilities().num_qubits, 8);

        assert!(
            SimulatorBackend::from_config(BackendConfig::new("x").with_max_qubits(0)).is_err()
        );
    }
}
