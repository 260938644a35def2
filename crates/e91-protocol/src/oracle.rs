//! Correlated-pair oracle.
//!
//! A stand-in for a quantum backend that knows what a singlet does: when both
//! halves of a pair are measured in the same basis the results disagree,
//! otherwise each side is an independent fair coin. The oracle reads the
//! bases from the `measurement_basis` Hadamards in the round circuit and
//! ignores every other gate, so it runs blocks far larger than a statevector
//! can hold.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use e91_ir::Circuit;

use crate::backend::{MeasurementBackend, Outcome};
use crate::error::{ProtocolError, ProtocolResult};
use crate::observer::MEASUREMENT_BASIS_LABEL;

/// Samples singlet statistics without simulating amplitudes.
pub struct CorrelatedPairOracle {
    rng: Mutex<StdRng>,
}

impl CorrelatedPairOracle {
    /// Oracle seeded from system entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Oracle with a reproducible sample stream.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Measurement basis of every qubit, read from the labelled Hadamards.
    fn bases(circuit: &Circuit) -> ProtocolResult<Vec<bool>> {
        let mut bases = vec![false; circuit.num_qubits()];
        for (_, inst) in circuit.dag().topological_ops()? {
            if inst
                .as_gate()
                .is_some_and(|g| g.has_label(MEASUREMENT_BASIS_LABEL))
            {
                for q in &inst.qubits {
                    bases[q.index()] ^= true;
                }
            }
        }
        Ok(bases)
    }
}

impl Default for CorrelatedPairOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MeasurementBackend for CorrelatedPairOracle {
    fn name(&self) -> &str {
        "oracle"
    }

    async fn sample(&self, circuit: &Circuit) -> ProtocolResult<Outcome> {
        let qubits = circuit.num_qubits();
        if qubits % 2 != 0 {
            return Err(ProtocolError::UnpairedQubits(qubits));
        }
        let n = qubits / 2;
        let bases = Self::bases(circuit)?;

        let mut bits = vec![false; qubits];
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        for i in 0..n {
            let alice: bool = rng.r#gen();
            let bob = if bases[i] == bases[i + n] {
                !alice
            } else {
                rng.r#gen()
            };
            bits[i] = alice;
            bits[i + n] = bob;
        }
        drop(rng);

        let outcome = Outcome::new(bits);
        trace!(%outcome, "oracle sample");
        Ok(outcome)
    }
}
