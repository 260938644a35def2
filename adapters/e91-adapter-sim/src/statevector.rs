//! Statevector simulation engine.

use num_complex::Complex64;
use rand::Rng;

use e91_ir::{Instruction, InstructionKind, StandardGate};

/// A statevector representing a quantum state.
///
/// Basis index bit `q` holds the value of qubit `q`.
#[derive(Debug, Clone)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Get the amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Probability of each computational basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// Apply an instruction to the statevector.
    ///
    /// Measurements and barriers leave the state untouched; sampling happens
    /// once, after the whole circuit.
    pub fn apply(&mut self, instruction: &Instruction) {
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let qubits: Vec<_> = instruction.qubits.iter().map(|q| q.index()).collect();
                self.apply_standard_gate(gate.kind, &qubits);
            }
            InstructionKind::Measure | InstructionKind::Barrier => {}
        }
    }

    fn apply_standard_gate(&mut self, gate: StandardGate, qubits: &[usize]) {
        match gate {
            StandardGate::X => self.apply_x(qubits[0]),
            StandardGate::H => self.apply_h(qubits[0]),
            StandardGate::CX => self.apply_cx(qubits[0], qubits[1]),
        }
    }

    // =========================================================================
    // Single-qubit gate implementations
    // =========================================================================

    fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                self.amplitudes.swap(i, i | mask);
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[j] = sqrt2_inv * (a - b);
            }
        }
    }

    // =========================================================================
    // Two-qubit gate implementations
    // =========================================================================

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }

    /// Sample a computational basis state.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let r: f64 = rng.r#gen();

        let mut cumulative = 0.0;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            cumulative += amp.norm_sqr();
            if r < cumulative {
                return i;
            }
        }

        // Rounding can leave the cumulative sum a hair below 1.0.
        self.amplitudes
            .iter()
            .rposition(|a| a.norm_sqr() > 0.0)
            .unwrap_or(0)
    }

    /// Read qubit `qubit` out of a sampled basis index.
    #[inline]
    pub fn qubit_value(outcome: usize, qubit: usize) -> bool {
        (outcome >> qubit) & 1 == 1
    }
}
