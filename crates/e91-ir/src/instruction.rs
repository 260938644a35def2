//! Circuit instructions combining gates with operands.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, StandardGate};
use crate::qubit::{ClbitId, QubitId};

/// The kind of instruction in a circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// A quantum gate operation.
    Gate(Gate),
    /// Measurement operation.
    Measure,
    /// Barrier (synchronization point).
    Barrier,
}

/// A complete instruction with operands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// The kind of instruction.
    pub kind: InstructionKind,
    /// Qubits this instruction operates on.
    pub qubits: Vec<QubitId>,
    /// Classical bits this instruction operates on (for measure).
    pub clbits: Vec<ClbitId>,
}

impl Instruction {
    /// Create a gate instruction.
    pub fn gate(gate: impl Into<Gate>, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Gate(gate.into()),
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// Create a single-qubit gate instruction.
    pub fn single_qubit_gate(gate: StandardGate, qubit: QubitId) -> Self {
        Self::gate(gate, [qubit])
    }

    /// Create a two-qubit gate instruction.
    pub fn two_qubit_gate(gate: StandardGate, q1: QubitId, q2: QubitId) -> Self {
        Self::gate(gate, [q1, q2])
    }

    /// Create a measurement instruction.
    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self {
            kind: InstructionKind::Measure,
            qubits: vec![qubit],
            clbits: vec![clbit],
        }
    }

    /// Create a multi-qubit measurement instruction.
    ///
    /// Returns an error if the number of qubits and classical bits do not match.
    pub fn measure_all(
        qubits: impl IntoIterator<Item = QubitId>,
        clbits: impl IntoIterator<Item = ClbitId>,
    ) -> IrResult<Self> {
        let qubits: Vec<_> = qubits.into_iter().collect();
        let clbits: Vec<_> = clbits.into_iter().collect();
        if qubits.len() != clbits.len() {
            return Err(IrError::InvalidDag(format!(
                "measure_all: qubit count ({}) does not match clbit count ({})",
                qubits.len(),
                clbits.len(),
            )));
        }
        Ok(Self {
            kind: InstructionKind::Measure,
            qubits,
            clbits,
        })
    }

    /// Create a barrier instruction.
    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Barrier,
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// Check if this is a gate instruction.
    pub fn is_gate(&self) -> bool {
        matches!(self.kind, InstructionKind::Gate(_))
    }

    /// Check if this is a measurement.
    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    /// Check if this is a barrier.
    pub fn is_barrier(&self) -> bool {
        matches!(self.kind, InstructionKind::Barrier)
    }

    /// Get the gate if this is a gate instruction.
    pub fn as_gate(&self) -> Option<&Gate> {
        match &self.kind {
            InstructionKind::Gate(g) => Some(g),
            _ => None,
        }
    }

    /// Get the name of the instruction.
    pub fn name(&self) -> &str {
        match &self.kind {
            InstructionKind::Gate(g) => g.name(),
            InstructionKind::Measure => "measure",
            InstructionKind::Barrier => "barrier",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        let qubits: Vec<String> = self.qubits.iter().map(ToString::to_string).collect();
        if !qubits.is_empty() {
            write!(f, " {}", qubits.join(", "))?;
        }
        if !self.clbits.is_empty() {
            let clbits: Vec<String> = self.clbits.iter().map(ToString::to_string).collect();
            write!(f, " -> {}", clbits.join(", "))?;
        }
        if let Some(label) = self.as_gate().and_then(|g| g.label.as_deref()) {
            write!(f, "  # {label}")?;
        }
        Ok(())
    }
}
