//! Quantum gate types.

use serde::{Deserialize, Serialize};

/// Standard gates with known semantics.
///
/// Only the gates an E91 round is built from: the emitter prepares the
/// singlet with X, H and CX, and the observers rotate bases with H.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardGate {
    /// Pauli-X gate.
    X,
    /// Hadamard gate.
    H,
    /// Controlled-X (CNOT) gate.
    CX,
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::X => "x",
            StandardGate::H => "h",
            StandardGate::CX => "cx",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::X | StandardGate::H => 1,
            StandardGate::CX => 2,
        }
    }
}

/// A gate with associated metadata.
///
/// The label is free-form; the E91 observer circuit uses it to mark the
/// Hadamards that select a measurement basis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    /// The kind of gate.
    pub kind: StandardGate,
    /// Optional label for the gate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Gate {
    /// Create a new gate from a standard gate.
    pub fn standard(gate: StandardGate) -> Self {
        Self {
            kind: gate,
            label: None,
        }
    }

    /// Add a label to the gate.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Check whether this gate carries the given label.
    pub fn has_label(&self, label: &str) -> bool {
        self.label.as_deref() == Some(label)
    }

    /// Get the name of this gate.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.kind.num_qubits()
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::standard(gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_gate_properties() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::X.num_qubits(), 1);
        assert_eq!(StandardGate::CX.num_qubits(), 2);
        assert_eq!(StandardGate::CX.name(), "cx");
    }

    #[test]
    fn test_gate_creation() {
        let h = Gate::standard(StandardGate::H);
        assert_eq!(h.name(), "h");
        assert_eq!(h.num_qubits(), 1);
        assert!(h.label.is_none());

        let h_labeled = Gate::standard(StandardGate::H).with_label("measurement_basis");
        assert!(h_labeled.has_label("measurement_basis"));
        assert!(!h_labeled.has_label("other"));
    }

    #[test]
    fn test_label_is_skipped_when_absent() {
        let json = serde_json::to_string(&Gate::standard(StandardGate::X)).unwrap();
        assert!(!json.contains("label"));
    }
}
