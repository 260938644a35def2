//! Backend capability introspection.
//!
//! [`Capabilities`] describe what a backend can run: how many qubits it
//! holds, which gates it understands, and how many shots one job may ask
//! for. The protocol layer checks them before submitting a round.

use serde::{Deserialize, Serialize};

/// Capabilities of a measurement backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Supported gate set (OpenQASM 3 naming convention).
    pub gate_set: GateSet,
    /// Maximum number of shots per job.
    pub max_shots: u32,
    /// Whether this is a simulator (`true`) or real hardware (`false`).
    pub is_simulator: bool,
    /// Additional capability flags, e.g. `"statevector"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Capabilities {
    /// Create capabilities for a statevector simulator.
    pub fn simulator(num_qubits: u32) -> Self {
        Self {
            name: "statevector".into(),
            num_qubits,
            gate_set: GateSet::standard(),
            max_shots: 100_000,
            is_simulator: true,
            features: vec!["statevector".into()],
        }
    }

    /// Add a feature flag.
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.push(feature.into());
        self
    }

    /// Check whether a feature flag is present.
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

/// Gate set supported by a backend.
///
/// Gate names follow the OpenQASM 3 naming convention (lowercase).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSet {
    /// Single-qubit gates supported.
    pub single_qubit: Vec<String>,
    /// Two-qubit gates supported.
    pub two_qubit: Vec<String>,
}

impl GateSet {
    /// Every gate the circuit IR can express.
    pub fn standard() -> Self {
        Self {
            single_qubit: vec!["x".into(), "h".into()],
            two_qubit: vec!["cx".into()],
        }
    }

    /// Check if a gate is supported.
    pub fn contains(&self, gate: &str) -> bool {
        self.single_qubit.iter().any(|g| g == gate) || self.two_qubit.iter().any(|g| g == gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_simulator() {
        let caps = Capabilities::simulator(20);
        assert!(caps.is_simulator);
        assert_eq!(caps.num_qubits, 20);
        assert!(caps.has_feature("statevector"));
        assert!(caps.gate_set.contains("h"));
        assert!(caps.gate_set.contains("cx"));
        assert!(!caps.gate_set.contains("rz"));
        assert!(!caps.gate_set.contains("swap"));
    }

    #[test]
    fn test_with_feature() {
        let caps = Capabilities::simulator(4).with_feature("seeded");
        assert!(caps.has_feature("seeded"));
    }
}
