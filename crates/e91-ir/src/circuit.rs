//! High-level circuit builder API.

use std::fmt;

use crate::dag::CircuitDag;
use crate::error::{IrError, IrResult};
use crate::gate::{Gate, StandardGate};
use crate::instruction::Instruction;
use crate::qubit::{Clbit, ClbitId, Qubit, QubitId};

/// A quantum circuit.
///
/// This provides a high-level API for building quantum circuits,
/// with convenient methods for the gates a protocol round needs.
#[derive(Debug, Clone)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Qubits in the circuit.
    qubits: Vec<Qubit>,
    /// Classical bits in the circuit.
    clbits: Vec<Clbit>,
    /// The underlying DAG representation.
    dag: CircuitDag,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            clbits: vec![],
            dag: CircuitDag::new(),
        }
    }

    /// Create a circuit with a given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_qubits {
            circuit.add_qubit();
        }
        for _ in 0..num_clbits {
            circuit.add_clbit();
        }
        circuit
    }

    fn next_qubit_id(&self) -> QubitId {
        QubitId(self.qubits.len() as u32)
    }

    fn next_clbit_id(&self) -> ClbitId {
        ClbitId(self.clbits.len() as u32)
    }

    /// Add a single qubit to the circuit.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = self.next_qubit_id();
        self.qubits.push(Qubit::new(id));
        self.dag.add_qubit(id);
        id
    }

    /// Add a quantum register with multiple qubits.
    ///
    /// Register qubits are numbered after any qubits already present, so
    /// `add_qreg("alice", n)` followed by `add_qreg("bob", n)` yields Alice on
    /// `0..n` and Bob on `n..2n`.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> Vec<QubitId> {
        let name = name.into();
        (0..size)
            .map(|i| {
                let id = self.next_qubit_id();
                self.qubits.push(Qubit::with_register(id, &name, i));
                self.dag.add_qubit(id);
                id
            })
            .collect()
    }

    /// Add a single classical bit to the circuit.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = self.next_clbit_id();
        self.clbits.push(Clbit::new(id));
        self.dag.add_clbit(id);
        id
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::H, qubit)
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::X, qubit)
    }

    fn single(&mut self, gate: StandardGate, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag
            .apply(Instruction::single_qubit_gate(gate, qubit))?;
        Ok(self)
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.dag
            .apply(Instruction::two_qubit_gate(StandardGate::CX, control, target))?;
        Ok(self)
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Apply an arbitrary (possibly labelled) gate.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::gate(gate, qubits))?;
        Ok(self)
    }

    /// Measure a qubit to a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::measure(qubit, clbit))?;
        Ok(self)
    }

    /// Measure every qubit `i` into classical bit `i`, adding classical bits
    /// as needed.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        while self.clbits.len() < self.qubits.len() {
            self.add_clbit();
        }

        let qubits: Vec<_> = self.qubits.iter().map(|q| q.id).collect();
        let clbits: Vec<_> = self
            .clbits
            .iter()
            .map(|c| c.id)
            .take(qubits.len())
            .collect();

        self.dag.apply(Instruction::measure_all(qubits, clbits)?)?;
        Ok(self)
    }

    /// Apply a barrier to specified qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::barrier(qubits))?;
        Ok(self)
    }

    /// Apply a barrier to all qubits.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let qubits: Vec<_> = self.qubits.iter().map(|q| q.id).collect();
        self.barrier(qubits)
    }

    /// Append every operation of `other` onto this circuit, qubit for qubit.
    ///
    /// `other` may not use more qubits than this circuit has. Classical bits
    /// are added to this circuit if `other` needs more of them.
    pub fn append(&mut self, other: &Circuit) -> IrResult<&mut Self> {
        if other.num_qubits() > self.num_qubits() {
            return Err(IrError::CompositionMismatch {
                target: self.name.clone(),
                target_qubits: self.num_qubits(),
                other: other.name.clone(),
                other_qubits: other.num_qubits(),
            });
        }
        while self.clbits.len() < other.clbits.len() {
            self.add_clbit();
        }

        for (_, inst) in other.dag.topological_ops()? {
            self.dag.apply(inst.clone())?;
        }
        Ok(self)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    /// Get the number of operations.
    pub fn num_ops(&self) -> usize {
        self.dag.num_ops()
    }

    /// Get the circuit depth.
    pub fn depth(&self) -> usize {
        self.dag.depth()
    }

    /// Get a reference to the underlying DAG.
    pub fn dag(&self) -> &CircuitDag {
        &self.dag
    }

    /// Get the qubits in the circuit.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Get the classical bits in the circuit.
    pub fn clbits(&self) -> &[Clbit] {
        &self.clbits
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "circuit {} ({} qubits, {} clbits, depth {})",
            self.name,
            self.num_qubits(),
            self.num_clbits(),
            self.depth()
        )?;
        let ops = self.dag.topological_ops().map_err(|_| fmt::Error)?;
        for (_, inst) in ops {
            writeln!(f, "  {inst}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::InstructionKind;

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
            .unwrap();
        circuit
    }

    #[test]
    fn test_new_circuit() {
        let circuit = Circuit::new("test");
        assert_eq!(circuit.name(), "test");
        assert_eq!(circuit.num_qubits(), 0);
        assert_eq!(circuit.num_clbits(), 0);
    }

    #[test]
    fn test_circuit_with_size() {
        let circuit = Circuit::with_size("test", 3, 2);
        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(circuit.num_clbits(), 2);
    }

    #[test]
    fn test_alice_and_bob_registers() {
        let mut circuit = Circuit::new("round");
        let alice = circuit.add_qreg("alice", 3);
        let bob = circuit.add_qreg("bob", 3);

        assert_eq!(alice, vec![QubitId(0), QubitId(1), QubitId(2)]);
        assert_eq!(bob, vec![QubitId(3), QubitId(4), QubitId(5)]);
        assert_eq!(circuit.qubits()[4].to_string(), "bob[1]");
    }

    #[test]
    fn test_singlet_depth() {
        let mut circuit = singlet();
        assert_eq!(circuit.depth(), 3);
        circuit.measure_all().unwrap();
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.depth(), 4);
    }

    #[test]
    fn test_append_preserves_order() {
        let mut observer = Circuit::with_size("observer", 2, 0);
        observer
            .gate(
                Gate::standard(StandardGate::H).with_label("measurement_basis"),
                [QubitId(1)],
            )
            .unwrap();

        let mut round = singlet();
        round.append(&observer).unwrap();

        let ops = round.dag().topological_ops().unwrap();
        let last_on_q1 = ops
            .iter()
            .filter(|(_, inst)| inst.qubits.contains(&QubitId(1)))
            .last()
            .map(|(_, inst)| (*inst).clone())
            .unwrap();
        assert!(matches!(
            &last_on_q1.kind,
            InstructionKind::Gate(g) if g.has_label("measurement_basis")
        ));
        assert_eq!(round.num_ops(), 5);
    }

    #[test]
    fn test_append_rejects_wider_circuit() {
        let mut narrow = Circuit::with_size("narrow", 2, 0);
        let wide = Circuit::with_size("wide", 4, 0);
        assert!(matches!(
            narrow.append(&wide),
            Err(IrError::CompositionMismatch {
                target_qubits: 2,
                other_qubits: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_display_lists_instructions() {
        let text = singlet().to_string();
        assert!(text.starts_with("circuit singlet (2 qubits, 0 clbits, depth 3)"));
        assert!(text.contains("  cx q0, q1"));
    }
}
