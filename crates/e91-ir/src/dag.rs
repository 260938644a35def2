//! DAG-based circuit representation.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex as PetNodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};

/// Node index type for the circuit DAG.
pub type NodeIndex = PetNodeIndex<u32>;

/// A node in the circuit DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DagNode {
    /// Input node for a wire.
    In(WireId),
    /// Output node for a wire.
    Out(WireId),
    /// Operation node containing an instruction.
    Op(Instruction),
}

impl DagNode {
    /// Check if this is an operation node.
    #[inline]
    pub fn is_op(&self) -> bool {
        matches!(self, DagNode::Op(_))
    }

    /// Get the instruction if this is an operation node.
    #[inline]
    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            DagNode::Op(inst) => Some(inst),
            _ => None,
        }
    }
}

/// Identifier for a wire in the DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireId {
    /// A quantum wire.
    Qubit(QubitId),
    /// A classical wire.
    Clbit(ClbitId),
}

impl From<QubitId> for WireId {
    fn from(q: QubitId) -> Self {
        WireId::Qubit(q)
    }
}

impl From<ClbitId> for WireId {
    fn from(c: ClbitId) -> Self {
        WireId::Clbit(c)
    }
}

/// An edge in the circuit DAG representing a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagEdge {
    /// The wire this edge represents.
    pub wire: WireId,
}

/// DAG-based circuit representation.
///
/// The circuit is represented as a directed acyclic graph where:
/// - Nodes are either input nodes, output nodes, or operation nodes
/// - Edges represent wires (quantum or classical)
/// - Each wire has exactly one input and one output node
/// - Operations are connected to wires in the order they were applied
///
/// `wire_front` maps each wire to the node just before its output node, so
/// appending an operation is O(1) per operand.
#[derive(Debug, Clone, Default)]
pub struct CircuitDag {
    /// The underlying graph.
    graph: DiGraph<DagNode, DagEdge, u32>,
    /// Map from wire to its input node.
    inputs: FxHashMap<WireId, NodeIndex>,
    /// Map from wire to its output node.
    outputs: FxHashMap<WireId, NodeIndex>,
    /// Wire front: maps each wire to the node just before the output node.
    wire_front: FxHashMap<WireId, NodeIndex>,
    num_qubits: usize,
    num_clbits: usize,
}

impl CircuitDag {
    /// Create a new empty circuit DAG.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a qubit to the circuit.
    pub fn add_qubit(&mut self, qubit: QubitId) {
        if self.add_wire(WireId::Qubit(qubit)) {
            self.num_qubits += 1;
        }
    }

    /// Add a classical bit to the circuit.
    pub fn add_clbit(&mut self, clbit: ClbitId) {
        if self.add_wire(WireId::Clbit(clbit)) {
            self.num_clbits += 1;
        }
    }

    /// Returns `false` when the wire already exists.
    fn add_wire(&mut self, wire: WireId) -> bool {
        if self.inputs.contains_key(&wire) {
            return false;
        }
        let in_node = self.graph.add_node(DagNode::In(wire));
        let out_node = self.graph.add_node(DagNode::Out(wire));
        self.graph.add_edge(in_node, out_node, DagEdge { wire });
        self.inputs.insert(wire, in_node);
        self.outputs.insert(wire, out_node);
        self.wire_front.insert(wire, in_node);
        true
    }

    /// Check whether a qubit belongs to this DAG.
    pub fn contains_qubit(&self, qubit: QubitId) -> bool {
        self.inputs.contains_key(&WireId::Qubit(qubit))
    }

    /// Check whether a classical bit belongs to this DAG.
    pub fn contains_clbit(&self, clbit: ClbitId) -> bool {
        self.inputs.contains_key(&WireId::Clbit(clbit))
    }

    /// Apply an instruction to the circuit.
    #[allow(clippy::cast_possible_truncation)]
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        let gate_name = match &instruction.kind {
            InstructionKind::Gate(gate) => Some(gate.name().to_string()),
            _ => None,
        };

        if let InstructionKind::Gate(gate) = &instruction.kind {
            let expected = gate.num_qubits() as usize;
            let got = instruction.qubits.len();
            if expected != got {
                return Err(IrError::QubitCountMismatch {
                    gate_name: gate.name().to_string(),
                    expected: expected as u32,
                    got: got as u32,
                });
            }
        }

        for &qubit in &instruction.qubits {
            if !self.contains_qubit(qubit) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        for &clbit in &instruction.clbits {
            if !self.contains_clbit(clbit) {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        let wires: Vec<WireId> = instruction
            .qubits
            .iter()
            .map(|&q| WireId::Qubit(q))
            .chain(instruction.clbits.iter().map(|&c| WireId::Clbit(c)))
            .collect();

        let op_node = self.graph.add_node(DagNode::Op(instruction));
        for wire in wires {
            self.splice(wire, op_node)?;
        }

        Ok(op_node)
    }

    /// Insert `op_node` between the wire front and the wire's output node.
    fn splice(&mut self, wire: WireId, op_node: NodeIndex) -> IrResult<()> {
        let out_node = self.outputs[&wire];
        let prev_node = self.wire_front[&wire];

        let edge_id = self
            .graph
            .edges_directed(prev_node, Direction::Outgoing)
            .find(|e| e.weight().wire == wire && e.target() == out_node)
            .map(|e| e.id())
            .ok_or_else(|| {
                IrError::InvalidDag(format!(
                    "Missing edge from predecessor to output for wire {wire:?}"
                ))
            })?;

        self.graph.remove_edge(edge_id);
        self.graph.add_edge(prev_node, op_node, DagEdge { wire });
        self.graph.add_edge(op_node, out_node, DagEdge { wire });
        self.wire_front.insert(wire, op_node);
        Ok(())
    }

    /// Operations in topological order.
    pub fn topological_ops(&self) -> IrResult<Vec<(NodeIndex, &Instruction)>> {
        let order = petgraph::algo::toposort(&self.graph, None)
            .map_err(|_| IrError::InvalidDag("cycle detected in circuit graph".into()))?;

        Ok(order
            .into_iter()
            .filter_map(|idx| self.graph[idx].instruction().map(|inst| (idx, inst)))
            .collect())
    }

    /// Get an instruction by node index.
    #[inline]
    pub fn get_instruction(&self, node: NodeIndex) -> Option<&Instruction> {
        self.graph.node_weight(node).and_then(DagNode::instruction)
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Get the number of classical bits.
    #[inline]
    pub fn num_clbits(&self) -> usize {
        self.num_clbits
    }

    /// Get the number of operations.
    ///
    /// Computed as total nodes minus input and output nodes (2 per wire).
    #[inline]
    pub fn num_ops(&self) -> usize {
        self.graph
            .node_count()
            .saturating_sub(2 * self.inputs.len())
    }

    /// Calculate the circuit depth.
    pub fn depth(&self) -> usize {
        let Ok(order) = petgraph::algo::toposort(&self.graph, None) else {
            return 0;
        };

        let mut depths: FxHashMap<NodeIndex, usize> =
            FxHashMap::with_capacity_and_hasher(order.len(), Default::default());
        let mut max_depth = 0usize;

        for node in order {
            let max_pred_depth = self
                .graph
                .edges_directed(node, Direction::Incoming)
                .map(|e| depths.get(&e.source()).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);

            let node_depth = if self.graph[node].is_op() {
                max_pred_depth + 1
            } else {
                max_pred_depth
            };

            max_depth = max_depth.max(node_depth);
            depths.insert(node, node_depth);
        }

        max_depth
    }

    /// Iterate over qubits in ascending id order.
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        let mut ids: Vec<QubitId> = self
            .inputs
            .keys()
            .filter_map(|w| match w {
                WireId::Qubit(q) => Some(*q),
                WireId::Clbit(_) => None,
            })
            .collect();
        ids.sort_unstable();
        ids.into_iter()
    }

    /// Iterate over classical bits in ascending id order.
    pub fn clbits(&self) -> impl Iterator<Item = ClbitId> + '_ {
        let mut ids: Vec<ClbitId> = self
            .inputs
            .keys()
            .filter_map(|w| match w {
                WireId::Clbit(c) => Some(*c),
                WireId::Qubit(_) => None,
            })
            .collect();
        ids.sort_unstable();
        ids.into_iter()
    }

    /// Get a reference to the underlying graph.
    pub fn graph(&self) -> &DiGraph<DagNode, DagEdge, u32> {
        &self.graph
    }

    /// Verify the structural integrity of the DAG.
    ///
    /// Checks that the graph is acyclic and that every wire forms an
    /// unbroken path from its In node to its Out node.
    pub fn verify_integrity(&self) -> IrResult<()> {
        if petgraph::algo::is_cyclic_directed(&self.graph) {
            return Err(IrError::InvalidDag("Graph contains a cycle".into()));
        }

        for (&wire, &in_node) in &self.inputs {
            let out_node = self.outputs.get(&wire).copied().ok_or_else(|| {
                IrError::InvalidDag(format!("Wire {wire:?} has an In node but no Out node"))
            })?;
            self.walk_wire(wire, in_node, out_node)?;
        }

        Ok(())
    }

    fn walk_wire(&self, wire: WireId, from: NodeIndex, to: NodeIndex) -> IrResult<()> {
        let max_steps = self.graph.node_count();
        let mut current = from;

        for _ in 0..=max_steps {
            if current == to {
                return Ok(());
            }
            current = self
                .graph
                .edges_directed(current, Direction::Outgoing)
                .find(|e| e.weight().wire == wire)
                .map(|e| e.target())
                .ok_or_else(|| {
                    IrError::InvalidDag(format!(
                        "Wire {wire:?} is broken: no outgoing edge from node {current:?}"
                    ))
                })?;
        }

        Err(IrError::InvalidDag(format!(
            "Wire {wire:?} has too many steps"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::StandardGate;

    #[test]
    fn test_empty_dag() {
        let dag = CircuitDag::new();
        assert_eq!(dag.num_qubits(), 0);
        assert_eq!(dag.num_clbits(), 0);
        assert_eq!(dag.num_ops(), 0);
        assert_eq!(dag.depth(), 0);
    }

    #[test]
    fn test_add_qubits_is_idempotent() {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));
        dag.add_qubit(QubitId(1));
        dag.add_qubit(QubitId(1));
        assert_eq!(dag.num_qubits(), 2);
        assert_eq!(dag.qubits().collect::<Vec<_>>(), vec![QubitId(0), QubitId(1)]);
    }

    #[test]
    fn test_singlet_pair_depth() {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));
        dag.add_qubit(QubitId(1));

        dag.apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(0)))
            .unwrap();
        dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0)))
            .unwrap();
        dag.apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(1)))
            .unwrap();
        dag.apply(Instruction::two_qubit_gate(
            StandardGate::CX,
            QubitId(0),
            QubitId(1),
        ))
        .unwrap();

        assert_eq!(dag.num_ops(), 4);
        assert_eq!(dag.depth(), 3);
    }

    #[test]
    fn test_topological_ops_respect_wire_order() {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));
        dag.apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(0)))
            .unwrap();
        dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0)))
            .unwrap();

        let names: Vec<_> = dag
            .topological_ops()
            .unwrap()
            .into_iter()
            .map(|(_, inst)| inst.name().to_string())
            .collect();
        assert_eq!(names, vec!["x", "h"]);
    }

    #[test]
    fn test_gate_arity_mismatch() {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));
        dag.add_qubit(QubitId(1));

        let result = dag.apply(Instruction::gate(StandardGate::CX, [QubitId(0)]));

        match result {
            Err(IrError::QubitCountMismatch {
                gate_name,
                expected,
                got,
            }) => {
                assert_eq!(gate_name, "cx");
                assert_eq!(expected, 2);
                assert_eq!(got, 1);
            }
            other => panic!("Expected QubitCountMismatch error, got {other:?}"),
        }
    }

    #[test]
    fn test_qubit_not_found_with_context() {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));

        let inst = Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(99));
        match dag.apply(inst) {
            Err(IrError::QubitNotFound { qubit, gate_name }) => {
                assert_eq!(qubit, QubitId(99));
                assert_eq!(gate_name, Some("cx".to_string()));
            }
            other => panic!("Expected QubitNotFound error, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_qubit_rejected() {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));

        let inst = Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(0));
        assert!(matches!(
            dag.apply(inst),
            Err(IrError::DuplicateQubit { .. })
        ));
    }

    #[test]
    fn test_verify_integrity_with_measurement() {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));
        dag.add_qubit(QubitId(1));
        dag.add_clbit(ClbitId(0));
        dag.add_clbit(ClbitId(1));
        dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0)))
            .unwrap();
        dag.apply(Instruction::two_qubit_gate(
            StandardGate::CX,
            QubitId(0),
            QubitId(1),
        ))
        .unwrap();
        dag.apply(
            Instruction::measure_all([QubitId(0), QubitId(1)], [ClbitId(0), ClbitId(1)]).unwrap(),
        )
        .unwrap();

        dag.verify_integrity().unwrap();
        assert_eq!(dag.depth(), 3);
    }
}
