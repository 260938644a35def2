//! Property-based tests for circuit construction and composition.
//!
//! Random gate sequences must always leave a well-formed DAG behind, and
//! appending one circuit to another must preserve every operation.

use e91_ir::{Circuit, QubitId};
use proptest::prelude::*;

/// Gate operations that can be applied to a circuit.
#[derive(Debug, Clone)]
enum GateOp {
    H(u32),
    X(u32),
    CX(u32, u32),
}

impl GateOp {
    fn apply(&self, circuit: &mut Circuit) {
        let applied = match *self {
            GateOp::H(q) => circuit.h(QubitId(q)).map(drop),
            GateOp::X(q) => circuit.x(QubitId(q)).map(drop),
            GateOp::CX(a, b) => circuit.cx(QubitId(a), QubitId(b)).map(drop),
        };
        applied.unwrap();
    }
}

/// Generate a gate on `num_qubits` qubits; two-qubit gates use distinct qubits.
fn arb_gate_op(num_qubits: u32) -> impl Strategy<Value = GateOp> {
    let single = prop_oneof![
        (0..num_qubits).prop_map(GateOp::H),
        (0..num_qubits).prop_map(GateOp::X),
    ];
    if num_qubits < 2 {
        return single.boxed();
    }
    let pair = (0..num_qubits, 1..num_qubits).prop_map(move |(a, offset)| (a, (a + offset) % num_qubits));
    prop_oneof![
        single,
        pair.prop_map(|(a, b)| GateOp::CX(a, b)),
    ]
    .boxed()
}

/// Generate a random circuit of 1-6 qubits and 0-20 gates.
fn arb_circuit() -> impl Strategy<Value = (Circuit, usize)> {
    (1_u32..=6).prop_flat_map(|num_qubits| {
        prop::collection::vec(arb_gate_op(num_qubits), 0..=20).prop_map(move |ops| {
            let mut circuit = Circuit::with_size("random", num_qubits, 0);
            for op in &ops {
                op.apply(&mut circuit);
            }
            (circuit, ops.len())
        })
    })
}

proptest! {
    #[test]
    fn random_circuits_are_well_formed((circuit, gates) in arb_circuit()) {
        prop_assert!(circuit.dag().verify_integrity().is_ok());
        prop_assert_eq!(circuit.num_ops(), gates);
        prop_assert!(circuit.depth() <= gates);
        prop_assert_eq!(circuit.dag().topological_ops().unwrap().len(), gates);
    }

    #[test]
    fn measure_all_reads_every_qubit((circuit, gates) in arb_circuit()) {
        let mut circuit = circuit;
        let n = circuit.num_qubits();
        circuit.measure_all().unwrap();

        prop_assert_eq!(circuit.num_clbits(), n);
        prop_assert_eq!(circuit.num_ops(), gates + n);
        prop_assert!(circuit.dag().verify_integrity().is_ok());
    }

    #[test]
    fn append_preserves_operations(
        (first, first_gates) in arb_circuit(),
        (second, second_gates) in arb_circuit(),
    ) {
        let (mut wide, narrow) = if first.num_qubits() >= second.num_qubits() {
            (first, second)
        } else {
            (second, first)
        };
        let (wide_depth, narrow_depth) = (wide.depth(), narrow.depth());

        wide.append(&narrow).unwrap();
        prop_assert_eq!(wide.num_ops(), first_gates + second_gates);
        prop_assert!(wide.depth() <= wide_depth + narrow_depth);
        prop_assert!(wide.dag().verify_integrity().is_ok());
    }

    #[test]
    fn append_rejects_wider_circuit((circuit, _) in arb_circuit()) {
        let mut narrow = Circuit::new("narrow");
        prop_assert!(narrow.append(&circuit).is_err());
    }
}
