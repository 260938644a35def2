//! Measurement statistics of the round circuits on the statevector.

use e91_adapter_sim::Statevector;
use e91_ir::{Circuit, QubitId};
use e91_protocol::{compose_round, emitter_circuit, observer_circuit};

fn run(circuit: &Circuit) -> Statevector {
    let mut state = Statevector::new(circuit.num_qubits());
    for (_, inst) in circuit.dag().topological_ops().unwrap() {
        state.apply(inst);
    }
    state
}

/// Probability that qubits `a` and `b` read the same value.
fn agreement(state: &Statevector, a: usize, b: usize) -> f64 {
    state
        .probabilities()
        .iter()
        .enumerate()
        .filter(|&(idx, _)| Statevector::qubit_value(idx, a) == Statevector::qubit_value(idx, b))
        .map(|(_, p)| p)
        .sum()
}

#[test]
fn test_emitter_choice_does_not_change_distribution() {
    for alice_basis in [false, true] {
        for bob_basis in [false, true] {
            let observers = observer_circuit(&[alice_basis], &[bob_basis]).unwrap();
            let reference = run(&compose_round(
                &emitter_circuit(&[false], &[false]).unwrap(),
                &observers,
            )
            .unwrap())
            .probabilities();

            for (bit, basis) in [(false, true), (true, false), (true, true)] {
                let emitter = emitter_circuit(&[bit], &[basis]).unwrap();
                let probs = run(&compose_round(&emitter, &observers).unwrap()).probabilities();
                for (p, q) in probs.iter().zip(&reference) {
                    assert!(
                        (p - q).abs() < 1e-10,
                        "bit={bit} basis={basis} observers=({alice_basis},{bob_basis})"
                    );
                }
            }
        }
    }
}

#[test]
fn test_matching_bases_always_disagree() {
    for basis in [false, true] {
        for (bit, source_basis) in [(false, false), (false, true), (true, false), (true, true)] {
            let emitter = emitter_circuit(&[bit], &[source_basis]).unwrap();
            let observers = observer_circuit(&[basis], &[basis]).unwrap();
            let state = run(&compose_round(&emitter, &observers).unwrap());
            assert!(agreement(&state, 0, 1) < 1e-10);
        }
    }
}

#[test]
fn test_differing_bases_are_uncorrelated() {
    let emitter = emitter_circuit(&[true], &[true]).unwrap();
    let observers = observer_circuit(&[false], &[true]).unwrap();
    let state = run(&compose_round(&emitter, &observers).unwrap());
    assert!((agreement(&state, 0, 1) - 0.5).abs() < 1e-10);
}

#[test]
fn test_rotating_before_entangling_loses_correlation() {
    // Basis rotation on Alice's half before the CX yields a product state.
    let mut emitter = Circuit::new("emitter");
    emitter.add_qreg("alice", 1);
    emitter.add_qreg("bob", 1);
    let (a, b) = (QubitId(0), QubitId(1));
    emitter.x(a).unwrap().h(a).unwrap().x(b).unwrap();
    emitter.h(a).unwrap();
    emitter.cx(a, b).unwrap();

    let observers = observer_circuit(&[true], &[true]).unwrap();
    let state = run(&compose_round(&emitter, &observers).unwrap());
    assert!((agreement(&state, 0, 1) - 0.5).abs() < 1e-10);
}

#[test]
fn test_block_pairs_are_independent() {
    let emitter = emitter_circuit(&[false, true, false], &[true, false, false]).unwrap();
    let observers = observer_circuit(&[true, false, true], &[true, false, false]).unwrap();
    let state = run(&compose_round(&emitter, &observers).unwrap());

    assert!(agreement(&state, 0, 3) < 1e-10);
    assert!(agreement(&state, 1, 4) < 1e-10);
    assert!((agreement(&state, 2, 5) - 0.5).abs() < 1e-10);
    assert!((agreement(&state, 0, 1) - 0.5).abs() < 1e-10);
}
