//! Observer measurement bases and round composition.

use rand::Rng;

use e91_ir::{Circuit, Gate, StandardGate};

use crate::bits::random_bits;
use crate::error::{ProtocolError, ProtocolResult};
use crate::source::register_width;

/// Label carried by every basis-change Hadamard an observer applies.
pub const MEASUREMENT_BASIS_LABEL: &str = "measurement_basis";

/// Basis choices of both observers for one block. `true` means the X basis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverBases {
    /// Alice's bases.
    pub alice: Vec<bool>,
    /// Bob's bases.
    pub bob: Vec<bool>,
}

impl ObserverBases {
    /// Draw independent bases for Alice and Bob.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Self {
        Self {
            alice: random_bits(rng, n),
            bob: random_bits(rng, n),
        }
    }

    /// Build the observer circuit for these bases.
    pub fn circuit(&self) -> ProtocolResult<Circuit> {
        observer_circuit(&self.alice, &self.bob)
    }
}

/// Build the per-qubit basis rotations for both observers.
///
/// Places a labelled Hadamard on qubit `i` when Alice's basis bit `i` is set
/// and on qubit `i + N` when Bob's is.
pub fn observer_circuit(alice: &[bool], bob: &[bool]) -> ProtocolResult<Circuit> {
    if alice.len() != bob.len() {
        return Err(ProtocolError::LengthMismatch {
            what: "Alice bases vs. Bob bases",
            left: alice.len(),
            right: bob.len(),
        });
    }
    let n = register_width(alice.len())?;

    let mut circuit = Circuit::new("observers");
    let alice_qubits = circuit.add_qreg("alice", n);
    let bob_qubits = circuit.add_qreg("bob", n);

    let rotations = alice_qubits
        .into_iter()
        .zip(alice)
        .chain(bob_qubits.into_iter().zip(bob))
        .filter(|&(_, &x)| x)
        .map(|(q, _)| q);
    for q in rotations {
        circuit.gate(basis_change(), [q])?;
    }

    Ok(circuit)
}

fn basis_change() -> Gate {
    Gate::standard(StandardGate::H).with_label(MEASUREMENT_BASIS_LABEL)
}

/// Compose a full round: emitter, barrier, observers, then a measurement of
/// every qubit into the classical bit with the same index.
pub fn compose_round(emitter: &Circuit, observers: &Circuit) -> ProtocolResult<Circuit> {
    if emitter.num_qubits() != observers.num_qubits() {
        return Err(ProtocolError::LengthMismatch {
            what: "emitter qubits vs. observer qubits",
            left: emitter.num_qubits(),
            right: observers.num_qubits(),
        });
    }
    if emitter.num_qubits() % 2 != 0 {
        return Err(ProtocolError::UnpairedQubits(emitter.num_qubits()));
    }
    let n = register_width(emitter.num_qubits() / 2)?;

    let mut round = Circuit::new("e91_round");
    round.add_qreg("alice", n);
    round.add_qreg("bob", n);
    round.append(emitter)?;
    round.barrier_all()?;
    round.append(observers)?;
    round.measure_all()?;
    Ok(round)
}
