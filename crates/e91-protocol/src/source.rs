//! Entangled pair source.
//!
//! The source prepares `N` singlet pairs over `2N` qubits and rotates both
//! halves of pair `i` by `U = H^basis · X^bit`. Since `U ⊗ U` maps the
//! singlet to `det(U)` times itself, the emitted state is the same for every
//! choice of bits; the random bits only change the gate sequence.

use rand::Rng;

use e91_ir::{Circuit, QubitId};

use crate::bits::random_bits;
use crate::error::{ProtocolError, ProtocolResult};

/// Random source bits for one block of pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBlock {
    /// Bit-flip choice per pair.
    pub data: Vec<bool>,
    /// Hadamard choice per pair.
    pub basis: Vec<bool>,
}

impl SourceBlock {
    /// Draw a fresh block of `n` pairs.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Self {
        Self {
            data: random_bits(rng, n),
            basis: random_bits(rng, n),
        }
    }

    /// Number of pairs in the block.
    pub fn len(&self) -> usize {
        self.basis.len()
    }

    /// Check whether the block holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.basis.is_empty()
    }

    /// Build the emitter circuit for this block.
    pub fn emitter_circuit(&self) -> ProtocolResult<Circuit> {
        emitter_circuit(&self.data, &self.basis)
    }
}

/// Width of one party's register for a block of `pairs` pairs.
pub(crate) fn register_width(pairs: usize) -> ProtocolResult<u32> {
    u32::try_from(pairs).map_err(|_| ProtocolError::InvalidParameter {
        name: "block_size",
        reason: format!("{pairs} pairs do not fit in a circuit"),
    })
}

/// Build the emitter circuit for `data.len()` singlet pairs.
///
/// Qubits `0..N` form the `alice` register and `N..2N` the `bob` register.
/// Fails when `data` and `basis` differ in length.
pub fn emitter_circuit(data: &[bool], basis: &[bool]) -> ProtocolResult<Circuit> {
    if data.len() != basis.len() {
        return Err(ProtocolError::LengthMismatch {
            what: "source data bits vs. source basis bits",
            left: data.len(),
            right: basis.len(),
        });
    }
    let n = register_width(data.len())?;

    let mut circuit = Circuit::new("emitter");
    let alice = circuit.add_qreg("alice", n);
    let bob = circuit.add_qreg("bob", n);

    for (i, (&a, &b)) in alice.iter().zip(&bob).enumerate() {
        // |00⟩ → (|01⟩ − |10⟩)/√2
        circuit.x(a)?.h(a)?.x(b)?.cx(a, b)?;

        for half in [a, b] {
            rotate(&mut circuit, half, data[i], basis[i])?;
        }
    }

    Ok(circuit)
}

fn rotate(circuit: &mut Circuit, qubit: QubitId, bit: bool, basis: bool) -> ProtocolResult<()> {
    if bit {
        circuit.x(qubit)?;
    }
    if basis {
        circuit.h(qubit)?;
    }
    Ok(())
}
