//! E91 Circuit Intermediate Representation
//!
//! This crate provides the data structures the E91 simulator uses to describe
//! the quantum side of a protocol round: which qubits exist, which gates act
//! on them, and where they are measured.
//!
//! # Overview
//!
//! Circuits are stored as a DAG (Directed Acyclic Graph) of instructions over
//! qubit and classical wires. The high-level [`Circuit`] API provides a
//! builder for constructing circuits and for composing one circuit onto
//! another (emitter first, observers second).
//!
//! # Example: Building a Singlet Pair
//!
//! ```rust
//! use e91_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("singlet", 2, 0);
//!
//! // |00⟩ → (|01⟩ − |10⟩)/√2
//! circuit.x(QubitId(0)).unwrap();
//! circuit.h(QubitId(0)).unwrap();
//! circuit.x(QubitId(1)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//!
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.num_clbits(), 2);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `X` | 1 | Pauli-X |
//! | `H` | 1 | Hadamard gate |
//! | `CX` | 2 | Controlled-NOT (CNOT) |

pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use dag::{CircuitDag, DagEdge, DagNode, NodeIndex, WireId};
pub use error::{IrError, IrResult};
pub use gate::{Gate, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{Clbit, ClbitId, Qubit, QubitId};
