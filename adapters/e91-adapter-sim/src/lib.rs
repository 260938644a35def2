//! E91 Local Statevector Simulator
//!
//! This crate provides a local statevector simulator that implements the
//! [`e91_hal::Backend`] trait. It is exact up to sampling and is limited by
//! memory to roughly 20 qubits, which is a block of 10 entangled pairs.
//!
//! # Features
//!
//! - **Exact Simulation**: Full statevector representation
//! - **All IR Gates**: Supports every gate in `e91-ir`
//! - **Seedable Sampling**: `with_seed` makes every shot reproducible
//!
//! # Performance
//!
//! | Qubits | Pairs | Memory |
//! |--------|-------|--------|
//! | 10 | 5 | ~16 KB |
//! | 16 | 8 | ~1 MB |
//! | 20 | 10 | ~16 MB |
//!
//! # Example
//!
//! ```ignore
//! use e91_adapter_sim::SimulatorBackend;
//! use e91_hal::Backend;
//!
//! let backend = SimulatorBackend::with_seed(42);
//! let job_id = backend.submit(&round_circuit, 1, None).await?;
//! let result = backend.wait(&job_id).await?;
//! println!("{}", result.counts);
//! ```

mod simulator;
mod statevector;

pub use simulator::{DEFAULT_MAX_QUBITS, SimulatorBackend};
pub use statevector::Statevector;
