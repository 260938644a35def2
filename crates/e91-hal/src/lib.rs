//! E91 Backend Abstraction Layer
//!
//! This crate provides the interface the E91 protocol uses to run a round
//! circuit on something that can sample it: a local statevector simulator
//! today, any other gate-model backend tomorrow.
//!
//! # Overview
//!
//! The HAL abstracts away backend-specific details, providing:
//! - A common [`Backend`] trait for job submission and management
//! - [`Capabilities`] to describe qubit limits and supported gates
//! - Unified result handling via [`ExecutionResult`] and [`Counts`]
//!
//! # Example: Sampling a Round Circuit
//!
//! ```ignore
//! use e91_hal::Backend;
//! use e91_adapter_sim::SimulatorBackend;
//! use e91_ir::Circuit;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut circuit = Circuit::with_size("singlet", 2, 0);
//!     circuit.x(0.into())?.h(0.into())?.x(1.into())?.cx(0.into(), 1.into())?;
//!     circuit.measure_all()?;
//!
//!     let backend = SimulatorBackend::new();
//!     let job_id = backend.submit(&circuit, 1, None).await?;
//!     let result = backend.wait(&job_id).await?;
//!
//!     // Singlet halves always disagree: "01" or "10".
//!     if let Some((bitstring, _)) = result.counts.most_frequent() {
//!         println!("Outcome: {bitstring}");
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod result;

pub use backend::{Backend, BackendAvailability, BackendConfig, BackendFactory, ValidationResult};
pub use capability::{Capabilities, GateSet};
pub use error::{HalError, HalResult};
pub use job::{JobId, JobStatus};
pub use result::{Counts, ExecutionResult};
