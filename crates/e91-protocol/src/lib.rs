//! E91 Entanglement-Based Key Distribution
//!
//! This crate runs the classical and circuit-building side of the E91
//! protocol. A source emits singlet pairs, Alice and Bob pick measurement
//! bases at random, a [`MeasurementBackend`] samples the composed round, and
//! the parties keep the positions where their bases agreed. Rounds repeat
//! until the sifted key covers a payload, which is then one-time-padded.
//!
//! # Round Layout
//!
//! A block of `N` pairs uses `2N` qubits. Qubit `i` (Alice) and qubit `i + N`
//! (Bob) form pair `i`:
//!
//! ```text
//! alice[i]: ─X─H─■─[U]─┤ ├─[H?]─M─
//!                │     │B│
//!   bob[i]: ─X───X─[U]─┤ ├─[H?]─M─      U = H^basis · X^bit
//! ```
//!
//! Singlet halves always disagree when measured in the same basis, so Bob
//! complements his sifted bits.
//!
//! # Example
//!
//! ```ignore
//! use e91_protocol::{CorrelatedPairOracle, E91Config, E91Session};
//!
//! let config = E91Config::default();
//! let mut session = E91Session::new(CorrelatedPairOracle::with_seed(1), &config)?;
//! let distilled = session.distill_key(64, |_| {}).await?;
//! println!("{}", distilled.key.to_hex());
//! ```

pub mod accumulator;
pub mod backend;
pub mod bits;
pub mod channel;
pub mod cipher;
pub mod config;
pub mod error;
pub mod image;
pub mod observer;
pub mod oracle;
pub mod sampling;
pub mod session;
pub mod sifting;
pub mod source;

pub use accumulator::{KeyAccumulator, RoundProgress, SharedKey};
pub use backend::{HalSampler, MeasurementBackend, Outcome};
pub use channel::BitFlipChannel;
pub use cipher::xor_bytes;
pub use config::{BackendKind, ConfigError, E91Config, STATEVECTOR_MAX_QUBITS};
pub use error::{ProtocolError, ProtocolResult};
pub use image::{ImagePayload, OutputPaths};
pub use observer::{MEASUREMENT_BASIS_LABEL, ObserverBases, compose_round, observer_circuit};
pub use oracle::CorrelatedPairOracle;
pub use sampling::{DisagreementCheck, SamplingStats};
pub use session::{DistilledKey, E91Session, ExchangeReport, RoundPlan};
pub use sifting::{SiftedRound, sift};
pub use source::{SourceBlock, emitter_circuit};
