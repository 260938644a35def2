//! Error types for the protocol crate.

use std::path::PathBuf;

use e91_hal::HalError;
use e91_ir::IrError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while running the protocol.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// The input image does not exist.
    #[error("Image not found at {}. Drop an image there or pass --image <PATH>", .path.display())]
    ImageNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The input image has no bytes to encrypt.
    #[error("Image at {} is empty", .path.display())]
    EmptyImage {
        /// Path of the empty file.
        path: PathBuf,
    },

    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Two sequences that must line up have different lengths.
    #[error("{what}: length {left} does not match length {right}")]
    LengthMismatch {
        /// What was being paired up.
        what: &'static str,
        /// Length of the first sequence.
        left: usize,
        /// Length of the second sequence.
        right: usize,
    },

    /// A measurement outcome does not cover both halves of the block.
    #[error("Measurement outcome has {got} bits, expected {expected}")]
    OutcomeLength {
        /// Twice the block size.
        expected: usize,
        /// Bits actually returned.
        got: usize,
    },

    /// A backend returned something that is not a bitstring.
    #[error("Malformed measurement outcome: {0}")]
    MalformedOutcome(String),

    /// A round circuit must hold an even number of qubits.
    #[error("Circuit has {0} qubits; pairs need an even count")]
    UnpairedQubits(usize),

    /// A runtime parameter is out of range.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Alice's and Bob's keys differ after truncation.
    #[error("Alice and Bob keys differ at bit {position}")]
    KeyMismatch {
        /// First differing position.
        position: usize,
    },

    /// Finalization was requested before enough bits were sifted.
    #[error("Key has {have} bits but {need} are required")]
    InsufficientKey {
        /// Bits accumulated so far.
        have: usize,
        /// Bits required.
        need: usize,
    },

    /// Decrypting the ciphertext did not give back the plaintext.
    #[error("Decrypted bytes differ from the original image")]
    DecryptionMismatch,

    /// Public sampling saw too many disagreements.
    #[error(
        "Eavesdropper suspected: disagreement rate {rate:.4} over {compared} sampled bits exceeds threshold {threshold:.4}"
    )]
    EavesdropperDetected {
        /// Observed disagreement rate.
        rate: f64,
        /// Configured abort threshold.
        threshold: f64,
        /// Number of bits publicly compared.
        compared: usize,
    },

    /// The measurement backend failed.
    #[error(transparent)]
    Backend(#[from] HalError),

    /// A circuit could not be built.
    #[error(transparent)]
    Circuit(#[from] IrError),
}

impl ProtocolError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProtocolError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
