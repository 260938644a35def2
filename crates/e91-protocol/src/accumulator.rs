//! Key accumulation and finalization.

use tracing::info;

use crate::bits::{pack_bits, to_hex};
use crate::error::{ProtocolError, ProtocolResult};
use crate::sifting::SiftedRound;

/// Progress report emitted after every round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundProgress {
    /// 1-based round number.
    pub round: usize,
    /// Key bits kept this round.
    pub kept: usize,
    /// Key bits accumulated so far.
    pub accumulated: usize,
    /// Key bits required.
    pub target: usize,
}

impl RoundProgress {
    /// Check whether the target has been reached.
    pub fn is_complete(&self) -> bool {
        self.accumulated >= self.target
    }
}

/// Append-only sifted key buffers for Alice and Bob.
#[derive(Debug, Clone)]
pub struct KeyAccumulator {
    alice: Vec<bool>,
    bob: Vec<bool>,
    rounds: usize,
    target: usize,
}

impl KeyAccumulator {
    /// Start accumulating towards `target` bits.
    pub fn new(target: usize) -> Self {
        Self {
            alice: Vec::with_capacity(target),
            bob: Vec::with_capacity(target),
            rounds: 0,
            target,
        }
    }

    /// Append one round's sifted bits.
    pub fn absorb(&mut self, round: SiftedRound) -> RoundProgress {
        self.rounds += 1;
        let kept = round.alice.len();
        self.alice.extend(round.alice);
        self.bob.extend(round.bob);

        let progress = RoundProgress {
            round: self.rounds,
            kept,
            accumulated: self.alice.len(),
            target: self.target,
        };
        info!(
            round = progress.round,
            kept = progress.kept,
            accumulated = progress.accumulated,
            target = progress.target,
            "round sifted"
        );
        progress
    }

    /// Check whether enough bits have been sifted.
    pub fn is_ready(&self) -> bool {
        self.alice.len() >= self.target
    }

    /// Bits accumulated so far.
    pub fn len(&self) -> usize {
        self.alice.len()
    }

    /// Check whether nothing has been accumulated.
    pub fn is_empty(&self) -> bool {
        self.alice.is_empty()
    }

    /// Rounds absorbed so far.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Target key length in bits.
    pub fn target(&self) -> usize {
        self.target
    }

    /// Truncate both buffers to the target and check that they agree.
    pub fn finalize(mut self) -> ProtocolResult<SharedKey> {
        if !self.is_ready() {
            return Err(ProtocolError::InsufficientKey {
                have: self.alice.len(),
                need: self.target,
            });
        }
        self.alice.truncate(self.target);
        self.bob.truncate(self.target);

        if let Some(position) = self
            .alice
            .iter()
            .zip(&self.bob)
            .position(|(a, b)| a != b)
        {
            return Err(ProtocolError::KeyMismatch { position });
        }

        Ok(SharedKey { bits: self.alice })
    }
}

/// A key both parties hold bit for bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedKey {
    bits: Vec<bool>,
}

impl SharedKey {
    /// Key bits.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Key length in bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Check whether the key is empty.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Packed key bytes, MSB first.
    pub fn to_bytes(&self) -> Vec<u8> {
        pack_bits(&self.bits)
    }

    /// Packed key bytes as lowercase hex.
    pub fn to_hex(&self) -> String {
        to_hex(&self.to_bytes())
    }
}
