//! The measurement seam.
//!
//! A [`MeasurementBackend`] takes a composed round circuit and returns one
//! shot: a bit per classical bit, Alice's `N` first and Bob's `N` last.

use async_trait::async_trait;
use tracing::{debug, instrument};

use e91_hal::{Backend, HalError};
use e91_ir::Circuit;

use crate::bits::to_bitstring;
use crate::error::{ProtocolError, ProtocolResult};

/// One shot of a round: `2N` measured bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    bits: Vec<bool>,
}

impl Outcome {
    /// Wrap raw bits.
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Parse a `0`/`1` bitstring; character `i` is classical bit `i`.
    pub fn from_bitstring(bitstring: &str) -> ProtocolResult<Self> {
        bitstring
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(ProtocolError::MalformedOutcome(format!(
                    "unexpected character {other:?} in {bitstring:?}"
                ))),
            })
            .collect::<ProtocolResult<Vec<_>>>()
            .map(Self::new)
    }

    /// All bits in classical-bit order.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Mutable access, for channel models.
    pub fn bits_mut(&mut self) -> &mut [bool] {
        &mut self.bits
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Check whether the outcome is empty.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Split into Alice's and Bob's halves for a block of `n` pairs.
    ///
    /// Fails unless the outcome holds exactly `2n` bits.
    pub fn split(&self, n: usize) -> ProtocolResult<(&[bool], &[bool])> {
        if self.bits.len() != 2 * n {
            return Err(ProtocolError::OutcomeLength {
                expected: 2 * n,
                got: self.bits.len(),
            });
        }
        Ok(self.bits.split_at(n))
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&to_bitstring(&self.bits))
    }
}

/// Something that can sample a round circuit once.
#[async_trait]
pub trait MeasurementBackend: Send + Sync {
    /// Name for logs and listings.
    fn name(&self) -> &str;

    /// Largest block of pairs one round may hold, or `None` if unbounded.
    fn max_block_size(&self) -> Option<usize> {
        None
    }

    /// Run the circuit for a single shot.
    async fn sample(&self, circuit: &Circuit) -> ProtocolResult<Outcome>;
}

#[async_trait]
impl<T: MeasurementBackend + ?Sized> MeasurementBackend for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn max_block_size(&self) -> Option<usize> {
        (**self).max_block_size()
    }

    async fn sample(&self, circuit: &Circuit) -> ProtocolResult<Outcome> {
        (**self).sample(circuit).await
    }
}

/// Adapts any HAL [`Backend`] into a [`MeasurementBackend`].
pub struct HalSampler<B> {
    backend: B,
}

impl<B: Backend> HalSampler<B> {
    /// Wrap a HAL backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The wrapped backend.
    pub fn inner(&self) -> &B {
        &self.backend
    }
}

#[async_trait]
impl<B: Backend> MeasurementBackend for HalSampler<B> {
    fn name(&self) -> &str {
        self.backend.name()
    }

    /// Two qubits per pair.
    fn max_block_size(&self) -> Option<usize> {
        Some(self.backend.capabilities().num_qubits as usize / 2)
    }

    #[instrument(skip(self, circuit), fields(qubits = circuit.num_qubits()))]
    async fn sample(&self, circuit: &Circuit) -> ProtocolResult<Outcome> {
        self.backend.validate(circuit).await?.into_result()?;

        let job_id = self.backend.submit(circuit, 1, None).await?;
        let result = self.backend.wait(&job_id).await?;

        let (bitstring, _) = result.counts.most_frequent().ok_or_else(|| {
            HalError::JobFailed(format!("job {job_id} returned no measurement counts"))
        })?;
        debug!(backend = self.backend.name(), job = %job_id, outcome = bitstring, "sampled round");

        let outcome = Outcome::from_bitstring(bitstring)?;
        if outcome.len() != circuit.num_clbits() {
            return Err(ProtocolError::OutcomeLength {
                expected: circuit.num_clbits(),
                got: outcome.len(),
            });
        }
        Ok(outcome)
    }
}
