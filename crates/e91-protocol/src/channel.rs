//! Noisy channel model.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use e91_ir::Circuit;

use crate::backend::{MeasurementBackend, Outcome};
use crate::error::{ProtocolError, ProtocolResult};

/// Flips every outcome bit of the wrapped backend independently with a
/// fixed probability.
pub struct BitFlipChannel<S> {
    inner: S,
    probability: f64,
    rng: Mutex<StdRng>,
}

impl<S: MeasurementBackend> BitFlipChannel<S> {
    /// Wrap `inner`; `probability` must lie in `[0, 1]`.
    pub fn new(inner: S, probability: f64) -> ProtocolResult<Self> {
        Self::build(inner, probability, StdRng::from_entropy())
    }

    /// Like [`BitFlipChannel::new`] with a reproducible flip pattern.
    pub fn with_seed(inner: S, probability: f64, seed: u64) -> ProtocolResult<Self> {
        Self::build(inner, probability, StdRng::seed_from_u64(seed))
    }

    fn build(inner: S, probability: f64, rng: StdRng) -> ProtocolResult<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(ProtocolError::InvalidParameter {
                name: "channel_noise",
                reason: format!("{probability} is not a probability"),
            });
        }
        Ok(Self {
            inner,
            probability,
            rng: Mutex::new(rng),
        })
    }

    /// Flip probability.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// The wrapped backend.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: MeasurementBackend> MeasurementBackend for BitFlipChannel<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn max_block_size(&self) -> Option<usize> {
        self.inner.max_block_size()
    }

    async fn sample(&self, circuit: &Circuit) -> ProtocolResult<Outcome> {
        let mut outcome = self.inner.sample(circuit).await?;
        if self.probability == 0.0 {
            return Ok(outcome);
        }

        let mut flipped = 0usize;
        {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            for bit in outcome.bits_mut() {
                if rng.gen_bool(self.probability) {
                    *bit = !*bit;
                    flipped += 1;
                }
            }
        }
        trace!(flipped, "channel noise applied");
        Ok(outcome)
    }
}
