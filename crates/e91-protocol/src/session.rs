//! Round driver and image exchange.

use std::path::{Path, PathBuf};
use std::time::Instant;

use e91_ir::Circuit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, instrument};

use crate::accumulator::{KeyAccumulator, RoundProgress, SharedKey};
use crate::backend::MeasurementBackend;
use crate::cipher::xor_bytes;
use crate::config::E91Config;
use crate::error::{ProtocolError, ProtocolResult};
use crate::image::{ImagePayload, OutputPaths};
use crate::observer::{ObserverBases, compose_round};
use crate::sampling::{DisagreementCheck, SamplingStats};
use crate::sifting::{SiftedRound, sift};
use crate::source::SourceBlock;

/// Random choices and the composed circuit for one round.
#[derive(Debug, Clone)]
pub struct RoundPlan {
    /// Emitter data bits and bases.
    pub source: SourceBlock,
    /// Alice's and Bob's measurement bases.
    pub observers: ObserverBases,
    /// Emitter, barrier, observers and measurements.
    pub circuit: Circuit,
}

/// A finalized key and how it was obtained.
#[derive(Debug, Clone)]
pub struct DistilledKey {
    /// The shared key, exactly as long as requested.
    pub key: SharedKey,
    /// Rounds sampled.
    pub rounds: usize,
    /// Public comparison totals, when sampling was on.
    pub sampling: Option<SamplingStats>,
}

/// Outcome of a full image exchange.
#[derive(Debug, Clone)]
pub struct ExchangeReport {
    /// Input image.
    pub image_path: PathBuf,
    /// Image size in bytes.
    pub image_bytes: usize,
    /// Key length in bits.
    pub key_bits: usize,
    /// Rounds sampled.
    pub rounds: usize,
    /// Files written.
    pub outputs: OutputPaths,
    /// Public comparison totals, when sampling was on.
    pub sampling: Option<SamplingStats>,
    /// Wall-clock time of the exchange.
    pub elapsed_ms: u64,
}

/// Drives E91 rounds against a measurement backend.
pub struct E91Session<B> {
    backend: B,
    block_size: usize,
    rng: StdRng,
    sampling: Option<DisagreementCheck>,
}

impl<B: MeasurementBackend> E91Session<B> {
    /// Create a session from a configuration.
    ///
    /// The block size, the public sampling settings and the seed are taken
    /// from `config`; the backend choice and the channel are already
    /// reflected in `backend`, so `config.backend` is not consulted and the
    /// block size is checked against the limit `backend` reports.
    pub fn new(backend: B, config: &E91Config) -> ProtocolResult<Self> {
        config.validate_ranges()?;
        if let Some(max) = backend.max_block_size() {
            if config.block_size > max {
                return Err(ProtocolError::InvalidParameter {
                    name: "block_size",
                    reason: format!(
                        "{} pairs per round exceed the {} backend's limit of {max}",
                        config.block_size,
                        backend.name()
                    ),
                });
            }
        }

        let sampling = if config.public_sampling {
            if config.sample_rate >= 1.0 {
                return Err(ProtocolError::InvalidParameter {
                    name: "sample_rate",
                    reason: "disclosing every sifted bit leaves no key".into(),
                });
            }
            Some(DisagreementCheck::new(
                config.sample_rate,
                config.abort_threshold,
            )?)
        } else {
            None
        };

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            backend,
            block_size: config.block_size,
            rng,
            sampling,
        })
    }

    /// The measurement backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Pairs per round.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Draw fresh choices for one round and build its circuit.
    pub fn plan_round(&mut self) -> ProtocolResult<RoundPlan> {
        let source = SourceBlock::random(&mut self.rng, self.block_size);
        let observers = ObserverBases::random(&mut self.rng, self.block_size);
        let circuit = compose_round(&source.emitter_circuit()?, &observers.circuit()?)?;
        Ok(RoundPlan {
            source,
            observers,
            circuit,
        })
    }

    /// Plan, sample and sift one round.
    ///
    /// With public sampling on, part of the sifted bits is disclosed and
    /// removed before the round is returned.
    pub async fn run_round(&mut self) -> ProtocolResult<SiftedRound> {
        let plan = self.plan_round()?;
        let outcome = self.backend.sample(&plan.circuit).await?;
        debug!(backend = self.backend.name(), outcome = %outcome, "round sampled");

        let round = sift(&plan.observers.alice, &plan.observers.bob, &outcome)?;
        match self.sampling.as_mut() {
            Some(check) => check.screen(&mut self.rng, round),
            None => Ok(round),
        }
    }

    /// Run rounds until `target` key bits are shared.
    ///
    /// `on_round` is called after every round. The key is truncated to
    /// `target` and both parties' copies are compared before returning.
    #[instrument(skip(self, on_round))]
    pub async fn distill_key<F>(&mut self, target: usize, mut on_round: F) -> ProtocolResult<DistilledKey>
    where
        F: FnMut(&RoundProgress),
    {
        let mut accumulator = KeyAccumulator::new(target);
        while !accumulator.is_ready() {
            let round = self.run_round().await?;
            let progress = accumulator.absorb(round);
            on_round(&progress);
        }

        let rounds = accumulator.rounds();
        let key = accumulator.finalize()?;
        info!(bits = key.len(), rounds, "key distilled");

        Ok(DistilledKey {
            key,
            rounds,
            sampling: self.sampling.as_ref().map(DisagreementCheck::stats),
        })
    }

    /// Encrypt an image with a freshly distilled key and decrypt it again.
    ///
    /// The image is loaded before any round runs. Ciphertext and decrypted
    /// copy are written next to the input once decryption has been checked
    /// against the original bytes.
    #[instrument(skip(self, path, on_round), fields(path = %path.as_ref().display()))]
    pub async fn run_image_exchange<P, F>(&mut self, path: P, on_round: F) -> ProtocolResult<ExchangeReport>
    where
        P: AsRef<Path>,
        F: FnMut(&RoundProgress),
    {
        let start = Instant::now();
        let image = ImagePayload::load(path.as_ref())?;

        let distilled = self.distill_key(image.bit_len(), on_round).await?;
        let key = distilled.key.to_bytes();

        let ciphertext = xor_bytes(image.bytes(), &key)?;
        let decrypted = xor_bytes(&ciphertext, &key)?;
        if decrypted != image.bytes() {
            return Err(ProtocolError::DecryptionMismatch);
        }

        let outputs = image.write_outputs(&ciphertext, &decrypted)?;
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            bytes = image.bytes().len(),
            rounds = distilled.rounds,
            elapsed_ms,
            "image exchange complete"
        );

        Ok(ExchangeReport {
            image_path: image.path().to_path_buf(),
            image_bytes: image.bytes().len(),
            key_bits: distilled.key.len(),
            rounds: distilled.rounds,
            outputs,
            sampling: distilled.sampling,
            elapsed_ms,
        })
    }
}
