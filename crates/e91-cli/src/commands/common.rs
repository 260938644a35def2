//! Shared helpers for CLI commands.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use console::style;

use e91_adapter_sim::SimulatorBackend;
use e91_hal::{BackendConfig, BackendFactory};
use e91_protocol::{
    BackendKind, BitFlipChannel, CorrelatedPairOracle, E91Config, HalSampler, MeasurementBackend,
    STATEVECTOR_MAX_QUBITS, SamplingStats,
};

/// Offsets keeping the backend and channel streams apart from the session's.
const BACKEND_SEED_OFFSET: u64 = 1;
const CHANNEL_SEED_OFFSET: u64 = 2;

/// Session options shared by every command that runs rounds.
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Measurement backend (statevector, oracle)
    #[arg(short, long)]
    pub backend: Option<BackendKind>,

    /// Entangled pairs per round
    #[arg(long)]
    pub block_size: Option<usize>,

    /// RNG seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Per-bit flip probability of the channel
    #[arg(long)]
    pub noise: Option<f64>,

    /// Compare a random sample of sifted bits and abort on high disagreement
    #[arg(long)]
    pub public_sampling: bool,

    /// Probability of disclosing each sifted bit
    #[arg(long)]
    pub sample_rate: Option<f64>,

    /// Disagreement rate that aborts the run
    #[arg(long)]
    pub abort_threshold: Option<f64>,
}

impl SessionArgs {
    /// Override `config` with the flags that were given.
    pub fn apply(&self, config: &mut E91Config) {
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(block_size) = self.block_size {
            config.block_size = block_size;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(noise) = self.noise {
            config.channel_noise = noise;
        }
        if self.public_sampling {
            config.public_sampling = true;
        }
        if let Some(rate) = self.sample_rate {
            config.sample_rate = rate;
        }
        if let Some(threshold) = self.abort_threshold {
            config.abort_threshold = threshold;
        }
    }
}

/// Resolve the configuration: defaults, file, environment, then flags.
pub fn load_config(config_file: Option<&Path>, args: &SessionArgs) -> Result<E91Config> {
    E91Config::load(config_file, |config| args.apply(config)).context("Invalid configuration")
}

/// Build the measurement backend selected by `config`, behind the channel
/// when noise is configured.
pub fn connect(config: &E91Config) -> Result<Box<dyn MeasurementBackend>> {
    let backend_seed = config.seed.map(|s| s.wrapping_add(BACKEND_SEED_OFFSET));

    let backend: Box<dyn MeasurementBackend> = match config.backend {
        BackendKind::Statevector => {
            let mut hal_config =
                BackendConfig::new("statevector").with_max_qubits(STATEVECTOR_MAX_QUBITS);
            if let Some(seed) = backend_seed {
                hal_config = hal_config.with_seed(seed);
            }
            let simulator = SimulatorBackend::from_config(hal_config)
                .context("Failed to create statevector backend")?;
            Box::new(HalSampler::new(simulator))
        }
        BackendKind::Oracle => Box::new(match backend_seed {
            Some(seed) => CorrelatedPairOracle::with_seed(seed),
            None => CorrelatedPairOracle::new(),
        }),
    };

    if config.channel_noise <= 0.0 {
        return Ok(backend);
    }

    let channel = match config.seed {
        Some(seed) => BitFlipChannel::with_seed(
            backend,
            config.channel_noise,
            seed.wrapping_add(CHANNEL_SEED_OFFSET),
        )?,
        None => BitFlipChannel::new(backend, config.channel_noise)?,
    };
    Ok(Box::new(channel))
}

/// Print the resolved session settings.
pub fn print_settings(config: &E91Config) {
    println!(
        "  Backend: {}, block size {}{}",
        style(config.backend).yellow(),
        config.block_size,
        config
            .seed
            .map(|s| format!(", seed {s}"))
            .unwrap_or_default()
    );
    if config.channel_noise > 0.0 {
        println!("  Channel noise: {:.3}", config.channel_noise);
    }
    if config.public_sampling {
        println!(
            "  Public sampling: rate {:.2}, abort above {:.2}",
            config.sample_rate, config.abort_threshold
        );
    }
}

/// Print public comparison totals.
pub fn print_sampling(stats: Option<&SamplingStats>) {
    if let Some(stats) = stats {
        println!(
            "  Public sampling: {} bits compared, {} disagreements ({:.2}%)",
            stats.compared,
            stats.disagreements,
            stats.rate() * 100.0
        );
    }
}
