//! Run configuration.
//!
//! Values are resolved with the following precedence (highest first):
//! 1. Command-line flags (applied by the binary)
//! 2. Environment variables (`E91_` prefix)
//! 3. A YAML configuration file
//! 4. Default values

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Qubit limit used for the statevector backend; a block needs two qubits
/// per pair.
pub const STATEVECTOR_MAX_QUBITS: u32 = 20;

/// Which measurement backend samples the rounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local statevector simulator.
    #[default]
    Statevector,
    /// Correlated-pair oracle.
    Oracle,
}

impl BackendKind {
    /// Every selectable backend.
    pub const ALL: [BackendKind; 2] = [BackendKind::Statevector, BackendKind::Oracle];

    /// Name used in configuration and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Statevector => "statevector",
            BackendKind::Oracle => "oracle",
        }
    }

    /// One-line description for listings.
    pub fn description(self) -> &'static str {
        match self {
            BackendKind::Statevector => "exact statevector simulation of every round",
            BackendKind::Oracle => "correlated-bit oracle reading the basis labels",
        }
    }

    /// Largest block this backend can sample, if bounded.
    pub fn max_block_size(self) -> Option<usize> {
        match self {
            BackendKind::Statevector => Some(STATEVECTOR_MAX_QUBITS as usize / 2),
            BackendKind::Oracle => None,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "statevector" | "sim" | "simulator" => Ok(BackendKind::Statevector),
            "oracle" => Ok(BackendKind::Oracle),
            other => Err(ConfigError::Validation(format!(
                "Unknown backend '{other}' (expected statevector or oracle)"
            ))),
        }
    }
}

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct E91Config {
    /// Image to encrypt.
    #[serde(default = "default_image_path")]
    pub image_path: PathBuf,

    /// Entangled pairs per round.
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// Disagreement rate above which public sampling aborts.
    #[serde(default = "default_abort_threshold")]
    pub abort_threshold: f64,

    /// Probability of disclosing each sifted bit for comparison.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f64,

    /// Enable public sampling. Off by default; the two rates above are
    /// unused while it is off.
    #[serde(default)]
    pub public_sampling: bool,

    /// Measurement backend.
    #[serde(default)]
    pub backend: BackendKind,

    /// Per-bit flip probability of the channel.
    #[serde(default)]
    pub channel_noise: f64,

    /// RNG seed for reproducible runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_image_path() -> PathBuf {
    PathBuf::from("download.png")
}

fn default_block_size() -> usize {
    5
}

fn default_abort_threshold() -> f64 {
    0.11
}

fn default_sample_rate() -> f64 {
    0.10
}

impl Default for E91Config {
    fn default() -> Self {
        Self {
            image_path: default_image_path(),
            block_size: default_block_size(),
            abort_threshold: default_abort_threshold(),
            sample_rate: default_sample_rate(),
            public_sampling: false,
            backend: BackendKind::default(),
            channel_noise: 0.0,
            seed: None,
        }
    }
}

impl E91Config {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_yaml_ng::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve a configuration from every source, then validate it.
    ///
    /// Starts from the file (or the defaults when there is none), applies the
    /// `E91_*` environment variables, and finally hands the result to
    /// `overrides`, which is where command-line flags go.
    pub fn load<F>(config_file: Option<&Path>, overrides: F) -> Result<Self, ConfigError>
    where
        F: FnOnce(&mut Self),
    {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let mut config = config.merge_env()?;
        overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Apply `E91_*` variables from the process environment.
    pub fn merge_env(self) -> Result<Self, ConfigError> {
        self.merge_env_from(|var| std::env::var(var).ok())
    }

    /// Apply `E91_*` variables from `lookup`.
    ///
    /// Only variables that are set override the current values. A value that
    /// does not parse is an error rather than being skipped.
    pub fn merge_env_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("E91_IMAGE") {
            self.image_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("E91_BLOCK_SIZE") {
            self.block_size = parse_env("E91_BLOCK_SIZE", &v)?;
        }
        if let Some(v) = lookup("E91_ABORT_THRESHOLD") {
            self.abort_threshold = parse_env("E91_ABORT_THRESHOLD", &v)?;
        }
        if let Some(v) = lookup("E91_SAMPLE_RATE") {
            self.sample_rate = parse_env("E91_SAMPLE_RATE", &v)?;
        }
        if let Some(v) = lookup("E91_PUBLIC_SAMPLING") {
            self.public_sampling = parse_flag("E91_PUBLIC_SAMPLING", &v)?;
        }
        if let Some(v) = lookup("E91_BACKEND") {
            self.backend = v.parse().map_err(|_| ConfigError::Env {
                var: "E91_BACKEND".into(),
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup("E91_CHANNEL_NOISE") {
            self.channel_noise = parse_env("E91_CHANNEL_NOISE", &v)?;
        }
        if let Some(v) = lookup("E91_SEED") {
            self.seed = Some(parse_env("E91_SEED", &v)?);
        }
        Ok(self)
    }

    /// Validate configuration values, including the block limit of the
    /// selected backend.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_ranges()?;
        if let Some(max) = self.backend.max_block_size() {
            if self.block_size > max {
                return Err(ConfigError::Validation(format!(
                    "block_size {} needs {} qubits; the {} backend holds at most {} (block_size <= {max})",
                    self.block_size,
                    2 * self.block_size,
                    self.backend,
                    STATEVECTOR_MAX_QUBITS,
                )));
            }
        }
        Ok(())
    }

    /// Validate the values that hold for any backend.
    pub fn validate_ranges(&self) -> Result<(), ConfigError> {
        if self.block_size == 0 {
            return Err(ConfigError::Validation(
                "block_size must be greater than 0".to_string(),
            ));
        }

        for (name, value) in [
            ("abort_threshold", self.abort_threshold),
            ("sample_rate", self.sample_rate),
            ("channel_noise", self.channel_noise),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        Ok(())
    }
}

fn parse_env<T: FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        var: var.to_string(),
        value: value.to_string(),
    })
}

fn parse_flag(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Env {
            var: var.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for [`E91Config`].
    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// An environment variable holds an unusable value.
    #[error("Invalid value {value:?} for {var}")]
    Env {
        /// Variable name.
        var: String,
        /// Raw value.
        value: String,
    },

    /// A value is out of range.
    #[error("Validation error: {0}")]
    Validation(String),
}
