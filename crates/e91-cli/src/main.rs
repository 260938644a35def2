//! E91 Command-Line Interface
//!
//! Runs the E91 key distribution simulator: distills a shared key from
//! entangled pairs and one-time-pads an image with it.
//!
//! ```text
//!            ┌─────────┐
//!   Alice ◄──┤ singlet ├──► Bob
//!     │      └─────────┘     │
//!   basis                  basis
//!     └──── sift · pad ──────┘
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::SessionArgs;
use commands::{backends, circuit, keygen, run};

/// E91 - entanglement-based quantum key distribution simulator
#[derive(Parser)]
#[command(name = "e91")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// YAML configuration file
    #[arg(short, long, global = true, env = "E91_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt an image with a freshly distilled key, then decrypt and verify it
    Run {
        /// Image to encrypt (default: download.png)
        #[arg(short, long)]
        image: Option<PathBuf>,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Distill a shared key and print it as hex
    Keygen {
        /// Key length in bits
        #[arg(long, default_value = "256")]
        bits: usize,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Print the circuit of one round
    Circuit {
        #[command(flatten)]
        session: SessionArgs,
    },

    /// List available measurement backends
    Backends,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_file = cli.config.as_deref();

    // Execute command
    let result = match cli.command {
        Commands::Run { image, session } => {
            run::execute(config_file, image.as_deref(), &session).await
        }
        Commands::Keygen { bits, session } => keygen::execute(config_file, bits, &session).await,
        Commands::Circuit { session } => circuit::execute(config_file, &session),
        Commands::Backends => backends::execute().await,
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
