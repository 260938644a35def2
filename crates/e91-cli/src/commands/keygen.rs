//! Keygen command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use e91_protocol::E91Session;

use super::common::{SessionArgs, connect, load_config, print_sampling, print_settings};

/// Execute the keygen command.
pub async fn execute(config_file: Option<&Path>, bits: usize, args: &SessionArgs) -> Result<()> {
    if bits == 0 {
        anyhow::bail!("Key length must be at least 1 bit");
    }
    let config = load_config(config_file, args)?;

    println!(
        "{} Distilling a {}-bit key",
        style("→").cyan().bold(),
        style(bits).green()
    );
    print_settings(&config);

    let mut session = E91Session::new(connect(&config)?, &config)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let distilled = session
        .distill_key(bits, |round| {
            spinner.set_message(format!(
                "Round {}: {}/{} bits",
                round.round,
                round.accumulated.min(round.target),
                round.target
            ));
        })
        .await;
    spinner.finish_and_clear();
    let distilled = distilled?;

    println!("  Rounds: {}", distilled.rounds);
    print_sampling(distilled.sampling.as_ref());
    println!("{}", distilled.key.to_hex());

    Ok(())
}
