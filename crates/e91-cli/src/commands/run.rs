//! Run command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use e91_protocol::E91Session;

use super::common::{SessionArgs, connect, load_config, print_sampling, print_settings};

/// Execute the run command.
pub async fn execute(config_file: Option<&Path>, image: Option<&Path>, args: &SessionArgs) -> Result<()> {
    let mut config = load_config(config_file, args)?;
    if let Some(image) = image {
        config.image_path = image.to_path_buf();
    }

    println!(
        "{} Exchanging {}",
        style("→").cyan().bold(),
        style(config.image_path.display()).green(),
    );
    print_settings(&config);

    let backend = connect(&config)?;
    let mut session = E91Session::new(backend, &config)?;

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} key bits ({msg})")?
            .progress_chars("=>-"),
    );

    let report = session
        .run_image_exchange(&config.image_path, |round| {
            progress.set_length(round.target as u64);
            progress.set_position(round.accumulated.min(round.target) as u64);
            progress.set_message(format!("round {}", round.round));
            debug!(
                round = round.round,
                kept = round.kept,
                accumulated = round.accumulated,
                "round complete"
            );
        })
        .await;
    progress.finish_and_clear();
    let report = report?;

    println!(
        "  Distilled {} key bits in {} rounds ({} ms)",
        report.key_bits, report.rounds, report.elapsed_ms
    );
    print_sampling(report.sampling.as_ref());
    println!(
        "  Ciphertext: {}",
        style(report.outputs.ciphertext.display()).green()
    );
    println!(
        "  Decrypted:  {}",
        style(report.outputs.decrypted.display()).green()
    );
    println!(
        "{} Decrypted image matches the original bit for bit ({} bytes)",
        style("✓").green().bold(),
        report.image_bytes
    );

    Ok(())
}
