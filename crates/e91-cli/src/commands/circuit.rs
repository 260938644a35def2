//! Circuit command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use e91_protocol::E91Session;
use e91_protocol::bits::to_bitstring;

use super::common::{SessionArgs, connect, load_config};

/// Execute the circuit command.
pub fn execute(config_file: Option<&Path>, args: &SessionArgs) -> Result<()> {
    let config = load_config(config_file, args)?;
    let mut session = E91Session::new(connect(&config)?, &config)?;
    let plan = session.plan_round()?;

    println!(
        "{} One round of {} pairs",
        style("→").cyan().bold(),
        style(config.block_size).green()
    );
    println!("  Source data:   {}", to_bitstring(&plan.source.data));
    println!("  Source basis:  {}", to_bitstring(&plan.source.basis));
    println!("  Alice bases:   {}", to_bitstring(&plan.observers.alice));
    println!("  Bob bases:     {}", to_bitstring(&plan.observers.bob));
    println!(
        "  Qubits: {}, ops: {}, depth: {}",
        plan.circuit.num_qubits(),
        plan.circuit.num_ops(),
        plan.circuit.depth()
    );
    println!();
    print!("{}", plan.circuit);

    Ok(())
}
