//! Backends command implementation.

use anyhow::Result;
use console::style;

use e91_adapter_sim::SimulatorBackend;
use e91_hal::Backend;
use e91_protocol::{BackendKind, STATEVECTOR_MAX_QUBITS};

/// Execute the backends command.
pub async fn execute() -> Result<()> {
    println!("{} Available backends:\n", style("E91").cyan().bold());

    for kind in BackendKind::ALL {
        match kind {
            BackendKind::Statevector => {
                let sim = SimulatorBackend::with_max_qubits(STATEVECTOR_MAX_QUBITS);
                let caps = sim.capabilities();
                let available = sim.availability().await?.is_available;

                println!(
                    "  {} {} {}",
                    if available {
                        style("●").green()
                    } else {
                        style("○").red()
                    },
                    style(kind).bold(),
                    if caps.is_simulator { "(local)" } else { "" }
                );
                println!("    {}", kind.description());
                println!("    Qubits: {}", caps.num_qubits);
                println!("    Max shots: {}", caps.max_shots);
                println!(
                    "    Gates: {}",
                    caps.gate_set
                        .single_qubit
                        .iter()
                        .chain(&caps.gate_set.two_qubit)
                        .map(String::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
            BackendKind::Oracle => {
                println!("  {} {} (local)", style("●").green(), style(kind).bold());
                println!("    {}", kind.description());
            }
        }
        match kind.max_block_size() {
            Some(max) => println!("    Block size: 1-{max}"),
            None => println!("    Block size: unbounded"),
        }
        println!();
    }

    Ok(())
}
