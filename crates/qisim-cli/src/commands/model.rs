//! Model command implementation.

use anyhow::Result;
use console::style;

use super::common::Device;

/// Execute the model command.
pub fn execute(params: Option<&str>, backend: Option<&str>, exact: bool) -> Result<()> {
    let device = Device::load(params, backend)?;
    let model = device.noise_model(exact)?;

    println!(
        "{} Noise model for {} ({} qubits, {} channels)",
        style("→").cyan().bold(),
        style(model.profile_name()).yellow(),
        model.layout().len(),
        model.len()
    );

    println!("\n{}", style("Layout").bold());
    for (index, label) in model.layout().iter() {
        println!("  {label:>6} → {index}");
    }

    println!("\n{}", style("Channels").bold());
    for (operation, qubits, channel) in model.entries() {
        println!(
            "  {:<8} {:<10} {}",
            style(operation).cyan(),
            format!("{qubits:?}"),
            channel.summary()
        );
    }

    println!("\n{}", style("Readout").bold());
    for (qubit, confusion) in model.readout_entries() {
        let [[p00, p01], [p10, p11]] = confusion.rows();
        println!("  q{qubit}: [[{p00:.4}, {p01:.4}], [{p10:.4}, {p11:.4}]]");
    }

    Ok(())
}
