//! Calibrate command implementation.

use anyhow::{Context, Result};
use console::style;

use qisim_exec::RunOptions;
use qisim_mitigation::{extract_assignment_matrix, readout_calibration_circuits};

use super::common::{Device, print_matrix, spinner, write_json};

/// Execute the calibrate command.
///
/// Runs one calibration circuit per basis state of the register and prints
/// the estimated assignment matrix.
pub async fn execute(
    params: Option<&str>,
    backend: Option<&str>,
    shots: Option<u32>,
    seed: Option<u64>,
    output: Option<&str>,
) -> Result<()> {
    let device = Device::load(params, backend)?;
    let executor = device.executor(false, seed)?;
    let num_qubits = device.capabilities.num_qubits;

    let circuits = readout_calibration_circuits(num_qubits)?;
    println!(
        "{} Calibrating readout of {} ({} preparations)",
        style("→").cyan().bold(),
        style(&device.capabilities.name).yellow(),
        circuits.len()
    );

    let mut options = RunOptions::new().with_memory(true);
    if let Some(shots) = shots {
        options = options.with_shots(shots);
    }

    let spinner = spinner("Running calibration circuits...")?;
    let mut calibration_shots = Vec::with_capacity(circuits.len());
    for circuit in &circuits {
        spinner.set_message(format!("Running {}...", circuit.name()));
        let result = match executor.run(circuit, options).await {
            Ok(result) => result,
            Err(e) => {
                spinner.finish_and_clear();
                return Err(e)
                    .with_context(|| format!("Calibration circuit {} failed", circuit.name()));
            }
        };
        calibration_shots.push(result.memory.unwrap_or_default());
    }
    spinner.finish_and_clear();

    let qubits: Vec<usize> = (0..num_qubits as usize).collect();
    let assignment = extract_assignment_matrix(&calibration_shots, &qubits)?;

    println!(
        "\n{} Assignment matrix (rows: prepared, columns: declared)",
        style("✓").green().bold()
    );
    print_matrix(&assignment.to_rows());
    println!(
        "\n  Mean assignment fidelity: {}",
        style(format!("{:.4}", assignment.mean_fidelity())).yellow()
    );

    if let Some(path) = output {
        write_json(path, &assignment)?;
    }

    Ok(())
}
