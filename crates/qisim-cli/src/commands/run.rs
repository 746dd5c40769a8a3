//! Run command implementation.

use anyhow::Result;
use console::style;

use qisim_exec::RunOptions;

use super::common::{Device, load_circuit, print_results, spinner, write_json};

/// Arguments of the run command.
#[derive(Debug, Clone)]
pub struct RunArgs<'a> {
    pub params: Option<&'a str>,
    pub backend: Option<&'a str>,
    pub input: &'a str,
    pub shots: Option<u32>,
    pub memory: bool,
    pub ideal: bool,
    pub seed: Option<u64>,
    pub output: Option<&'a str>,
}

/// Execute the run command.
pub async fn execute(args: RunArgs<'_>) -> Result<()> {
    let device = Device::load(args.params, args.backend)?;
    let executor = device.executor(args.ideal, args.seed)?;

    let circuit = load_circuit(args.input)?;
    println!(
        "{} Running {} on {} ({})",
        style("→").cyan().bold(),
        style(args.input).green(),
        style(&device.capabilities.name).yellow(),
        if executor.is_noisy() { "noisy" } else { "ideal" }
    );
    println!(
        "  Loaded: {} qubits, {} instructions",
        circuit.num_qubits(),
        circuit.len()
    );

    let mut options = RunOptions::new().with_memory(args.memory);
    if let Some(shots) = args.shots {
        options = options.with_shots(shots);
    }

    let spinner = spinner("Simulating...")?;
    let result = executor.run(&circuit, options).await;
    spinner.finish_and_clear();
    let result = result?;

    print_results(&result);

    if let Some(path) = args.output {
        write_json(path, &result)?;
    }

    Ok(())
}
