//! Shared helpers for CLI commands.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::de::DeserializeOwned;
use tracing::info;

use qisim_adapter_sim::SimulatorBackend;
use qisim_exec::NoisyExecutor;
use qisim_hal::{Capabilities, ExecutionResult};
use qisim_ir::Circuit;
use qisim_noise::{
    AssembledNoiseModel, AssemblyOptions, BackendParameters, CalibrationProfile,
    NoiseModelAssembler,
};

/// File name of the default parameter file.
pub const DEFAULT_PARAMS_FILE: &str = "backend_parameters.json";

/// Default parameter file: `<config_dir>/qisim/backend_parameters.json`.
pub fn default_params_path() -> Result<PathBuf> {
    let config =
        dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(config.join("qisim").join(DEFAULT_PARAMS_FILE))
}

/// A calibrated processor loaded from a parameter file.
#[derive(Debug, Clone)]
pub struct Device {
    pub capabilities: Capabilities,
    pub profile: CalibrationProfile,
}

impl Device {
    /// Load a backend record from `params` (or the default parameter file).
    pub fn load(params: Option<&str>, backend: Option<&str>) -> Result<Self> {
        let path = match params {
            Some(path) => PathBuf::from(path),
            None => default_params_path()?,
        };
        if !path.exists() {
            anyhow::bail!(
                "Parameter file not found: {} (pass --params)",
                path.display()
            );
        }

        let parameters = BackendParameters::from_path(&path, backend).with_context(|| {
            format!("Failed to load backend parameters from {}", path.display())
        })?;
        let name = backend.unwrap_or("default");
        let capabilities = Capabilities::from_parameters(name, &parameters)?;
        let profile = CalibrationProfile::from_parameters(name, &parameters)
            .with_context(|| format!("Invalid calibration for backend '{name}'"))?;
        info!(
            backend = name,
            qubits = capabilities.num_qubits,
            "Loaded backend parameters"
        );

        Ok(Self {
            capabilities,
            profile,
        })
    }

    /// Assemble the noise model of this device.
    pub fn noise_model(&self, exact: bool) -> Result<AssembledNoiseModel> {
        let options = if exact {
            AssemblyOptions::exact()
        } else {
            AssemblyOptions::default()
        };
        NoiseModelAssembler::new(options)
            .assemble(&self.profile)
            .with_context(|| format!("Failed to assemble noise model for '{}'", self.profile.name()))
    }

    /// An executor backed by the state-vector simulator.
    pub fn executor(&self, ideal: bool, seed: Option<u64>) -> Result<NoisyExecutor> {
        let mut simulator = SimulatorBackend::new(self.capabilities.clone());
        if let Some(seed) = seed {
            simulator = simulator.with_seed(seed);
        }
        let executor = NoisyExecutor::new(
            self.capabilities.clone(),
            self.profile.layout().clone(),
            Arc::new(simulator),
        );
        if ideal {
            return Ok(executor);
        }
        Ok(executor.with_noise_model(Arc::new(self.noise_model(false)?))?)
    }
}

/// Read and deserialize a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;
    serde_json::from_str(&source).with_context(|| format!("Failed to parse JSON in {path}"))
}

/// Write a value as pretty-printed JSON.
pub fn write_json<T: serde::Serialize>(path: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write file: {path}"))?;
    println!("  Wrote {}", style(path).green());
    Ok(())
}

/// Load a circuit from its JSON form.
pub fn load_circuit(path: &str) -> Result<Circuit> {
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }
    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;
    Circuit::from_json(&source).map_err(|e| anyhow::anyhow!("Invalid circuit in {path}: {e}"))
}

/// Spinner shown while a simulation runs.
pub fn spinner(message: impl Into<String>) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(message.into());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(spinner)
}

/// Print execution results in a table format.
pub fn print_results(result: &ExecutionResult) {
    println!(
        "\n{} Results ({} shots):",
        style("✓").green().bold(),
        result.shots_done
    );

    let mut sorted: Vec<_> = result.counts.iter().filter(|(_, c)| **c > 0).collect();
    sorted.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    let total = result.counts.total_shots().max(1) as f64;

    for (bitstring, count) in sorted.iter().take(16) {
        let prob = **count as f64 / total * 100.0;
        let bar_len = (prob / 2.0).round() as usize;
        let bar: String = "█".repeat(bar_len);

        println!(
            "  {}: {:>6} ({:>5.2}%) {}",
            style(bitstring).cyan(),
            count,
            prob,
            style(bar).green()
        );
    }

    if sorted.len() > 16 {
        println!("  ... and {} more outcomes", sorted.len() - 16);
    }

    if let Some(time_ms) = result.execution_time_ms {
        println!("\n  Execution time: {} ms", style(time_ms).yellow());
    }
}

/// Print a matrix with fixed precision.
pub fn print_matrix(rows: &[Vec<f64>]) {
    for row in rows {
        let cells: Vec<String> = row.iter().map(|v| format!("{v:.4}")).collect();
        println!("  [{}]", cells.join(", "));
    }
}
