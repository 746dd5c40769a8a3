//! qisim Command-Line Interface
//!
//! The main entry point for the `qisim` tool: inspect the noise model of a
//! calibrated processor, run circuits on its simulator, calibrate readout and
//! correct measured distributions.
//!
//! ```text
//!   backend_parameters.json ──→ qisim model
//!            │
//!            ├──→ qisim run --input circuit.json ──→ counts
//!            └──→ qisim calibrate ──→ matrix.json ──→ qisim unmix --probs counts.json
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{calibrate, model, run, unmix, version};

/// qisim - calibrated noise simulation for small superconducting processors
#[derive(Parser)]
#[command(name = "qisim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the assembled noise model of a backend
    Model {
        /// Backend parameter file (JSON or YAML)
        #[arg(short, long)]
        params: Option<String>,

        /// Backend record to select from a multi-backend file
        #[arg(short, long)]
        backend: Option<String>,

        /// Use the calibration values as-is (no gate-count or T1 corrections)
        #[arg(long)]
        exact: bool,
    },

    /// Run a circuit on the simulator of a backend
    Run {
        /// Backend parameter file (JSON or YAML)
        #[arg(short, long)]
        params: Option<String>,

        /// Backend record to select from a multi-backend file
        #[arg(short, long)]
        backend: Option<String>,

        /// Circuit file (JSON)
        #[arg(short, long)]
        input: String,

        /// Number of shots (defaults to the backend's default)
        #[arg(short, long)]
        shots: Option<u32>,

        /// Return per-shot bitstrings
        #[arg(long)]
        memory: bool,

        /// Run without noise
        #[arg(long)]
        ideal: bool,

        /// Sampler seed
        #[arg(long)]
        seed: Option<u64>,

        /// Write the result as JSON
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Estimate the readout assignment matrix of a backend
    Calibrate {
        /// Backend parameter file (JSON or YAML)
        #[arg(short, long)]
        params: Option<String>,

        /// Backend record to select from a multi-backend file
        #[arg(short, long)]
        backend: Option<String>,

        /// Shots per preparation
        #[arg(short, long)]
        shots: Option<u32>,

        /// Sampler seed
        #[arg(long)]
        seed: Option<u64>,

        /// Write the assignment matrix as JSON
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Correct observed probabilities for readout error
    Unmix {
        /// Assignment matrix file (JSON rows)
        #[arg(short, long)]
        matrix: String,

        /// Observed probabilities (JSON array) or counts (JSON object)
        #[arg(long)]
        probs: String,

        /// Z-type observables to evaluate, e.g. ZZ or IZ
        #[arg(long = "observable")]
        observables: Vec<String>,

        /// Write the corrected distribution as JSON
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show version information
    Version,
}

#[tokio::main]
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
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Model {
            params,
            backend,
            exact,
        } => model::execute(params.as_deref(), backend.as_deref(), exact),

        Commands::Run {
            params,
            backend,
            input,
            shots,
            memory,
            ideal,
            seed,
            output,
        } => {
            run::execute(run::RunArgs {
                params: params.as_deref(),
                backend: backend.as_deref(),
                input: &input,
                shots,
                memory,
                ideal,
                seed,
                output: output.as_deref(),
            })
            .await
        }

        Commands::Calibrate {
            params,
            backend,
            shots,
            seed,
            output,
        } => {
            calibrate::execute(
                params.as_deref(),
                backend.as_deref(),
                shots,
                seed,
                output.as_deref(),
            )
            .await
        }

        Commands::Unmix {
            matrix,
            probs,
            observables,
            output,
        } => unmix::execute(&matrix, &probs, &observables, output.as_deref()),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
