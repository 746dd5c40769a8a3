//! qisim Trajectory Simulator
//!
//! A statevector backend that applies an [`AssembledNoiseModel`] by
//! sampling one Kraus operator per channel application (quantum
//! trajectories). Averaged over shots this reproduces the density-matrix
//! evolution at statevector memory cost.
//!
//! | Qubits | Memory |
//! |--------|--------|
//! | 10 | ~16 KB |
//! | 20 | ~16 MB |
//! | 24 | ~256 MB |
//!
//! # Example
//!
//! ```rust
//! use qisim_adapter_sim::SimulatorBackend;
//! use qisim_hal::{Backend, ExecutionRequest};
//! use qisim_ir::Circuit;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let backend = SimulatorBackend::ideal(2).with_seed(1);
//! let circuit = Circuit::bell().unwrap();
//! let result = backend.execute(&circuit, &ExecutionRequest::new(100)).await.unwrap();
//! assert_eq!(result.counts.get("00") + result.counts.get("11"), 100);
//! # });
//! ```
//!
//! [`AssembledNoiseModel`]: qisim_noise::AssembledNoiseModel

mod simulator;
mod statevector;

pub use simulator::{MAX_QUBITS, SimulatorBackend};
pub use statevector::Statevector;
