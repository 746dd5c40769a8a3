//! qisim Noisy Executor
//!
//! [`NoisyExecutor`] runs a circuit on a backend as the calibrated processor
//! would accept it: shot limits and register size are enforced, gates must
//! be native and two-qubit gates must act on coupled pairs. Qubits are
//! placed with a fixed identity layout and nothing is routed, so the noise a
//! circuit accumulates is exactly the noise of the operations it names.
//! Delays are split into unit steps before the single backend call.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use qisim_adapter_sim::SimulatorBackend;
//! use qisim_exec::{NoisyExecutor, RunOptions};
//! use qisim_hal::Capabilities;
//! use qisim_ir::Circuit;
//! use qisim_noise::QubitLayout;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let capabilities = Capabilities::simulator(2);
//! let backend = Arc::new(SimulatorBackend::new(capabilities.clone()));
//! let executor = NoisyExecutor::new(capabilities, QubitLayout::trivial(2), backend);
//!
//! let result = executor
//!     .run(&Circuit::bell().unwrap(), RunOptions::new().with_shots(100))
//!     .await
//!     .unwrap();
//! assert_eq!(result.shots_done, 100);
//! # });
//! ```

mod executor;

pub use executor::{NoisyExecutor, RunOptions};
