//! qisim Hardware Abstraction Layer
//!
//! This crate defines the seam between circuit execution and the simulation
//! engine that samples circuits:
//!
//! - [`Capabilities`]: the processor description (register size, native
//!   operations, coupling map, shot limits), usually built from a backend
//!   parameter file with [`Capabilities::from_parameters`]
//! - [`Backend`]: the async trait a simulation engine implements
//! - [`ExecutionRequest`] / [`ExecutionResult`] / [`Counts`]: what goes in and
//!   what comes out
//! - [`HalError`]: execution-time rejects (unsupported operation, capacity,
//!   shot limit) and backend failures
//!
//! # Implementing a backend
//!
//! ```rust
//! use async_trait::async_trait;
//! use qisim_hal::{Backend, Capabilities, Counts, ExecutionRequest, ExecutionResult, HalResult};
//! use qisim_ir::Circuit;
//!
//! struct AllZeros {
//!     capabilities: Capabilities,
//! }
//!
//! #[async_trait]
//! impl Backend for AllZeros {
//!     fn name(&self) -> &str {
//!         "all-zeros"
//!     }
//!
//!     fn capabilities(&self) -> &Capabilities {
//!         &self.capabilities
//!     }
//!
//!     async fn execute(
//!         &self,
//!         circuit: &Circuit,
//!         request: &ExecutionRequest,
//!     ) -> HalResult<ExecutionResult> {
//!         let width = circuit.num_clbits();
//!         let mut counts = Counts::zero_filled(width);
//!         counts.insert("0".repeat(width), u64::from(request.shots));
//!         Ok(ExecutionResult::new(counts, request.shots).with_circuit(circuit.name()))
//!     }
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod result;

pub use backend::{Backend, ExecutionRequest};
pub use capability::{Capabilities, DIRECTIVES, GateSet, Topology, TopologyKind};
pub use error::{HalError, HalResult};
pub use job::JobId;
pub use result::{Counts, ExecutionResult, MAX_CLASSICAL_BITS, format_bitstring, outcome_space};
