//! Backend trait.
//!
//! A backend is the black box that samples a circuit: it receives a circuit
//! that has already been validated and delay-expanded, an optional noise model
//! and a shot count, and returns counts (and optionally per-shot memory).
//!
//! ```text
//!   capabilities() ──→ execute(circuit, request) ──→ ExecutionResult
//!    (sync, &ref)            (async)
//! ```
//!
//! All shots of one request execute together; a backend either returns a
//! complete result or an error.

use std::sync::Arc;

use async_trait::async_trait;

use qisim_ir::Circuit;
use qisim_noise::AssembledNoiseModel;

use crate::capability::Capabilities;
use crate::error::HalResult;
use crate::result::ExecutionResult;

/// What to run and how.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    /// Number of shots.
    pub shots: u32,
    /// Return per-shot bitstrings as well as counts.
    pub memory: bool,
    /// Noise model to apply; `None` runs the ideal circuit.
    pub noise_model: Option<Arc<AssembledNoiseModel>>,
}

impl ExecutionRequest {
    /// Ideal execution with `shots` shots.
    pub fn new(shots: u32) -> Self {
        Self {
            shots,
            memory: false,
            noise_model: None,
        }
    }

    /// Request per-shot memory.
    pub fn with_memory(mut self, memory: bool) -> Self {
        self.memory = memory;
        self
    }

    /// Apply a noise model.
    pub fn with_noise_model(mut self, model: Arc<AssembledNoiseModel>) -> Self {
        self.noise_model = Some(model);
        self
    }
}

/// Trait for simulation backends.
///
/// # Contract
///
/// - `capabilities()` is synchronous and infallible; capabilities are fixed
///   at construction.
/// - `execute()` runs every requested shot or fails; it never retries.
/// - Noise channels are looked up by operation name and physical qubits and
///   applied in instruction order.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Get the capabilities of this backend.
    fn capabilities(&self) -> &Capabilities;

    /// Execute a circuit.
    async fn execute(
        &self,
        circuit: &Circuit,
        request: &ExecutionRequest,
    ) -> HalResult<ExecutionResult>;
}
