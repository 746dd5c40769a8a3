//! Noisy executor.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use qisim_compile::{BasisGates, CompileError, CouplingMap, PassManagerBuilder};
use qisim_hal::{
    Backend, Capabilities, ExecutionRequest, ExecutionResult, HalError, HalResult,
    MAX_CLASSICAL_BITS,
};
use qisim_ir::Circuit;
use qisim_noise::{AssembledNoiseModel, QubitLayout};

/// Per-run options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Shot count; the processor default when `None`.
    pub shots: Option<u32>,
    /// Return per-shot bitstrings as well as counts.
    pub memory: bool,
}

impl RunOptions {
    /// Default options: processor default shots, counts only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a shot count.
    #[must_use]
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = Some(shots);
        self
    }

    /// Request per-shot memory.
    #[must_use]
    pub fn with_memory(mut self, memory: bool) -> Self {
        self.memory = memory;
        self
    }
}

/// Executes circuits against one calibrated processor.
///
/// The executor is immutable after construction and may be shared across
/// concurrent runs; the noise model is shared read-only.
pub struct NoisyExecutor {
    capabilities: Capabilities,
    layout: QubitLayout,
    backend: Arc<dyn Backend>,
    noise_model: Option<Arc<AssembledNoiseModel>>,
}

impl NoisyExecutor {
    /// An ideal executor for the described processor.
    pub fn new(capabilities: Capabilities, layout: QubitLayout, backend: Arc<dyn Backend>) -> Self {
        Self {
            capabilities,
            layout,
            backend,
            noise_model: None,
        }
    }

    /// Attach a noise model.
    ///
    /// The model must have been assembled for this executor's qubit layout.
    pub fn with_noise_model(mut self, model: Arc<AssembledNoiseModel>) -> HalResult<Self> {
        if model.layout() != &self.layout {
            return Err(HalError::Configuration(format!(
                "noise model '{}' was assembled for a different qubit layout",
                model.profile_name()
            )));
        }
        self.noise_model = Some(model);
        Ok(self)
    }

    /// Processor description.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Label to physical index mapping.
    pub fn layout(&self) -> &QubitLayout {
        &self.layout
    }

    /// The attached noise model, if any.
    pub fn noise_model(&self) -> Option<&Arc<AssembledNoiseModel>> {
        self.noise_model.as_ref()
    }

    /// Whether runs are noisy.
    pub fn is_noisy(&self) -> bool {
        self.noise_model.is_some()
    }

    fn resolve_shots(&self, requested: Option<u32>) -> HalResult<u32> {
        let shots = requested.unwrap_or(self.capabilities.default_shots);
        if shots == 0 {
            return Err(HalError::InvalidShots("shots must be positive".into()));
        }
        if shots > self.capabilities.max_shots {
            return Err(HalError::ShotLimit {
                requested: shots,
                max: self.capabilities.max_shots,
            });
        }
        Ok(shots)
    }

    /// Validate `circuit` against the processor and rewrite it for execution.
    pub fn prepare(&self, circuit: &Circuit) -> HalResult<Circuit> {
        let available = self.capabilities.num_qubits as usize;
        if circuit.num_qubits() > available {
            return Err(HalError::Capacity {
                required: circuit.num_qubits(),
                available,
            });
        }
        if circuit.num_clbits() > MAX_CLASSICAL_BITS {
            return Err(HalError::ClassicalCapacity {
                required: circuit.num_clbits(),
                max: MAX_CLASSICAL_BITS,
            });
        }

        let coupling_map = CouplingMap::from_edges(
            self.capabilities.num_qubits,
            self.capabilities.topology.edges.iter().copied(),
        );
        let gate_set = &self.capabilities.gate_set;
        let basis = BasisGates::new(
            gate_set
                .single_qubit
                .iter()
                .chain(&gate_set.two_qubit)
                .cloned(),
        );
        let (pm, mut properties) = PassManagerBuilder::new()
            .with_target(coupling_map, basis)
            .build();

        let mut prepared = circuit.clone();
        pm.run(&mut prepared, &mut properties).map_err(into_hal_error)?;
        Ok(prepared)
    }

    /// Run `circuit` with one backend call; no retries.
    #[instrument(skip_all, fields(circuit = circuit.name(), backend = self.backend.name()))]
    pub async fn run(&self, circuit: &Circuit, options: RunOptions) -> HalResult<ExecutionResult> {
        let shots = self.resolve_shots(options.shots)?;
        let prepared = self.prepare(circuit)?;
        debug!(
            "Prepared circuit: {} -> {} instructions",
            circuit.len(),
            prepared.len()
        );

        let mut request = ExecutionRequest::new(shots).with_memory(options.memory);
        if let Some(model) = &self.noise_model {
            request = request.with_noise_model(Arc::clone(model));
        }

        info!(
            "Executing {} shots ({})",
            shots,
            if self.is_noisy() { "noisy" } else { "ideal" }
        );
        self.backend.execute(&prepared, &request).await
    }
}

fn into_hal_error(err: CompileError) -> HalError {
    match err {
        CompileError::UnsupportedOperation {
            operation,
            qubits,
            reason,
        } => HalError::UnsupportedOperation {
            operation,
            qubits,
            reason,
        },
        CompileError::CircuitTooLarge {
            required,
            available,
        } => HalError::Capacity {
            required,
            available: available as usize,
        },
        CompileError::Ir(e) => HalError::Ir(e),
        other => HalError::Configuration(other.to_string()),
    }
}
