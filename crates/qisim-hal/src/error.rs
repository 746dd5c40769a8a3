//! Error types for the HAL crate.

use thiserror::Error;

/// Errors that can occur when validating or executing a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// Operation outside the native set, or a two-qubit gate on an uncoupled pair.
    #[error("Unsupported operation '{operation}' on qubits {qubits:?}: {reason}")]
    UnsupportedOperation {
        /// Operation name.
        operation: String,
        /// Physical qubits it acts on.
        qubits: Vec<u32>,
        /// Why it was rejected.
        reason: String,
    },

    /// Circuit needs more qubits than the register provides.
    #[error("Circuit needs {required} qubits but the register holds {available}")]
    Capacity {
        /// Qubits the circuit uses.
        required: usize,
        /// Register size.
        available: usize,
    },

    /// Circuit writes more classical bits than a result can hold.
    #[error("Circuit needs {required} classical bits but results hold at most {max}")]
    ClassicalCapacity {
        /// Classical bits the circuit declares.
        required: usize,
        /// Widest supported register.
        max: usize,
    },

    /// Requested shots exceed the processor maximum.
    #[error("Requested {requested} shots exceeds the maximum of {max}")]
    ShotLimit {
        /// Requested shot count.
        requested: u32,
        /// Processor maximum.
        max: u32,
    },

    /// Invalid number of shots.
    #[error("Invalid shots: {0}")]
    InvalidShots(String),

    /// Invalid circuit.
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Calibration or noise model error.
    #[error(transparent)]
    Noise(#[from] qisim_noise::NoiseError),

    /// Circuit construction error.
    #[error(transparent)]
    Ir(#[from] qisim_ir::IrError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic backend error.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
