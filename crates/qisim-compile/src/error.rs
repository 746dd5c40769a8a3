//! Error types for the compilation crate.

use thiserror::Error;

/// Errors raised by compilation passes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] qisim_ir::IrError),

    /// Missing coupling map for a connectivity check.
    #[error("Missing coupling map")]
    MissingCouplingMap,

    /// Missing basis gates for a native gate check.
    #[error("Missing basis gates")]
    MissingBasisGates,

    /// An operation the target cannot execute.
    #[error("Unsupported operation '{operation}' on qubits {qubits:?}: {reason}")]
    UnsupportedOperation {
        operation: String,
        qubits: Vec<u32>,
        reason: String,
    },

    /// Circuit too large for target.
    #[error("Circuit requires {required} qubits but target only has {available}")]
    CircuitTooLarge { required: usize, available: u32 },
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
