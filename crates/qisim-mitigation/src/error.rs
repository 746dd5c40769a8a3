//! Error types for readout mitigation.

use thiserror::Error;

use crate::solver::CorrectedDistribution;

/// Errors raised while estimating or inverting readout error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MitigationError {
    /// Calibration data does not cover every basis state exactly once.
    #[error("Expected {expected} calibration preparations, got {got}")]
    PreparationCount { expected: usize, got: usize },

    /// A preparation has no shots.
    #[error("Calibration preparation {preparation} has no shots")]
    EmptyPreparation { preparation: usize },

    /// A bitstring contains characters other than `0` and `1`.
    #[error("Malformed bitstring '{bitstring}'")]
    MalformedBitstring { bitstring: String },

    /// A classical bit position beyond the bitstring width.
    #[error("Bit {bit} is out of range for a {width}-bit outcome")]
    BitOutOfRange { bit: usize, width: usize },

    /// A bitstring that does not divide into whole measurement blocks.
    #[error("A {width}-bit outcome does not split into blocks of {block} bits")]
    MisalignedBlocks { width: usize, block: usize },

    /// More bits than an outcome distribution can be indexed by.
    #[error("{bits} bits exceed the supported register width of {max}")]
    RegisterTooWide { bits: usize, max: usize },

    /// A matrix that is not a square, row-stochastic, power-of-two matrix.
    #[error("Invalid assignment matrix: {0}")]
    InvalidAssignmentMatrix(String),

    /// A probability vector of the wrong length or with invalid entries.
    #[error("Expected a probability vector of length {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Invalid observed probabilities.
    #[error("Invalid probabilities: {0}")]
    InvalidProbabilities(String),

    /// An observable the diagonal estimator cannot evaluate.
    #[error("Unsupported observable '{observable}': {reason}")]
    UnsupportedObservable { observable: String, reason: String },

    /// The solver hit its iteration limit. The last iterate is attached and
    /// lies in the simplex.
    #[error("Readout correction did not converge after {iterations} iterations")]
    Convergence {
        iterations: usize,
        estimate: CorrectedDistribution,
    },

    /// Calibration circuit construction failed.
    #[error(transparent)]
    Ir(#[from] qisim_ir::IrError),
}

/// Result type for mitigation operations.
pub type MitigationResult<T> = Result<T, MitigationError>;
