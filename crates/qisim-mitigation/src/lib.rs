//! Readout-error mitigation.
//!
//! Readout error is described by an [`AssignmentMatrix`]: row `i` holds the
//! probabilities of declaring each basis state after preparing state `i`.
//! The matrix is estimated from calibration shots, and observed outcome
//! distributions are corrected by constrained least squares so the result is
//! always a valid probability distribution.
//!
//! ```text
//!   readout_calibration_circuits ──→ execute ──→ extract_assignment_matrix
//!                                                        │
//!   experiment counts ──→ probabilities_from_counts ──→ correct_probabilities
//!   mid-circuit memory ──→ block_probabilities ──→ correct_block_probabilities
//! ```
//!
//! # Example
//!
//! ```rust
//! use qisim_mitigation::{AssignmentMatrix, correct_probabilities, expectation_z};
//!
//! let assignment = AssignmentMatrix::from_rows(vec![
//!     vec![0.9, 0.1],
//!     vec![0.2, 0.8],
//! ])?;
//! let corrected = correct_probabilities(&[0.9, 0.1], &assignment)?;
//! assert!(corrected.converged);
//! assert!(expectation_z(&corrected.probabilities, "Z")? > 0.99);
//! # Ok::<(), qisim_mitigation::MitigationError>(())
//! ```

pub mod assignment;
pub mod calibration;
pub mod error;
pub mod observables;
pub mod solver;

pub use assignment::{AssignmentMatrix, extract_assignment_matrix};
pub use calibration::{
    CalibrationSplit, append_readout_calibration, combined_readout_calibration_circuit,
    readout_calibration_circuits, split_appended_calibration_blocks, split_calibration_blocks,
};
pub use error::{MitigationError, MitigationResult};
pub use observables::{
    block_counts, block_probabilities, expectation_z, probabilities_from_counts,
    probabilities_from_memory,
};
pub use solver::{
    CorrectedDistribution, SolverOptions, correct_block_probabilities, correct_probabilities,
    correct_probabilities_with, project_onto_simplex,
};
