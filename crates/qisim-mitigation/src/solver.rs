//! Constrained least-squares readout correction.
//!
//! Observed probabilities `p` are unmixed by solving
//!
//! ```text
//! minimize ‖A·x − p‖²   subject to   Σ x = 1,  0 ≤ x ≤ 1
//! ```
//!
//! with projected gradient descent: a gradient step of length `1/L`, where
//! `L = 2·σ_max(A)²` is the Lipschitz constant of the gradient, followed by
//! the exact Euclidean projection onto the probability simplex. Every iterate
//! lies in the simplex, and the iteration is fully deterministic from the
//! uniform starting point.

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::assignment::AssignmentMatrix;
use crate::error::{MitigationError, MitigationResult};

const POWER_ITERATION_LIMIT: usize = 1000;
const POWER_ITERATION_TOLERANCE: f64 = 1e-14;

/// Stopping rules for the solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Iteration limit before reporting non-convergence.
    pub max_iterations: usize,
    /// Converged once no coordinate moves by more than this.
    pub tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 20_000,
            tolerance: 1e-12,
        }
    }
}

impl SolverOptions {
    /// Set the iteration limit.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the step tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// A corrected probability distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectedDistribution {
    /// Corrected probabilities indexed by basis state.
    pub probabilities: Vec<f64>,
    /// Iterations performed.
    pub iterations: usize,
    /// `‖A·x − p‖₂` at the returned point.
    pub residual: f64,
    /// Whether the step tolerance was reached.
    pub converged: bool,
}

/// Euclidean projection onto the probability simplex.
pub fn project_onto_simplex(v: ArrayView1<'_, f64>) -> Array1<f64> {
    let mut sorted = v.to_vec();
    sorted.sort_unstable_by(|a, b| b.total_cmp(a));

    let mut cumulative = 0.0;
    let mut theta = 0.0;
    for (j, &u) in sorted.iter().enumerate() {
        cumulative += u;
        let candidate = (cumulative - 1.0) / (j + 1) as f64;
        if u - candidate > 0.0 {
            theta = candidate;
        }
    }
    v.mapv(|x| (x - theta).clamp(0.0, 1.0))
}

/// Largest eigenvalue of `AᵀA`, by power iteration from the uniform vector.
fn largest_gram_eigenvalue(a: &Array2<f64>) -> f64 {
    let dim = a.ncols();
    let mut v = Array1::from_elem(dim, 1.0 / (dim as f64).sqrt());
    let mut lambda = 0.0;
    for _ in 0..POWER_ITERATION_LIMIT {
        let w = a.t().dot(&a.dot(&v));
        let norm = w.dot(&w).sqrt();
        if norm == 0.0 {
            return 0.0;
        }
        v = w / norm;
        let converged = (norm - lambda).abs() <= POWER_ITERATION_TOLERANCE * norm;
        lambda = norm;
        if converged {
            break;
        }
    }
    lambda
}

fn residual(a: &Array2<f64>, x: &Array1<f64>, p: &Array1<f64>) -> f64 {
    let r = a.dot(x) - p;
    r.dot(&r).sqrt()
}

/// Correct `observed` probabilities with default solver options.
pub fn correct_probabilities(
    observed: &[f64],
    assignment: &AssignmentMatrix,
) -> MitigationResult<CorrectedDistribution> {
    correct_probabilities_with(observed, assignment, &SolverOptions::default())
}

/// Correct `observed` probabilities.
///
/// Fails with [`MitigationError::Convergence`] carrying the last iterate when
/// the iteration limit is reached first.
#[instrument(skip_all, fields(dim = assignment.dim()))]
pub fn correct_probabilities_with(
    observed: &[f64],
    assignment: &AssignmentMatrix,
    options: &SolverOptions,
) -> MitigationResult<CorrectedDistribution> {
    let dim = assignment.dim();
    if observed.len() != dim {
        return Err(MitigationError::DimensionMismatch {
            expected: dim,
            got: observed.len(),
        });
    }
    if let Some(bad) = observed.iter().find(|p| !p.is_finite()) {
        return Err(MitigationError::InvalidProbabilities(format!(
            "non-finite entry {bad}"
        )));
    }

    let a = assignment.as_array();
    let p = Array1::from_vec(observed.to_vec());
    let lipschitz = 2.0 * largest_gram_eigenvalue(a);
    let step = 1.0 / lipschitz;
    let at_p = a.t().dot(&p);
    let gram = a.t().dot(a);
    debug!("Lipschitz constant {lipschitz:.6}");

    let mut x = Array1::from_elem(dim, 1.0 / dim as f64);
    for iteration in 1..=options.max_iterations {
        let gradient = (gram.dot(&x) - &at_p) * 2.0;
        let next = project_onto_simplex((&x - &(gradient * step)).view());
        let change = (&next - &x)
            .iter()
            .fold(0.0f64, |acc, d| acc.max(d.abs()));
        x = next;
        if change < options.tolerance {
            debug!("Converged after {iteration} iterations");
            return Ok(CorrectedDistribution {
                residual: residual(a, &x, &p),
                probabilities: x.to_vec(),
                iterations: iteration,
                converged: true,
            });
        }
    }

    warn!(
        "Readout correction stopped at the limit of {} iterations",
        options.max_iterations
    );
    Err(MitigationError::Convergence {
        iterations: options.max_iterations,
        estimate: CorrectedDistribution {
            residual: residual(a, &x, &p),
            probabilities: x.to_vec(),
            iterations: options.max_iterations,
            converged: false,
        },
    })
}

/// Correct every measurement block of a mid-circuit run with one assignment
/// matrix, in block order.
///
/// The first block that fails stops the run with its error.
pub fn correct_block_probabilities(
    blocks: &[Vec<f64>],
    assignment: &AssignmentMatrix,
    options: &SolverOptions,
) -> MitigationResult<Vec<CorrectedDistribution>> {
    blocks
        .iter()
        .enumerate()
        .map(|(block, observed)| {
            debug!("Correcting measurement block {block}");
            correct_probabilities_with(observed, assignment, options)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn uniform_misassignment(eps: f64) -> AssignmentMatrix {
        let off = eps / 3.0;
        let rows = (0..4)
            .map(|i| (0..4).map(|j| if i == j { 1.0 - eps } else { off }).collect())
            .collect();
        AssignmentMatrix::from_rows(rows).unwrap()
    }

    fn assert_in_simplex(x: &[f64]) {
        let sum: f64 = x.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum = {sum}");
        assert!(x.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_projection() {
        let inside = array![0.2, 0.3, 0.5];
        assert_eq!(project_onto_simplex(inside.view()), inside);

        let projected = project_onto_simplex(array![2.0, 0.0].view());
        assert_eq!(projected, array![1.0, 0.0]);

        let projected = project_onto_simplex(array![0.5, 0.5, -1.0].view());
        assert_eq!(projected, array![0.5, 0.5, 0.0]);

        let projected = project_onto_simplex(array![0.0, 0.0].view());
        assert_eq!(projected, array![0.5, 0.5]);
    }

    #[test]
    fn test_identity_returns_observed() {
        let observed = [0.1, 0.2, 0.3, 0.4];
        let result = correct_probabilities(&observed, &AssignmentMatrix::identity(2)).unwrap();
        assert!(result.converged);
        for (x, p) in result.probabilities.iter().zip(observed) {
            assert!((x - p).abs() < 1e-12);
        }
    }

    #[test]
    fn test_recovers_injected_distribution() {
        let assignment = uniform_misassignment(0.01);
        let truth = array![0.5, 0.2, 0.2, 0.1];
        let observed = assignment.as_array().dot(&truth);

        let result = correct_probabilities(observed.as_slice().unwrap(), &assignment).unwrap();
        assert!(result.converged);
        assert!(result.residual < 1e-9);
        for (x, t) in result.probabilities.iter().zip(truth.iter()) {
            assert!((x - t).abs() < 1e-6, "{x} vs {t}");
        }
    }

    #[test]
    fn test_adversarial_observation_stays_in_simplex() {
        // A⁻¹p is far outside the simplex for this observation.
        let assignment = uniform_misassignment(0.2);
        let observed = [1.0, 0.0, 0.0, 0.0];
        let result = correct_probabilities(&observed, &assignment).unwrap();
        assert_in_simplex(&result.probabilities);
        assert!((result.probabilities[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = correct_probabilities(&[1.0, 0.0], &AssignmentMatrix::identity(2)).unwrap_err();
        assert!(matches!(
            err,
            MitigationError::DimensionMismatch {
                expected: 4,
                got: 2
            }
        ));
        let err = correct_probabilities(&[f64::NAN, 1.0], &AssignmentMatrix::identity(1));
        assert!(matches!(err, Err(MitigationError::InvalidProbabilities(_))));
    }

    #[test]
    fn test_non_convergence_reports_estimate() {
        // A zero tolerance can never be met.
        let assignment = uniform_misassignment(0.3);
        let options = SolverOptions::default()
            .with_max_iterations(1)
            .with_tolerance(0.0);
        let err = correct_probabilities_with(&[0.7, 0.1, 0.1, 0.1], &assignment, &options)
            .unwrap_err();
        match err {
            MitigationError::Convergence {
                iterations,
                estimate,
            } => {
                assert_eq!(iterations, 1);
                assert!(!estimate.converged);
                assert_in_simplex(&estimate.probabilities);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_deterministic() {
        let assignment = uniform_misassignment(0.05);
        let observed = [0.4, 0.3, 0.2, 0.1];
        let a = correct_probabilities(&observed, &assignment).unwrap();
        let b = correct_probabilities(&observed, &assignment).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_gram_eigenvalue_of_identity() {
        let eye = Array2::<f64>::eye(4);
        assert!((largest_gram_eigenvalue(&eye) - 1.0).abs() < 1e-12);
    }
}
