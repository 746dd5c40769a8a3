//! Kraus representation of quantum channels.
//!
//! Operator convention: a channel acting on the qubit tuple `(q_0, .., q_{k-1})`
//! has `2^k × 2^k` operators whose local basis index has bit `j` equal to the
//! state of `q_j`. Multi-qubit operators are therefore built as
//! `kron(M_{k-1}, .., M_0)`.

use ndarray::{Array2, arr2, linalg::kron};
use num_complex::Complex64;

use crate::error::{NoiseError, NoiseResult};

/// Maximum entrywise deviation of `Σ K_i† K_i` from the identity.
pub const COMPLETENESS_TOLERANCE: f64 = 1e-9;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// A completely positive, trace-preserving map given by Kraus operators.
///
/// Construction always verifies completeness, so a `KrausChannel` value is
/// a valid channel by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct KrausChannel {
    operators: Vec<Array2<Complex64>>,
    num_qubits: usize,
}

impl KrausChannel {
    /// Create a channel, checking shapes and completeness.
    ///
    /// `label` names the channel in error messages.
    pub fn new(label: &str, operators: Vec<Array2<Complex64>>) -> NoiseResult<Self> {
        let Some(first) = operators.first() else {
            return Err(NoiseError::construction(label, "no Kraus operators"));
        };
        let dim = first.nrows();
        if dim == 0 || !dim.is_power_of_two() {
            return Err(NoiseError::construction(
                label,
                format!("operator dimension {dim} is not a power of two"),
            ));
        }
        if let Some(bad) = operators.iter().find(|k| k.dim() != (dim, dim)) {
            return Err(NoiseError::construction(
                label,
                format!("operator of shape {:?} in a {dim}-dimensional channel", bad.dim()),
            ));
        }

        let channel = Self {
            operators,
            num_qubits: dim.trailing_zeros() as usize,
        };
        let deviation = channel.completeness_deviation();
        if !(deviation <= COMPLETENESS_TOLERANCE) {
            return Err(NoiseError::construction(
                label,
                format!(
                    "completeness sum deviates from identity by {deviation:e} (tolerance {COMPLETENESS_TOLERANCE:e})"
                ),
            ));
        }
        Ok(channel)
    }

    /// The identity channel on `num_qubits` qubits.
    pub fn identity(num_qubits: usize) -> Self {
        Self {
            operators: vec![Array2::eye(1 << num_qubits)],
            num_qubits,
        }
    }

    /// The Kraus operators.
    pub fn operators(&self) -> &[Array2<Complex64>] {
        &self.operators
    }

    /// Number of qubits the channel acts on.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Hilbert space dimension.
    pub fn dim(&self) -> usize {
        1 << self.num_qubits
    }

    /// Largest entrywise deviation of `Σ K_i† K_i` from the identity.
    pub fn completeness_deviation(&self) -> f64 {
        let dim = self.dim();
        let mut sum = Array2::<Complex64>::zeros((dim, dim));
        for k in &self.operators {
            sum = sum + dagger(k).dot(k);
        }
        let identity = Array2::<Complex64>::eye(dim);
        (&sum - &identity)
            .iter()
            .map(|z| z.norm())
            .fold(0.0, f64::max)
    }

    /// Channel applying `self` first and then `then`.
    pub fn compose(&self, then: &KrausChannel, label: &str) -> NoiseResult<KrausChannel> {
        if self.num_qubits != then.num_qubits {
            return Err(NoiseError::construction(
                label,
                format!(
                    "cannot compose {}-qubit and {}-qubit channels",
                    self.num_qubits, then.num_qubits
                ),
            ));
        }
        let operators = then
            .operators
            .iter()
            .flat_map(|b| self.operators.iter().map(move |a| b.dot(a)))
            .filter(|k| k.iter().any(|z| z.norm_sqr() > 0.0))
            .collect();
        KrausChannel::new(label, operators)
    }

    /// Apply the channel to a density matrix: `ρ ↦ Σ K ρ K†`.
    pub fn apply_to_density(&self, rho: &Array2<Complex64>) -> Array2<Complex64> {
        let dim = self.dim();
        let mut out = Array2::<Complex64>::zeros((dim, dim));
        for k in &self.operators {
            out = out + k.dot(rho).dot(&dagger(k));
        }
        out
    }
}

/// Conjugate transpose.
pub fn dagger(m: &Array2<Complex64>) -> Array2<Complex64> {
    m.t().mapv(|z| z.conj())
}

/// Single-qubit Pauli matrix: 0 = I, 1 = X, 2 = Y, 3 = Z.
pub fn pauli(index: usize) -> Array2<Complex64> {
    match index % 4 {
        0 => arr2(&[[ONE, ZERO], [ZERO, ONE]]),
        1 => arr2(&[[ZERO, ONE], [ONE, ZERO]]),
        2 => arr2(&[[ZERO, -I], [I, ZERO]]),
        _ => arr2(&[[ONE, ZERO], [ZERO, -ONE]]),
    }
}

/// All `4^n` Pauli strings on `n` qubits, identity first.
///
/// String `s` places Pauli `(s / 4^j) % 4` on local qubit `j`.
pub fn pauli_basis(num_qubits: usize) -> Vec<Array2<Complex64>> {
    let count = 1usize << (2 * num_qubits);
    (0..count)
        .map(|s| {
            let mut op = Array2::<Complex64>::eye(1);
            for j in (0..num_qubits).rev() {
                op = kron(&op, &pauli(s >> (2 * j)));
            }
            op
        })
        .collect()
}

/// Build a 2×2 complex matrix from row-major real entries.
pub(crate) fn real_2x2(entries: [f64; 4]) -> Array2<Complex64> {
    Array2::from_shape_fn((2, 2), |(r, c)| Complex64::new(entries[2 * r + c], 0.0))
}
