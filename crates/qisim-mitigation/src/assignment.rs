//! Assignment matrices estimated from calibration shots.
//!
//! Row `i` of an assignment matrix is the distribution of declared outcomes
//! when basis state `i` was prepared. Basis indices read bitstrings as
//! binary numbers, so classical bit 0 is the rightmost character.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use qisim_hal::{MAX_CLASSICAL_BITS, outcome_space};

use crate::error::{MitigationError, MitigationResult};

/// Row sums may deviate from one by at most this much.
const ROW_SUM_TOLERANCE: f64 = 1e-9;

/// A `2^n × 2^n` row-stochastic readout assignment matrix.
///
/// Serialized as row-major nested arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct AssignmentMatrix {
    matrix: Array2<f64>,
    num_qubits: usize,
}

impl AssignmentMatrix {
    /// Wrap a matrix after checking shape and stochasticity.
    pub fn from_array(matrix: Array2<f64>) -> MitigationResult<Self> {
        let (rows, cols) = matrix.dim();
        if rows != cols || rows == 0 || !rows.is_power_of_two() {
            return Err(MitigationError::InvalidAssignmentMatrix(format!(
                "shape {rows}x{cols} is not a square power of two"
            )));
        }
        if let Some(bad) = matrix.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(MitigationError::InvalidAssignmentMatrix(format!(
                "entry {bad} outside [0, 1]"
            )));
        }
        for (i, row) in matrix.rows().into_iter().enumerate() {
            let sum = row.sum();
            if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                return Err(MitigationError::InvalidAssignmentMatrix(format!(
                    "row {i} sums to {sum}"
                )));
            }
        }
        Ok(Self {
            num_qubits: rows.trailing_zeros() as usize,
            matrix,
        })
    }

    /// Build from row-major rows.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> MitigationResult<Self> {
        let dim = rows.len();
        if let Some(row) = rows.iter().find(|r| r.len() != dim) {
            return Err(MitigationError::InvalidAssignmentMatrix(format!(
                "row of length {} in a {dim}-row matrix",
                row.len()
            )));
        }
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let matrix = Array2::from_shape_vec((dim, dim), flat)
            .map_err(|e| MitigationError::InvalidAssignmentMatrix(e.to_string()))?;
        Self::from_array(matrix)
    }

    /// Perfect readout on `num_qubits` qubits.
    pub fn identity(num_qubits: usize) -> Self {
        Self {
            matrix: Array2::eye(1 << num_qubits),
            num_qubits,
        }
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Matrix dimension, `2^n`.
    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    /// The underlying matrix.
    pub fn as_array(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// `P(declared | prepared)`.
    pub fn probability(&self, prepared: usize, declared: usize) -> f64 {
        self.matrix[[prepared, declared]]
    }

    /// Row-major copy.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.matrix.rows().into_iter().map(|r| r.to_vec()).collect()
    }

    /// Mean probability of declaring the prepared state.
    pub fn mean_fidelity(&self) -> f64 {
        self.matrix.diag().mean().unwrap_or(0.0)
    }
}

impl TryFrom<Vec<Vec<f64>>> for AssignmentMatrix {
    type Error = MitigationError;

    fn try_from(rows: Vec<Vec<f64>>) -> MitigationResult<Self> {
        Self::from_rows(rows)
    }
}

impl From<AssignmentMatrix> for Vec<Vec<f64>> {
    fn from(matrix: AssignmentMatrix) -> Self {
        matrix.to_rows()
    }
}

/// Number of basis states over `num_bits` bits.
pub(crate) fn basis_size(num_bits: usize) -> MitigationResult<usize> {
    outcome_space(num_bits).ok_or(MitigationError::RegisterTooWide {
        bits: num_bits,
        max: MAX_CLASSICAL_BITS,
    })
}

/// Parse a bitstring into its bits, bit 0 first.
pub(crate) fn parse_bits(bitstring: &str) -> MitigationResult<Vec<u8>> {
    bitstring
        .bytes()
        .rev()
        .map(|b| match b {
            b'0' => Ok(0),
            b'1' => Ok(1),
            _ => Err(MitigationError::MalformedBitstring {
                bitstring: bitstring.to_string(),
            }),
        })
        .collect()
}

/// Estimate the assignment matrix from calibration shots.
///
/// `calibration_shots[i]` holds the declared bitstrings of the run that
/// prepared basis state `i`. `qubits[k]` is the classical bit position
/// holding qubit `k`'s outcome, so the declared index of a shot is
/// `Σ_k bit(qubits[k]) << k`.
pub fn extract_assignment_matrix(
    calibration_shots: &[Vec<String>],
    qubits: &[usize],
) -> MitigationResult<AssignmentMatrix> {
    let dim = basis_size(qubits.len())?;
    if calibration_shots.len() != dim {
        return Err(MitigationError::PreparationCount {
            expected: dim,
            got: calibration_shots.len(),
        });
    }

    let mut matrix = Array2::<f64>::zeros((dim, dim));
    for (prepared, shots) in calibration_shots.iter().enumerate() {
        if shots.is_empty() {
            return Err(MitigationError::EmptyPreparation {
                preparation: prepared,
            });
        }
        let weight = 1.0 / shots.len() as f64;
        for shot in shots {
            let bits = parse_bits(shot)?;
            let mut declared = 0;
            for (k, &bit) in qubits.iter().enumerate() {
                let value = bits.get(bit).ok_or(MitigationError::BitOutOfRange {
                    bit,
                    width: bits.len(),
                })?;
                declared |= usize::from(*value) << k;
            }
            matrix[[prepared, declared]] += weight;
        }
    }
    debug!(
        "Extracted {dim}x{dim} assignment matrix from {} shots",
        calibration_shots.iter().map(Vec::len).sum::<usize>()
    );

    // Frequencies sum to one up to rounding; renormalize so the row check is exact.
    for mut row in matrix.rows_mut() {
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    AssignmentMatrix::from_array(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shots(bitstrings: &[&str]) -> Vec<String> {
        bitstrings.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_noiseless_calibration_is_identity() {
        let calibration = vec![
            shots(&["00", "00"]),
            shots(&["01", "01"]),
            shots(&["10", "10"]),
            shots(&["11", "11"]),
        ];
        let matrix = extract_assignment_matrix(&calibration, &[0, 1]).unwrap();
        assert_eq!(matrix, AssignmentMatrix::identity(2));
        assert_eq!(matrix.mean_fidelity(), 1.0);
    }

    #[test]
    fn test_rows_are_frequencies() {
        let calibration = vec![shots(&["0", "0", "0", "1"]), shots(&["1", "0"])];
        let matrix = extract_assignment_matrix(&calibration, &[0]).unwrap();
        assert_eq!(matrix.to_rows(), vec![vec![0.75, 0.25], vec![0.5, 0.5]]);
        for row in matrix.as_array().rows() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_qubit_positions_select_clbits() {
        // Qubit 0 is read from clbit 2, qubit 1 from clbit 0.
        let calibration = vec![
            shots(&["000"]),
            shots(&["100"]),
            shots(&["001"]),
            shots(&["101"]),
        ];
        let matrix = extract_assignment_matrix(&calibration, &[2, 0]).unwrap();
        assert_eq!(matrix, AssignmentMatrix::identity(2));
    }

    #[test]
    fn test_errors() {
        let err = extract_assignment_matrix(&[shots(&["0"])], &[0]).unwrap_err();
        assert!(matches!(
            err,
            MitigationError::PreparationCount {
                expected: 2,
                got: 1
            }
        ));

        let err = extract_assignment_matrix(&[shots(&["0"]), vec![]], &[0]).unwrap_err();
        assert!(matches!(
            err,
            MitigationError::EmptyPreparation { preparation: 1 }
        ));

        let err = extract_assignment_matrix(&[shots(&["0"]), shots(&["2"])], &[0]).unwrap_err();
        assert!(matches!(err, MitigationError::MalformedBitstring { .. }));

        let err = extract_assignment_matrix(&[shots(&["0"]), shots(&["1"])], &[3]).unwrap_err();
        assert!(matches!(
            err,
            MitigationError::BitOutOfRange { bit: 3, width: 1 }
        ));
    }

    #[test]
    fn test_matrix_validation() {
        assert!(AssignmentMatrix::from_rows(vec![vec![0.9, 0.1], vec![0.2, 0.8]]).is_ok());
        assert!(AssignmentMatrix::from_rows(vec![vec![0.9, 0.2], vec![0.2, 0.8]]).is_err());
        assert!(AssignmentMatrix::from_rows(vec![vec![1.0, 0.0, 0.0]; 3]).is_err());
        assert!(AssignmentMatrix::from_rows(vec![vec![1.1, -0.1], vec![0.0, 1.0]]).is_err());
    }

    #[test]
    fn test_serde_as_rows() {
        let matrix = AssignmentMatrix::from_rows(vec![vec![0.9, 0.1], vec![0.2, 0.8]]).unwrap();
        let json = serde_json::to_string(&matrix).unwrap();
        assert_eq!(json, "[[0.9,0.1],[0.2,0.8]]");
        let back: AssignmentMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back, matrix);

        assert!(serde_json::from_str::<AssignmentMatrix>("[[0.5,0.6],[0,1]]").is_err());
    }
}
