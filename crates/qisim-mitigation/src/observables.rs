//! Probability vectors from sampled outcomes, and diagonal expectation values.
//!
//! Circuits with repeated mid-circuit measurements write one block of `n`
//! classical bits per measurement round. Block 0 is the rightmost `n`
//! characters of each shot, block 1 the next `n`, and so on.

use qisim_hal::Counts;

use crate::assignment::{basis_size, parse_bits};
use crate::error::{MitigationError, MitigationResult};

fn basis_index(bitstring: &str, num_bits: usize) -> MitigationResult<usize> {
    let bits = parse_bits(bitstring)?;
    if bits.len() != num_bits {
        return Err(MitigationError::BitOutOfRange {
            bit: num_bits.saturating_sub(1),
            width: bits.len(),
        });
    }
    Ok(bits
        .iter()
        .enumerate()
        .fold(0, |index, (k, &bit)| index | (usize::from(bit) << k)))
}

/// Relative frequencies over `num_bits` bits, indexed by basis state.
///
/// Unlike [`Counts::probabilities`], bitstrings of the wrong width or with
/// characters other than `0`/`1` are rejected.
pub fn probabilities_from_counts(counts: &Counts, num_bits: usize) -> MitigationResult<Vec<f64>> {
    let mut probabilities = vec![0.0; basis_size(num_bits)?];
    let total = counts.total_shots();
    if total == 0 {
        return Err(MitigationError::InvalidProbabilities(
            "counts contain no shots".into(),
        ));
    }
    for (bitstring, &count) in counts.iter() {
        probabilities[basis_index(bitstring, num_bits)?] += count as f64 / total as f64;
    }
    Ok(probabilities)
}

/// Relative frequencies of per-shot bitstrings.
pub fn probabilities_from_memory(memory: &[String], num_bits: usize) -> MitigationResult<Vec<f64>> {
    if memory.is_empty() {
        return Err(MitigationError::InvalidProbabilities(
            "memory contains no shots".into(),
        ));
    }
    let mut probabilities = vec![0.0; basis_size(num_bits)?];
    let weight = 1.0 / memory.len() as f64;
    for shot in memory {
        probabilities[basis_index(shot, num_bits)?] += weight;
    }
    Ok(probabilities)
}

/// Per-block counts of per-shot bitstrings made of `n`-bit measurement blocks.
///
/// Every shot must have the same width, a positive multiple of `num_qubits`.
/// Each block's counts are zero-filled over all `2^n` outcomes.
pub fn block_counts(memory: &[String], num_qubits: usize) -> MitigationResult<Vec<Counts>> {
    let Some(first) = memory.first() else {
        return Err(MitigationError::InvalidProbabilities(
            "memory contains no shots".into(),
        ));
    };
    basis_size(num_qubits)?;
    let width = first.len();
    if num_qubits == 0 || width == 0 || width % num_qubits != 0 {
        return Err(MitigationError::MisalignedBlocks {
            width,
            block: num_qubits,
        });
    }

    let mut counts = vec![Counts::zero_filled(num_qubits); width / num_qubits];
    for shot in memory {
        if !shot.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(MitigationError::MalformedBitstring {
                bitstring: shot.clone(),
            });
        }
        if shot.len() != width {
            return Err(MitigationError::MisalignedBlocks {
                width: shot.len(),
                block: num_qubits,
            });
        }
        for (block, tally) in counts.iter_mut().enumerate() {
            let end = width - block * num_qubits;
            tally.insert(&shot[end - num_qubits..end], 1);
        }
    }
    Ok(counts)
}

/// Per-block relative frequencies, see [`block_counts`].
pub fn block_probabilities(
    memory: &[String],
    num_qubits: usize,
) -> MitigationResult<Vec<Vec<f64>>> {
    block_counts(memory, num_qubits)?
        .iter()
        .map(|counts| probabilities_from_counts(counts, num_qubits))
        .collect()
}

/// Expectation value of a Z-type Pauli string.
///
/// The observable is written like a bitstring: its rightmost character acts
/// on qubit 0. Only `I` and `Z` are diagonal in the measured basis.
pub fn expectation_z(probabilities: &[f64], observable: &str) -> MitigationResult<f64> {
    let expected = basis_size(observable.chars().count())?;
    if probabilities.len() != expected {
        return Err(MitigationError::DimensionMismatch {
            expected,
            got: probabilities.len(),
        });
    }

    let mut mask = 0usize;
    for (k, c) in observable.chars().rev().enumerate() {
        match c.to_ascii_uppercase() {
            'I' => {}
            'Z' => mask |= 1 << k,
            'X' | 'Y' => {
                return Err(MitigationError::UnsupportedObservable {
                    observable: observable.to_string(),
                    reason: format!("'{c}' is not diagonal in the computational basis"),
                });
            }
            _ => {
                return Err(MitigationError::UnsupportedObservable {
                    observable: observable.to_string(),
                    reason: format!("'{c}' is not a Pauli operator"),
                });
            }
        }
    }

    Ok(probabilities
        .iter()
        .enumerate()
        .map(|(index, p)| {
            if (index & mask).count_ones() % 2 == 0 {
                *p
            } else {
                -p
            }
        })
        .sum())
}
