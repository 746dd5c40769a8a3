//! Readout calibration circuits.
//!
//! Each computational basis state is prepared and measured once per shot.
//! Preparation `i` sets qubit `k` to bit `k` of `i`, so the circuit order
//! matches the row order of [`AssignmentMatrix`](crate::AssignmentMatrix).
//!
//! The combined layouts place every preparation into one circuit, using
//! mid-circuit measurements into disjoint classical blocks of `n` bits.
//! [`combined_readout_calibration_circuit`] runs the calibration first and
//! puts block 0 at classical bit 0, with experiment bits added after it:
//!
//! ```text
//!   clbits:  [ experiment ... | block 2^n−1 | ... | block 1 | block 0 ]
//!                                                    b·n .. (b+1)·n
//! ```
//!
//! [`append_readout_calibration`] keeps an existing experiment in front and
//! measures the calibration blocks into new bits past the experiment's `m`:
//!
//! ```text
//!   clbits:  [ block 2^n−1 | ... | block 0 | experiment ... ]
//!                                 m+b·n .. m+(b+1)·n
//! ```

use serde::{Deserialize, Serialize};

use qisim_hal::MAX_CLASSICAL_BITS;
use qisim_ir::{Circuit, ClbitId, QubitId};

use crate::assignment::basis_size;
use crate::error::{MitigationError, MitigationResult};

fn prepare_and_measure(
    circuit: &mut Circuit,
    num_qubits: u32,
    preparation: usize,
    clbit_offset: u32,
) -> MitigationResult<()> {
    for q in 0..num_qubits {
        circuit.reset(QubitId(q))?;
    }
    for q in 0..num_qubits {
        if (preparation >> q) & 1 == 1 {
            circuit.x(QubitId(q))?;
        }
    }
    circuit.barrier((0..num_qubits).map(QubitId))?;
    for q in 0..num_qubits {
        circuit.measure(QubitId(q), ClbitId(clbit_offset + q))?;
    }
    Ok(())
}

/// One calibration circuit per basis state of `num_qubits` qubits.
pub fn readout_calibration_circuits(num_qubits: u32) -> MitigationResult<Vec<Circuit>> {
    (0..basis_size(num_qubits as usize)?)
        .map(|preparation| {
            let mut circuit = Circuit::with_size(
                format!("readout_calibration_{preparation}"),
                num_qubits,
                num_qubits,
            );
            prepare_and_measure(&mut circuit, num_qubits, preparation, 0)?;
            Ok(circuit)
        })
        .collect()
}

/// All preparations in one circuit, block `b` measured into clbits
/// `b·n .. (b+1)·n`.
///
/// Experiment instructions can be appended afterwards; they should measure
/// into clbits added past the calibration blocks.
pub fn combined_readout_calibration_circuit(num_qubits: u32) -> MitigationResult<Circuit> {
    let blocks = basis_size(num_qubits as usize)?;
    let width = blocks * num_qubits as usize;
    if width > MAX_CLASSICAL_BITS {
        return Err(MitigationError::RegisterTooWide {
            bits: width,
            max: MAX_CLASSICAL_BITS,
        });
    }
    let width = width as u32;
    let mut circuit = Circuit::with_size("readout_calibration", num_qubits, width);
    for preparation in 0..blocks {
        prepare_and_measure(
            &mut circuit,
            num_qubits,
            preparation,
            preparation as u32 * num_qubits,
        )?;
    }
    Ok(circuit)
}

/// Run `experiment` first, then every calibration preparation.
///
/// Block `b` is measured into clbits `m + b·n .. m + (b+1)·n`, where `m` is
/// the experiment's classical width. The experiment must span at least
/// `num_qubits` qubits.
pub fn append_readout_calibration(
    experiment: &Circuit,
    num_qubits: u32,
) -> MitigationResult<Circuit> {
    let blocks = basis_size(num_qubits as usize)?;
    let offset = experiment.num_clbits();
    let width = offset + blocks * num_qubits as usize;
    if width > MAX_CLASSICAL_BITS {
        return Err(MitigationError::RegisterTooWide {
            bits: width,
            max: MAX_CLASSICAL_BITS,
        });
    }

    let mut circuit = experiment.clone();
    while circuit.num_clbits() < width {
        circuit.add_clbit();
    }
    circuit.barrier_all()?;
    for preparation in 0..blocks {
        prepare_and_measure(
            &mut circuit,
            num_qubits,
            preparation,
            (offset + preparation * num_qubits as usize) as u32,
        )?;
    }
    Ok(circuit)
}

/// Memory from a combined calibration circuit, split by role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationSplit {
    /// Declared bitstrings per preparation, one entry per shot.
    pub calibration: Vec<Vec<String>>,
    /// Remaining classical bits per shot.
    pub experiment: Vec<String>,
}

/// Split per-shot memory of a [`combined_readout_calibration_circuit`] run.
///
/// Every bitstring must be at least `2^n · n` characters wide; characters left
/// of the calibration blocks are returned as experiment bits.
pub fn split_calibration_blocks(
    memory: &[String],
    num_qubits: usize,
) -> MitigationResult<CalibrationSplit> {
    split_calibration_blocks_at(memory, num_qubits, 0)
}

/// Split per-shot memory of an [`append_readout_calibration`] run whose
/// experiment wrote `experiment_bits` classical bits.
pub fn split_appended_calibration_blocks(
    memory: &[String],
    num_qubits: usize,
    experiment_bits: usize,
) -> MitigationResult<CalibrationSplit> {
    split_calibration_blocks_at(memory, num_qubits, experiment_bits)
}

/// Block 0 starts at classical bit `offset`; every bit outside the blocks
/// belongs to the experiment and keeps its relative order.
fn split_calibration_blocks_at(
    memory: &[String],
    num_qubits: usize,
    offset: usize,
) -> MitigationResult<CalibrationSplit> {
    let blocks = basis_size(num_qubits)?;
    let reserved = blocks * num_qubits + offset;
    let mut split = CalibrationSplit {
        calibration: vec![Vec::with_capacity(memory.len()); blocks],
        experiment: Vec::with_capacity(memory.len()),
    };

    for shot in memory {
        if !shot.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(MitigationError::MalformedBitstring {
                bitstring: shot.clone(),
            });
        }
        let width = shot.len();
        if width < reserved {
            return Err(MitigationError::BitOutOfRange {
                bit: reserved.saturating_sub(1),
                width,
            });
        }
        // Character `width - 1 - k` holds clbit `k`.
        let (high, rest) = shot.split_at(width - reserved);
        let (calibration, low) = rest.split_at(reserved - offset);
        for (block, declared) in split.calibration.iter_mut().enumerate() {
            let end = calibration.len() - block * num_qubits;
            declared.push(calibration[end - num_qubits..end].to_string());
        }
        split.experiment.push(format!("{high}{low}"));
    }
    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibration_circuits() {
        let circuits = readout_calibration_circuits(2).unwrap();
        assert_eq!(circuits.len(), 4);
        assert_eq!(
            circuits[0].operation_names(),
            vec!["reset", "reset", "barrier", "measure", "measure"]
        );
        // Preparation 1 flips qubit 0 only.
        let x_targets: Vec<_> = circuits[1]
            .instructions()
            .iter()
            .filter(|inst| inst.name() == "x")
            .map(|inst| inst.qubits[0])
            .collect();
        assert_eq!(x_targets, vec![QubitId(0)]);
        assert_eq!(circuits[3].operation_names().iter().filter(|n| **n == "x").count(), 2);
    }

    #[test]
    fn test_combined_circuit_blocks() {
        let circuit = combined_readout_calibration_circuit(2).unwrap();
        assert_eq!(circuit.num_clbits(), 8);
        let last = circuit.instructions().last().unwrap();
        assert!(last.is_measure());
        assert_eq!(last.clbits, vec![ClbitId(7)]);
    }

    #[test]
    fn test_split() {
        // One qubit: block 0 is the rightmost bit, block 1 the next, then
        // a single experiment bit.
        let memory = vec!["110".to_string(), "010".to_string()];
        let split = split_calibration_blocks(&memory, 1).unwrap();
        assert_eq!(split.calibration[0], vec!["0", "0"]);
        assert_eq!(split.calibration[1], vec!["1", "1"]);
        assert_eq!(split.experiment, vec!["1", "0"]);
    }

    #[test]
    fn test_appended_calibration_follows_experiment() {
        let mut experiment = Circuit::with_size("flip", 1, 1);
        experiment.x(QubitId(0)).unwrap();
        experiment.measure(QubitId(0), ClbitId(0)).unwrap();

        let circuit = append_readout_calibration(&experiment, 1).unwrap();
        assert_eq!(circuit.num_clbits(), 3);
        assert_eq!(&circuit.operation_names()[..2], &["x", "measure"]);
        let targets: Vec<_> = circuit
            .instructions()
            .iter()
            .filter(|inst| inst.is_measure())
            .map(|inst| inst.clbits[0])
            .collect();
        assert_eq!(targets, vec![ClbitId(0), ClbitId(1), ClbitId(2)]);
    }

    #[test]
    fn test_split_appended() {
        // Experiment bit 0 is rightmost, block 0 at clbit 1, block 1 at clbit 2.
        let memory = vec!["101".to_string(), "100".to_string()];
        let split = split_appended_calibration_blocks(&memory, 1, 1).unwrap();
        assert_eq!(split.calibration[0], vec!["0", "0"]);
        assert_eq!(split.calibration[1], vec!["1", "1"]);
        assert_eq!(split.experiment, vec!["1", "0"]);
    }

    #[test]
    fn test_wide_calibration_rejected() {
        // 2^3 blocks of 3 bits.
        assert!(matches!(
            combined_readout_calibration_circuit(3),
            Err(MitigationError::RegisterTooWide { bits: 24, .. })
        ));
        assert!(matches!(
            readout_calibration_circuits(64),
            Err(MitigationError::RegisterTooWide { bits: 64, .. })
        ));
        assert!(matches!(
            split_calibration_blocks(&["0".to_string()], 64),
            Err(MitigationError::RegisterTooWide { .. })
        ));
    }

    #[test]
    fn test_split_rejects_short_or_malformed() {
        assert!(matches!(
            split_calibration_blocks(&["0".to_string()], 1),
            Err(MitigationError::BitOutOfRange { width: 1, .. })
        ));
        assert!(matches!(
            split_calibration_blocks(&["0a".to_string()], 1),
            Err(MitigationError::MalformedBitstring { .. })
        ));
    }
}
