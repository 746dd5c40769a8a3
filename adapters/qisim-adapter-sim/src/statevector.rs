//! Statevector simulation engine.
//!
//! Basis index bit `q` is the state of qubit `q`. Noise is unravelled into
//! trajectories: each Kraus channel application samples one operator with
//! its Born probability and renormalizes, so averaging over shots reproduces
//! the density-matrix evolution.

use std::f64::consts::PI;

use ndarray::Array2;
use num_complex::Complex64;
use rand::Rng;

use qisim_ir::StandardGate;
use qisim_noise::KrausChannel;

/// Norms below this are treated as an impossible Kraus branch.
const BRANCH_EPSILON: f64 = 1e-15;

/// A statevector representing a quantum state.
#[derive(Debug, Clone)]
pub struct Statevector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The amplitudes in basis-index order.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Probability of finding `qubit` in |1⟩.
    pub fn probability_one(&self, qubit: usize) -> f64 {
        let mask = 1 << qubit;
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum()
    }

    /// Apply a standard gate.
    pub fn apply_gate(&mut self, gate: &StandardGate, qubits: &[usize]) {
        match *gate {
            StandardGate::I => {}
            StandardGate::X => self.apply_x(qubits[0]),
            StandardGate::Y => self.apply_y(qubits[0]),
            StandardGate::Z => self.apply_phase(qubits[0], PI),
            StandardGate::H => self.apply_h(qubits[0]),
            StandardGate::S => self.apply_phase(qubits[0], PI / 2.0),
            StandardGate::Sdg => self.apply_phase(qubits[0], -PI / 2.0),
            StandardGate::T => self.apply_phase(qubits[0], PI / 4.0),
            StandardGate::Tdg => self.apply_phase(qubits[0], -PI / 4.0),
            StandardGate::SX => self.apply_rx(qubits[0], PI / 2.0),
            StandardGate::Rx(theta) => self.apply_rx(qubits[0], theta),
            StandardGate::Ry(theta) => self.apply_ry(qubits[0], theta),
            StandardGate::Rz(theta) => self.apply_rz(qubits[0], theta),
            StandardGate::CX => self.apply_cx(qubits[0], qubits[1]),
            StandardGate::CZ => self.apply_cz(qubits[0], qubits[1]),
            StandardGate::Swap => self.apply_swap(qubits[0], qubits[1]),
        }
    }

    // =========================================================================
    // Single-qubit gate implementations
    // =========================================================================

    fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                self.amplitudes.swap(i, i | mask);
            }
        }
    }

    fn apply_y(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let i_val = Complex64::new(0.0, 1.0);
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let tmp = self.amplitudes[i];
                self.amplitudes[i] = -i_val * self.amplitudes[j];
                self.amplitudes[j] = i_val * tmp;
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[j] = sqrt2_inv * (a - b);
            }
        }
    }

    fn apply_phase(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase = Complex64::from_polar(1.0, theta);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask != 0 {
                *amp *= phase;
            }
        }
    }

    fn apply_rx(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let neg_i_s = Complex64::new(0.0, -(theta / 2.0).sin());
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a + neg_i_s * b;
                self.amplitudes[j] = neg_i_s * a + c * b;
            }
        }
    }

    fn apply_ry(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a - s * b;
                self.amplitudes[j] = s * a + c * b;
            }
        }
    }

    fn apply_rz(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
        let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            *amp *= if i & mask == 0 { phase_0 } else { phase_1 };
        }
    }

    // =========================================================================
    // Two-qubit gate implementations
    // =========================================================================

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }

    fn apply_cz(&mut self, control: usize, target: usize) {
        let mask = (1 << control) | (1 << target);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask == mask {
                *amp = -*amp;
            }
        }
    }

    fn apply_swap(&mut self, q1: usize, q2: usize) {
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;
        for i in 0..self.amplitudes.len() {
            if (i & mask1 != 0) && (i & mask2 == 0) {
                let j = (i & !mask1) | mask2;
                self.amplitudes.swap(i, j);
            }
        }
    }

    // =========================================================================
    // Noise and measurement
    // =========================================================================

    /// `matrix` applied to `qubits`, returned as a new (unnormalized) vector.
    ///
    /// Local bit `j` of the matrix index is `qubits[j]`.
    fn applied(&self, matrix: &Array2<Complex64>, qubits: &[usize]) -> Vec<Complex64> {
        let dim = 1usize << qubits.len();
        let offsets: Vec<usize> = (0..dim)
            .map(|local| {
                qubits
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| (local >> j) & 1 == 1)
                    .fold(0, |acc, (_, &q)| acc | (1 << q))
            })
            .collect();
        let support = offsets[dim - 1];

        let mut out = vec![Complex64::new(0.0, 0.0); self.amplitudes.len()];
        let mut local = vec![Complex64::new(0.0, 0.0); dim];
        for base in 0..self.amplitudes.len() {
            if base & support != 0 {
                continue;
            }
            for (slot, &offset) in local.iter_mut().zip(&offsets) {
                *slot = self.amplitudes[base | offset];
            }
            for (row, &offset) in offsets.iter().enumerate() {
                out[base | offset] = (0..dim).map(|col| matrix[[row, col]] * local[col]).sum();
            }
        }
        out
    }

    /// Apply one sampled Kraus operator of `channel` to `qubits`.
    ///
    /// Returns the index of the operator that was applied.
    pub fn apply_channel<R: Rng>(
        &mut self,
        channel: &KrausChannel,
        qubits: &[usize],
        rng: &mut R,
    ) -> usize {
        let operators = channel.operators();
        let r: f64 = rng.r#gen();
        let mut cumulative = 0.0;
        let mut fallback = None;

        for (index, operator) in operators.iter().enumerate() {
            let branch = self.applied(operator, qubits);
            let weight: f64 = branch.iter().map(Complex64::norm_sqr).sum();
            if weight <= BRANCH_EPSILON {
                continue;
            }
            cumulative += weight;
            if r < cumulative {
                self.set_normalized(branch, weight);
                return index;
            }
            fallback = Some((index, branch, weight));
        }

        // Rounding left r above the final cumulative weight.
        match fallback {
            Some((index, branch, weight)) => {
                self.set_normalized(branch, weight);
                index
            }
            None => 0,
        }
    }

    fn set_normalized(&mut self, amplitudes: Vec<Complex64>, weight: f64) {
        let norm = weight.sqrt();
        self.amplitudes = amplitudes.into_iter().map(|a| a / norm).collect();
    }

    /// Projectively measure `qubit`, collapsing the state.
    pub fn measure<R: Rng>(&mut self, qubit: usize, rng: &mut R) -> u8 {
        let p_one = self.probability_one(qubit);
        let outcome = u8::from(rng.r#gen::<f64>() < p_one);
        let mask = 1 << qubit;
        let keep = if outcome == 1 { mask } else { 0 };
        let norm = if outcome == 1 { p_one } else { 1.0 - p_one }.sqrt();

        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask == keep {
                *amp /= norm;
            } else {
                *amp = Complex64::new(0.0, 0.0);
            }
        }
        outcome
    }

    /// Reset `qubit` to |0⟩ by measuring and flipping on a 1.
    pub fn reset<R: Rng>(&mut self, qubit: usize, rng: &mut R) {
        if self.measure(qubit, rng) == 1 {
            self.apply_x(qubit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qisim_noise::{NoiseChannel, relaxation_channel};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2);
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(1.0, 0.0)));
        assert!(sv.amplitudes[1..].iter().all(|a| a.norm() < 1e-12));
    }

    #[test]
    fn test_bell_state() {
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::H, &[0]);
        sv.apply_gate(&StandardGate::CX, &[0, 1]);

        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(sqrt2_inv, 0.0)));
        assert!(approx_eq(sv.amplitudes[3], Complex64::new(sqrt2_inv, 0.0)));
    }

    #[test]
    fn test_ry_cz_bell() {
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::Ry(PI / 2.0), &[0]);
        sv.apply_gate(&StandardGate::Ry(PI / 2.0), &[1]);
        sv.apply_gate(&StandardGate::CZ, &[0, 1]);
        sv.apply_gate(&StandardGate::Ry(-PI / 2.0), &[1]);

        assert!((sv.amplitudes[0].norm_sqr() - 0.5).abs() < 1e-10);
        assert!((sv.amplitudes[3].norm_sqr() - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_applied_matches_kernel_bit_order() {
        // X on local bit 0 of a (q2, q0) pair must flip qubit 2.
        let x_on_first = ndarray::linalg::kron(&Array2::eye(2), &pauli_x());
        let mut sv = Statevector::new(3);
        sv.amplitudes = sv.applied(&x_on_first, &[2, 0]);
        assert!(approx_eq(sv.amplitudes[0b100], Complex64::new(1.0, 0.0)));
    }

    fn pauli_x() -> Array2<Complex64> {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        ndarray::arr2(&[[zero, one], [one, zero]])
    }

    #[test]
    fn test_measure_collapses() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::H, &[0]);
        sv.apply_gate(&StandardGate::CX, &[0, 1]);

        let first = sv.measure(0, &mut rng);
        let second = sv.measure(1, &mut rng);
        assert_eq!(first, second);
    }

    #[test]
    fn test_reset_returns_to_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let mut sv = Statevector::new(1);
            sv.apply_gate(&StandardGate::H, &[0]);
            sv.reset(0, &mut rng);
            assert!(sv.probability_one(0) < 1e-12);
        }
    }

    #[test]
    fn test_full_decay_channel_empties_excited_state() {
        let mut rng = StdRng::seed_from_u64(3);
        // Cold enough that thermal excitation vanishes, and far beyond T1.
        let channel = relaxation_channel(1e-3, 5e9, 1e-6, 1.0).unwrap();
        for _ in 0..20 {
            let mut sv = Statevector::new(1);
            sv.apply_gate(&StandardGate::X, &[0]);
            sv.apply_channel(&channel, &[0], &mut rng);
            assert!(sv.probability_one(0) < 1e-9);
        }
    }

    #[test]
    fn test_depolarizing_average() {
        let mut rng = StdRng::seed_from_u64(11);
        let channel = NoiseChannel::depolarizing(1, 0.3).unwrap();
        let shots = 4000;
        let mut ones = 0;
        for _ in 0..shots {
            let mut sv = Statevector::new(1);
            sv.apply_channel(channel.kraus(), &[0], &mut rng);
            ones += usize::from(sv.measure(0, &mut rng));
        }
        // Depolarizing with error ε leaves |0⟩ flipped with probability ε.
        let p = ones as f64 / shots as f64;
        assert!((p - 0.3).abs() < 0.04, "p = {p}");
    }
}
