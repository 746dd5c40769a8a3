//! Noise model assembly.
//!
//! [`NoiseModelAssembler`] turns a [`CalibrationProfile`] into an immutable
//! [`AssembledNoiseModel`]: a lookup from `(operation, physical qubits)` to the
//! channel applied with that operation, plus per-qubit readout confusion.
//!
//! Which operations carry which channel is fixed:
//!
//! | Operation | Channel |
//! |-----------|---------|
//! | `delay` | relaxation + dephasing for one delay unit |
//! | `measure` | relaxation + dephasing for the measurement duration |
//! | `id`, `x`, `y`, `z`, `s`, `sdg`, `t`, `tdg`, `rx`, `ry` | 1-qubit depolarizing |
//! | `cz` | 2-qubit depolarizing, once per gate in either operand order |

use std::sync::Arc;

use ndarray::Array2;
use rustc_hash::FxHashMap;
use tracing::{debug, info, instrument};

use crate::calibration::{CalibrationProfile, QubitLayout};
use crate::channels::{NoiseChannel, ReadoutConfusion, gate_error_from_rb, readout_confusion};
use crate::error::{NoiseError, NoiseResult};

/// Idle operation name.
pub const DELAY: &str = "delay";
/// Measurement operation name.
pub const MEASURE: &str = "measure";
/// Single-qubit gates that receive the depolarizing channel.
pub const SINGLE_QUBIT_NOISY_GATES: &[&str] =
    &["id", "x", "y", "z", "s", "sdg", "t", "tdg", "rx", "ry"];
/// Two-qubit gates that receive the two-qubit depolarizing channel.
///
/// These are symmetric, so their channels are keyed by the ascending pair.
pub const TWO_QUBIT_NOISY_GATES: &[&str] = &["cz"];

/// Knobs of the device model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssemblyOptions {
    /// Factor applied to T1 before building relaxation channels.
    pub t1_scale: f64,
    /// Average physical single-qubit gates per Clifford.
    pub single_qubit_gates_per_clifford: f64,
    /// Average CZ gates per two-qubit Clifford as seen by interleaved RB.
    pub two_qubit_gates_per_clifford: f64,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            t1_scale: 1.3,
            single_qubit_gates_per_clifford: 1.875,
            two_qubit_gates_per_clifford: 1.5,
        }
    }
}

impl AssemblyOptions {
    /// Use calibration numbers as given: no T1 scaling, one gate per Clifford.
    pub fn exact() -> Self {
        Self {
            t1_scale: 1.0,
            single_qubit_gates_per_clifford: 1.0,
            two_qubit_gates_per_clifford: 1.0,
        }
    }

    /// Set the T1 scale factor.
    pub fn with_t1_scale(mut self, scale: f64) -> Self {
        self.t1_scale = scale;
        self
    }

    /// Set the single-qubit gates per Clifford.
    pub fn with_single_qubit_gates_per_clifford(mut self, n: f64) -> Self {
        self.single_qubit_gates_per_clifford = n;
        self
    }

    /// Set the two-qubit gates per Clifford.
    pub fn with_two_qubit_gates_per_clifford(mut self, n: f64) -> Self {
        self.two_qubit_gates_per_clifford = n;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct NoiseKey {
    operation: String,
    qubits: Vec<u32>,
}

impl NoiseKey {
    fn new(operation: &str, qubits: &[u32]) -> Self {
        let mut qubits = qubits.to_vec();
        if TWO_QUBIT_NOISY_GATES.contains(&operation) {
            qubits.sort_unstable();
        }
        Self {
            operation: operation.to_string(),
            qubits,
        }
    }
}

/// Immutable noise model of one processor.
///
/// Cheap to share: channels are reference counted and the model is never
/// mutated after assembly.
#[derive(Debug, Clone)]
pub struct AssembledNoiseModel {
    profile_name: String,
    layout: QubitLayout,
    channels: FxHashMap<NoiseKey, Arc<NoiseChannel>>,
    readout: FxHashMap<u32, ReadoutConfusion>,
    options: AssemblyOptions,
}

impl AssembledNoiseModel {
    /// Channel applied with `operation` on `qubits`, if any.
    ///
    /// Operand order does not matter for symmetric two-qubit gates.
    pub fn channel(&self, operation: &str, qubits: &[u32]) -> Option<&NoiseChannel> {
        self.channels
            .get(&NoiseKey::new(operation, qubits))
            .map(Arc::as_ref)
    }

    /// Readout confusion of a physical qubit.
    pub fn readout(&self, qubit: u32) -> Option<&ReadoutConfusion> {
        self.readout.get(&qubit)
    }

    /// Joint confusion matrix over `qubits`; position `k` maps to bit `k`.
    pub fn joint_readout(&self, qubits: &[u32]) -> NoiseResult<Array2<f64>> {
        let confusions = qubits
            .iter()
            .map(|&q| {
                self.readout.get(&q).copied().ok_or_else(|| {
                    NoiseError::construction(
                        "joint_readout",
                        format!("no readout calibration for physical qubit {q}"),
                    )
                })
            })
            .collect::<NoiseResult<Vec<_>>>()?;
        Ok(ReadoutConfusion::tensor(&confusions))
    }

    /// Layout the model was built against.
    pub fn layout(&self) -> &QubitLayout {
        &self.layout
    }

    /// Name of the source calibration profile.
    pub fn profile_name(&self) -> &str {
        &self.profile_name
    }

    /// Options used during assembly.
    pub fn options(&self) -> &AssemblyOptions {
        &self.options
    }

    /// Number of `(operation, qubits)` entries.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether the model carries no channels.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// All entries sorted by operation name, then qubits.
    pub fn entries(&self) -> Vec<(&str, &[u32], &NoiseChannel)> {
        let mut entries: Vec<_> = self
            .channels
            .iter()
            .map(|(k, c)| (k.operation.as_str(), k.qubits.as_slice(), c.as_ref()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0).then_with(|| a.1.cmp(b.1)));
        entries
    }

    /// Readout confusion entries in physical order.
    pub fn readout_entries(&self) -> Vec<(u32, &ReadoutConfusion)> {
        let mut entries: Vec<_> = self.readout.iter().map(|(&q, c)| (q, c)).collect();
        entries.sort_by_key(|(q, _)| *q);
        entries
    }

    /// Operations that carry noise on some qubit.
    pub fn noisy_operations(&self) -> Vec<&str> {
        let mut ops: Vec<&str> = self.channels.keys().map(|k| k.operation.as_str()).collect();
        ops.sort_unstable();
        ops.dedup();
        ops
    }
}

/// Builds [`AssembledNoiseModel`]s from calibration profiles.
#[derive(Debug, Clone, Default)]
pub struct NoiseModelAssembler {
    options: AssemblyOptions,
}

impl NoiseModelAssembler {
    /// Create an assembler with the given options.
    pub fn new(options: AssemblyOptions) -> Self {
        Self { options }
    }

    /// Assemble the noise model of a profile.
    ///
    /// Pure: the same profile and options always give the same model.
    #[instrument(skip_all, fields(profile = profile.name()))]
    pub fn assemble(&self, profile: &CalibrationProfile) -> NoiseResult<AssembledNoiseModel> {
        let mut channels = FxHashMap::default();
        let mut readout = FxHashMap::default();
        let temperature = profile.base_temperature_k();

        for (index, label, qubit) in profile.qubits() {
            let t1 = self.options.t1_scale * qubit.t1_s;
            let idle = NoiseChannel::thermal_relaxation(
                temperature,
                qubit.frequency_hz,
                t1,
                qubit.t2_s,
                profile.delay_unit_duration_s(),
            )?;
            let measure = NoiseChannel::thermal_relaxation(
                temperature,
                qubit.frequency_hz,
                t1,
                qubit.t2_s,
                profile.measurement_duration_s(),
            )?;
            let epsilon =
                gate_error_from_rb(qubit.rb_error, self.options.single_qubit_gates_per_clifford);
            let gate = Arc::new(NoiseChannel::depolarizing(1, epsilon)?);

            debug!(qubit = label, index, epsilon, "Attaching single-qubit channels");
            channels.insert(NoiseKey::new(DELAY, &[index]), Arc::new(idle));
            channels.insert(NoiseKey::new(MEASURE, &[index]), Arc::new(measure));
            for name in SINGLE_QUBIT_NOISY_GATES {
                channels.insert(NoiseKey::new(name, &[index]), Arc::clone(&gate));
            }
            readout.insert(
                index,
                readout_confusion(qubit.readout.p1_given_0, qubit.readout.p0_given_1)?,
            );
        }

        for (pair, error) in profile.pair_errors() {
            let epsilon = gate_error_from_rb(error, self.options.two_qubit_gates_per_clifford);
            let channel = Arc::new(NoiseChannel::depolarizing(2, epsilon)?);
            debug!(%pair, epsilon, "Attaching two-qubit channel");
            for name in TWO_QUBIT_NOISY_GATES {
                channels.insert(
                    NoiseKey::new(name, &[pair.low(), pair.high()]),
                    Arc::clone(&channel),
                );
            }
        }

        info!(
            channels = channels.len(),
            qubits = readout.len(),
            "Assembled noise model"
        );
        Ok(AssembledNoiseModel {
            profile_name: profile.name().to_string(),
            layout: profile.layout().clone(),
            channels,
            readout,
            options: self.options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{QubitCalibration, ReadoutFidelity};
    use crate::kraus::COMPLETENESS_TOLERANCE;

    fn qubit(p1: f64, p0: f64) -> QubitCalibration {
        QubitCalibration {
            frequency_hz: 5.0e9,
            t1_s: 20e-6,
            t2_s: 15e-6,
            rb_error: 0.002,
            readout: ReadoutFidelity {
                p1_given_0: p1,
                p0_given_1: p0,
            },
        }
    }

    fn profile() -> CalibrationProfile {
        CalibrationProfile::builder("test")
            .base_temperature(0.02)
            .delay_unit_duration(1e-6)
            .measurement_duration(2e-6)
            .qubit("Q0", qubit(0.01, 0.03))
            .qubit("Q1", qubit(0.02, 0.04))
            .qubit("Q2", qubit(0.0, 0.0))
            .pair_error(1, 0, 0.02)
            .build()
            .unwrap()
    }

    #[test]
    fn test_static_gate_table() {
        let model = NoiseModelAssembler::default().assemble(&profile()).unwrap();
        for q in 0..3 {
            assert!(matches!(
                model.channel(DELAY, &[q]),
                Some(NoiseChannel::ThermalRelaxation { .. })
            ));
            assert!(model.channel(MEASURE, &[q]).is_some());
            for gate in SINGLE_QUBIT_NOISY_GATES {
                assert!(matches!(
                    model.channel(gate, &[q]),
                    Some(NoiseChannel::Depolarizing { .. })
                ));
            }
            assert!(model.channel("h", &[q]).is_none());
            assert!(model.channel("rz", &[q]).is_none());
        }
        // 3 qubits × (delay + measure + 10 gates) + 1 pair.
        assert_eq!(model.len(), 3 * 12 + 1);
        assert_eq!(model.noisy_operations().len(), 13);
    }

    #[test]
    fn test_cz_keyed_once_for_either_order() {
        let model = NoiseModelAssembler::default().assemble(&profile()).unwrap();
        let forward = model.channel("cz", &[0, 1]).unwrap();
        let backward = model.channel("cz", &[1, 0]).unwrap();
        assert!(std::ptr::eq(forward, backward));
        let cz_entries = model.entries().into_iter().filter(|(op, _, _)| *op == "cz").count();
        assert_eq!(cz_entries, 1);
        assert!(model.channel("cz", &[1, 2]).is_none());
    }

    #[test]
    fn test_all_channels_complete() {
        let model = NoiseModelAssembler::default().assemble(&profile()).unwrap();
        for (_, _, channel) in model.entries() {
            assert!(channel.kraus().completeness_deviation() <= COMPLETENESS_TOLERANCE);
        }
    }

    #[test]
    fn test_readout_rows_sum_to_one() {
        let model = NoiseModelAssembler::default().assemble(&profile()).unwrap();
        for (_, confusion) in model.readout_entries() {
            for row in confusion.rows() {
                assert!((row[0] + row[1] - 1.0).abs() < 1e-12);
            }
        }
        assert!(model.readout(2).unwrap().is_ideal());
        let joint = model.joint_readout(&[0, 1]).unwrap();
        assert_eq!(joint.dim(), (4, 4));
        assert!(model.joint_readout(&[5]).is_err());
    }

    #[test]
    fn test_t1_scale_applied() {
        let exact = NoiseModelAssembler::new(AssemblyOptions::exact())
            .assemble(&profile())
            .unwrap();
        let scaled = NoiseModelAssembler::default().assemble(&profile()).unwrap();
        let gamma = |m: &AssembledNoiseModel| match m.channel(DELAY, &[0]) {
            Some(NoiseChannel::ThermalRelaxation { parameters, .. }) => parameters.relaxation_gamma,
            _ => panic!("missing idle channel"),
        };
        let expected_exact = 1.0 - (-1e-6f64 / 20e-6).exp();
        let expected_scaled = 1.0 - (-1e-6f64 / (1.3 * 20e-6)).exp();
        assert!((gamma(&exact) - expected_exact).abs() < 1e-15);
        assert!((gamma(&scaled) - expected_scaled).abs() < 1e-15);
    }

    #[test]
    fn test_gate_error_exponent() {
        let model = NoiseModelAssembler::default().assemble(&profile()).unwrap();
        match model.channel("x", &[0]) {
            Some(NoiseChannel::Depolarizing { epsilon, .. }) => {
                assert!((epsilon - (1.0 - 0.998f64.powf(1.875))).abs() < 1e-15);
            }
            other => panic!("unexpected channel {other:?}"),
        }
    }

    #[test]
    fn test_model_records_layout() {
        let p = profile();
        let model = NoiseModelAssembler::default().assemble(&p).unwrap();
        assert_eq!(model.layout(), p.layout());
        assert_eq!(model.profile_name(), "test");
    }
}
