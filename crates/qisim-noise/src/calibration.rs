//! Calibration profiles.
//!
//! A [`CalibrationProfile`] is the validated, immutable form of one backend's
//! calibration data. Qubits are keyed by stable labels and mapped to physical
//! indices through an explicit [`QubitLayout`]; nothing depends on the order in
//! which labels appear in the source document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{NoiseError, NoiseResult};
use crate::params::BackendParameters;

/// Readout error rates of one qubit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadoutFidelity {
    /// Probability of declaring 1 when 0 was prepared.
    pub p1_given_0: f64,
    /// Probability of declaring 0 when 1 was prepared.
    pub p0_given_1: f64,
}

/// Calibration data of one qubit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QubitCalibration {
    /// Transition frequency in Hz.
    pub frequency_hz: f64,
    /// Energy relaxation time in seconds.
    pub t1_s: f64,
    /// Coherence time in seconds.
    pub t2_s: f64,
    /// Average error per Clifford from randomized benchmarking.
    pub rb_error: f64,
    /// Readout error rates.
    pub readout: ReadoutFidelity,
}

impl QubitCalibration {
    /// Check the physical consistency of this record.
    pub fn validate(&self, label: &str) -> NoiseResult<()> {
        check_positive("Frequency [Hz]", label, self.frequency_hz)?;
        check_positive("T1 [s]", label, self.t1_s)?;
        check_positive("T2 [s]", label, self.t2_s)?;
        if self.t2_s > 2.0 * self.t1_s {
            return Err(NoiseError::validation(
                "T2 [s]",
                Some(label),
                format!(
                    "T2 = {:e} s exceeds 2*T1 = {:e} s",
                    self.t2_s,
                    2.0 * self.t1_s
                ),
            ));
        }
        check_probability("RB error", Some(label), self.rb_error)?;
        check_probability("SSRO.p1given0", Some(label), self.readout.p1_given_0)?;
        check_probability("SSRO.p0given1", Some(label), self.readout.p0_given_1)?;
        Ok(())
    }
}

fn check_positive(parameter: &str, label: &str, value: f64) -> NoiseResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(NoiseError::validation(
            parameter,
            Some(label),
            format!("must be positive and finite, got {value}"),
        ))
    }
}

fn check_global_positive(parameter: &str, value: f64) -> NoiseResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(NoiseError::validation(
            parameter,
            None,
            format!("must be positive and finite, got {value}"),
        ))
    }
}

pub(crate) fn check_probability(parameter: &str, qubit: Option<&str>, value: f64) -> NoiseResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(NoiseError::validation(
            parameter,
            qubit,
            format!("probability must lie in [0, 1], got {value}"),
        ))
    }
}

/// Unordered pair of physical qubits, stored in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitPair(u32, u32);

impl QubitPair {
    /// Create the canonical pair for `a` and `b`.
    pub fn new(a: u32, b: u32) -> Self {
        if a <= b { QubitPair(a, b) } else { QubitPair(b, a) }
    }

    /// Lower physical index.
    pub fn low(&self) -> u32 {
        self.0
    }

    /// Higher physical index.
    pub fn high(&self) -> u32 {
        self.1
    }

    /// Both indices, ascending.
    pub fn as_tuple(&self) -> (u32, u32) {
        (self.0, self.1)
    }
}

impl std::fmt::Display for QubitPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

/// Bijection between qubit labels and physical indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QubitLayout {
    to_physical: BTreeMap<String, u32>,
    to_label: BTreeMap<u32, String>,
}

impl QubitLayout {
    /// Build a layout from explicit assignments.
    ///
    /// Fails if two labels share a physical index.
    pub fn from_assignments(
        assignments: impl IntoIterator<Item = (String, u32)>,
    ) -> NoiseResult<Self> {
        let mut layout = QubitLayout::default();
        for (label, index) in assignments {
            if let Some(existing) = layout.to_label.get(&index) {
                return Err(NoiseError::validation(
                    "Layout",
                    Some(&label),
                    format!("physical index {index} already assigned to {existing}"),
                ));
            }
            if layout.to_physical.contains_key(&label) {
                return Err(NoiseError::validation(
                    "Layout",
                    Some(&label),
                    "label assigned twice",
                ));
            }
            layout.to_physical.insert(label.clone(), index);
            layout.to_label.insert(index, label);
        }
        Ok(layout)
    }

    /// Derive a layout from labels that encode their index (`"3"`, `"Q3"`, `"q3"`).
    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> NoiseResult<Self> {
        let assignments = labels
            .into_iter()
            .map(|label| {
                parse_label_index(label)
                    .map(|index| (label.to_string(), index))
                    .ok_or_else(|| {
                        NoiseError::validation(
                            "Qubits",
                            Some(label),
                            "label does not encode a physical index; provide an explicit \"Layout\"",
                        )
                    })
            })
            .collect::<NoiseResult<Vec<_>>>()?;
        Self::from_assignments(assignments)
    }

    /// The trivial layout `"0".."n-1"` → `0..n-1`.
    pub fn trivial(num_qubits: u32) -> Self {
        let mut layout = QubitLayout::default();
        for index in 0..num_qubits {
            layout.to_physical.insert(index.to_string(), index);
            layout.to_label.insert(index, index.to_string());
        }
        layout
    }

    /// Physical index of a label.
    pub fn physical(&self, label: &str) -> Option<u32> {
        self.to_physical.get(label).copied()
    }

    /// Label of a physical index.
    pub fn label(&self, index: u32) -> Option<&str> {
        self.to_label.get(&index).map(String::as_str)
    }

    /// Whether the physical index is mapped.
    pub fn contains_index(&self, index: u32) -> bool {
        self.to_label.contains_key(&index)
    }

    /// Number of mapped qubits.
    pub fn len(&self) -> usize {
        self.to_label.len()
    }

    /// Whether the layout is empty.
    pub fn is_empty(&self) -> bool {
        self.to_label.is_empty()
    }

    /// Entries in ascending physical index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.to_label.iter().map(|(&i, l)| (i, l.as_str()))
    }
}

fn parse_label_index(label: &str) -> Option<u32> {
    let digits = label
        .strip_prefix('Q')
        .or_else(|| label.strip_prefix('q'))
        .unwrap_or(label);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Validated calibration data of one processor.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationProfile {
    name: String,
    qubits: BTreeMap<String, QubitCalibration>,
    pair_errors: BTreeMap<QubitPair, f64>,
    base_temperature_k: f64,
    delay_unit_duration_s: f64,
    measurement_duration_s: f64,
    layout: QubitLayout,
}

impl CalibrationProfile {
    /// Start building a profile by hand.
    pub fn builder(name: impl Into<String>) -> CalibrationProfileBuilder {
        CalibrationProfileBuilder::new(name)
    }

    /// Build a profile from a parsed parameter file record.
    pub fn from_parameters(name: impl Into<String>, params: &BackendParameters) -> NoiseResult<Self> {
        let layout = match &params.layout {
            Some(explicit) => {
                QubitLayout::from_assignments(explicit.iter().map(|(l, &i)| (l.clone(), i)))?
            }
            None => QubitLayout::from_labels(params.qubits.keys().map(String::as_str))?,
        };

        let mut builder = CalibrationProfile::builder(name)
            .base_temperature(params.base_temperature_k)
            .delay_unit_duration(params.delay_duration_s)
            .measurement_duration(params.measurement_duration_s)
            .layout(layout);

        for (label, qubit) in &params.qubits {
            builder = builder.qubit(
                label.clone(),
                QubitCalibration {
                    frequency_hz: qubit.frequency_hz,
                    t1_s: qubit.t1_s,
                    t2_s: qubit.t2_s,
                    rb_error: qubit.rb_error,
                    readout: ReadoutFidelity {
                        p1_given_0: qubit.ssro.p1_given_0,
                        p0_given_1: qubit.ssro.p0_given_1,
                    },
                },
            );
        }
        for ((a, b), error) in params.cz_pairs()? {
            builder = builder.pair_error(a, b, error);
        }
        builder.build()
    }

    /// Profile name (usually the backend name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calibration of a qubit by label.
    pub fn qubit(&self, label: &str) -> Option<&QubitCalibration> {
        self.qubits.get(label)
    }

    /// Calibration of a qubit by physical index.
    pub fn qubit_at(&self, index: u32) -> Option<&QubitCalibration> {
        self.layout.label(index).and_then(|label| self.qubits.get(label))
    }

    /// Qubits as `(physical index, label, calibration)` in physical order.
    pub fn qubits(&self) -> impl Iterator<Item = (u32, &str, &QubitCalibration)> {
        self.layout
            .iter()
            .filter_map(|(index, label)| self.qubits.get(label).map(|q| (index, label, q)))
    }

    /// Two-qubit gate error of a coupled pair, in either operand order.
    pub fn pair_error(&self, a: u32, b: u32) -> Option<f64> {
        self.pair_errors.get(&QubitPair::new(a, b)).copied()
    }

    /// Calibrated pairs with their two-qubit gate error.
    pub fn pair_errors(&self) -> impl Iterator<Item = (QubitPair, f64)> + '_ {
        self.pair_errors.iter().map(|(&p, &e)| (p, e))
    }

    /// Cryostat base temperature in kelvin.
    pub fn base_temperature_k(&self) -> f64 {
        self.base_temperature_k
    }

    /// Duration of one delay unit in seconds.
    pub fn delay_unit_duration_s(&self) -> f64 {
        self.delay_unit_duration_s
    }

    /// Measurement duration in seconds.
    pub fn measurement_duration_s(&self) -> f64 {
        self.measurement_duration_s
    }

    /// Label to physical index layout.
    pub fn layout(&self) -> &QubitLayout {
        &self.layout
    }

    /// Number of calibrated qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }
}

/// Builder for [`CalibrationProfile`]. All checks run in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct CalibrationProfileBuilder {
    name: String,
    qubits: Vec<(String, QubitCalibration)>,
    pairs: Vec<(u32, u32, f64)>,
    base_temperature_k: f64,
    delay_unit_duration_s: f64,
    measurement_duration_s: f64,
    layout: Option<QubitLayout>,
}

impl CalibrationProfileBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            pairs: vec![],
            base_temperature_k: f64::NAN,
            delay_unit_duration_s: f64::NAN,
            measurement_duration_s: f64::NAN,
            layout: None,
        }
    }

    /// Add a qubit.
    pub fn qubit(mut self, label: impl Into<String>, calibration: QubitCalibration) -> Self {
        self.qubits.push((label.into(), calibration));
        self
    }

    /// Add a two-qubit gate error for a physical pair.
    pub fn pair_error(mut self, a: u32, b: u32, error: f64) -> Self {
        self.pairs.push((a, b, error));
        self
    }

    /// Set the base temperature.
    pub fn base_temperature(mut self, kelvin: f64) -> Self {
        self.base_temperature_k = kelvin;
        self
    }

    /// Set the delay unit duration.
    pub fn delay_unit_duration(mut self, seconds: f64) -> Self {
        self.delay_unit_duration_s = seconds;
        self
    }

    /// Set the measurement duration.
    pub fn measurement_duration(mut self, seconds: f64) -> Self {
        self.measurement_duration_s = seconds;
        self
    }

    /// Use an explicit layout instead of deriving it from labels.
    pub fn layout(mut self, layout: QubitLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Validate everything and produce the profile.
    pub fn build(self) -> NoiseResult<CalibrationProfile> {
        check_global_positive("Base temperature [K]", self.base_temperature_k)?;
        check_global_positive("Delay duration [s]", self.delay_unit_duration_s)?;
        check_global_positive("Measurement duration [s]", self.measurement_duration_s)?;

        let mut qubits = BTreeMap::new();
        for (label, calibration) in self.qubits {
            calibration.validate(&label)?;
            if qubits.insert(label.clone(), calibration).is_some() {
                return Err(NoiseError::validation("Qubits", Some(&label), "duplicate label"));
            }
        }

        let layout = match self.layout {
            Some(layout) => layout,
            None => QubitLayout::from_labels(qubits.keys().map(String::as_str))?,
        };
        for label in qubits.keys() {
            if layout.physical(label).is_none() {
                return Err(NoiseError::validation(
                    "Layout",
                    Some(label),
                    "qubit has no physical index",
                ));
            }
        }
        for (index, label) in layout.iter() {
            if !qubits.contains_key(label) {
                return Err(NoiseError::validation(
                    "Layout",
                    Some(label),
                    format!("physical index {index} maps to an uncalibrated qubit"),
                ));
            }
        }

        let mut pair_errors = BTreeMap::new();
        for (a, b, error) in self.pairs {
            let pair = QubitPair::new(a, b);
            let context = pair.to_string();
            if a == b {
                return Err(NoiseError::validation(
                    "CZ IRB errors",
                    Some(&context),
                    "pair endpoints must differ",
                ));
            }
            if !layout.contains_index(a) || !layout.contains_index(b) {
                return Err(NoiseError::validation(
                    "CZ IRB errors",
                    Some(&context),
                    "pair references a qubit missing from the layout",
                ));
            }
            check_probability("CZ IRB errors", Some(&context), error)?;
            if pair_errors.insert(pair, error).is_some() {
                return Err(NoiseError::validation(
                    "CZ IRB errors",
                    Some(&context),
                    "pair listed twice",
                ));
            }
        }

        Ok(CalibrationProfile {
            name: self.name,
            qubits,
            pair_errors,
            base_temperature_k: self.base_temperature_k,
            delay_unit_duration_s: self.delay_unit_duration_s,
            measurement_duration_s: self.measurement_duration_s,
            layout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qubit() -> QubitCalibration {
        QubitCalibration {
            frequency_hz: 5.0e9,
            t1_s: 20e-6,
            t2_s: 15e-6,
            rb_error: 0.002,
            readout: ReadoutFidelity {
                p1_given_0: 0.01,
                p0_given_1: 0.03,
            },
        }
    }

    fn builder() -> CalibrationProfileBuilder {
        CalibrationProfile::builder("test")
            .base_temperature(0.02)
            .delay_unit_duration(1e-6)
            .measurement_duration(2e-6)
    }

    #[test]
    fn test_profile_from_labels() {
        let profile = builder()
            .qubit("Q1", qubit())
            .qubit("Q0", qubit())
            .pair_error(1, 0, 0.02)
            .build()
            .unwrap();
        assert_eq!(profile.layout().physical("Q1"), Some(1));
        assert_eq!(profile.pair_error(0, 1), Some(0.02));
        assert_eq!(profile.pair_error(1, 0), Some(0.02));
        let order: Vec<u32> = profile.qubits().map(|(i, _, _)| i).collect();
        assert_eq!(order, vec![0, 1]);
    }

    #[test]
    fn test_t2_exceeds_twice_t1() {
        let mut bad = qubit();
        bad.t2_s = 45e-6;
        let err = builder().qubit("Q0", bad).build().unwrap_err();
        match err {
            NoiseError::Validation { parameter, qubit, .. } => {
                assert_eq!(parameter, "T2 [s]");
                assert_eq!(qubit.as_deref(), Some("Q0"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_probability_out_of_range() {
        let mut bad = qubit();
        bad.readout.p0_given_1 = 1.2;
        assert!(matches!(
            builder().qubit("Q0", bad).build(),
            Err(NoiseError::Validation { .. })
        ));
    }

    #[test]
    fn test_negative_duration_rejected() {
        let err = CalibrationProfile::builder("test")
            .base_temperature(0.02)
            .delay_unit_duration(-1e-6)
            .measurement_duration(2e-6)
            .qubit("Q0", qubit())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Delay duration"));
    }

    #[test]
    fn test_unresolvable_label() {
        let err = builder().qubit("alpha", qubit()).build().unwrap_err();
        assert!(err.to_string().contains("Layout"));
    }

    #[test]
    fn test_explicit_layout() {
        let layout = QubitLayout::from_assignments([
            ("alpha".to_string(), 1),
            ("beta".to_string(), 0),
        ])
        .unwrap();
        let profile = builder()
            .qubit("alpha", qubit())
            .qubit("beta", qubit())
            .layout(layout)
            .build()
            .unwrap();
        assert_eq!(profile.layout().label(0), Some("beta"));
        assert!(profile.qubit_at(1).is_some());
    }

    #[test]
    fn test_layout_not_injective() {
        let err =
            QubitLayout::from_assignments([("a".to_string(), 0), ("b".to_string(), 0)]).unwrap_err();
        assert!(matches!(err, NoiseError::Validation { .. }));
    }

    #[test]
    fn test_pair_validation() {
        assert!(builder().qubit("0", qubit()).pair_error(0, 0, 0.01).build().is_err());
        assert!(builder().qubit("0", qubit()).pair_error(0, 3, 0.01).build().is_err());
        assert!(
            builder()
                .qubit("0", qubit())
                .qubit("1", qubit())
                .pair_error(0, 1, 0.01)
                .pair_error(1, 0, 0.01)
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!(parse_label_index("Q12"), Some(12));
        assert_eq!(parse_label_index("q0"), Some(0));
        assert_eq!(parse_label_index("7"), Some(7));
        assert_eq!(parse_label_index("Q"), None);
        assert_eq!(parse_label_index("Q-1"), None);
    }
}
