//! Channel synthesis from calibration numbers.
//!
//! Every function here is pure: calibration values in, validated channel out.
//!
//! # Thermal relaxation
//!
//! Energy relaxation at finite temperature is modelled as generalized
//! amplitude damping. With `γ = 1 − exp(−t/T1)` and decay weight
//! `p = 1 / (1 + exp(−h f / k T))` the Kraus operators are
//!
//! ```text
//! K0 = √p     [[1, 0], [0, √(1−γ)]]     K1 = √p     [[0, √γ], [0, 0]]
//! K2 = √(1−p) [[√(1−γ), 0], [0, 1]]     K3 = √(1−p) [[0, 0], [√γ, 0]]
//! ```
//!
//! # Pure dephasing
//!
//! `Tφ = 1 / (1/T2 − 1/(2 T1))`, `λ = 1 − exp(−t/Tφ)`. With probability `λ`
//! the phase is randomized; the Kraus pair is `√(1−λ/2) I`, `√(λ/2) Z`.
//!
//! # Depolarization
//!
//! A per-gate error `ε` maps to the RB decay `p = 1 − 2^n ε / (2^n − 1)` and
//! mixing weight `λ = (4^n − 1) / 4^n · (1 − p)`, spread uniformly over the
//! non-identity Pauli strings.

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::calibration::check_probability;
use crate::error::{NoiseError, NoiseResult};
use crate::kraus::{KrausChannel, pauli, pauli_basis, real_2x2};

/// Planck constant in J·s (CODATA 2018, exact).
pub const PLANCK: f64 = 6.626_070_15e-34;
/// Boltzmann constant in J/K (CODATA 2018, exact).
pub const BOLTZMANN: f64 = 1.380_649e-23;

/// Weight of the decay branch of generalized amplitude damping.
///
/// The equilibrium excited-state population is `1 −` this value.
pub fn thermal_decay_probability(frequency_hz: f64, temperature_k: f64) -> f64 {
    1.0 / (1.0 + (-PLANCK * frequency_hz / (BOLTZMANN * temperature_k)).exp())
}

fn check_domain(parameter: &'static str, value: f64, allow_zero: bool) -> NoiseResult<()> {
    let ok = value.is_finite() && (value > 0.0 || (allow_zero && value == 0.0));
    if ok {
        Ok(())
    } else {
        let bound = if allow_zero { "non-negative" } else { "positive" };
        Err(NoiseError::Domain {
            parameter,
            reason: format!("must be finite and {bound}, got {value}"),
        })
    }
}

/// Generalized amplitude damping for an interval of `duration_s`.
///
/// A zero duration yields the identity map exactly.
pub fn relaxation_channel(
    temperature_k: f64,
    frequency_hz: f64,
    t1_s: f64,
    duration_s: f64,
) -> NoiseResult<KrausChannel> {
    check_domain("temperature", temperature_k, false)?;
    check_domain("frequency", frequency_hz, false)?;
    check_domain("T1", t1_s, false)?;
    check_domain("duration", duration_s, true)?;

    let p = thermal_decay_probability(frequency_hz, temperature_k);
    let gamma = -(-duration_s / t1_s).exp_m1();
    amplitude_damping_operators(p, gamma)
}

fn amplitude_damping_operators(p: f64, gamma: f64) -> NoiseResult<KrausChannel> {
    let keep = (1.0 - gamma).sqrt();
    let (sp, sq) = (p.sqrt(), (1.0 - p).sqrt());
    let sg = gamma.sqrt();
    KrausChannel::new(
        "thermal_relaxation",
        vec![
            real_2x2([sp, 0.0, 0.0, sp * keep]),
            real_2x2([0.0, sp * sg, 0.0, 0.0]),
            real_2x2([sq * keep, 0.0, 0.0, sq]),
            real_2x2([0.0, 0.0, sq * sg, 0.0]),
        ],
    )
}

/// Pure dephasing time `Tφ`, or a domain error when `1/T2 ≤ 1/(2 T1)`.
pub fn pure_dephasing_time(t1_s: f64, t2_s: f64) -> NoiseResult<f64> {
    check_domain("T1", t1_s, false)?;
    check_domain("T2", t2_s, false)?;
    let rate = pure_dephasing_rate(t1_s, t2_s);
    if rate <= 0.0 {
        return Err(NoiseError::Domain {
            parameter: "T2",
            reason: format!(
                "1/T2 = {:e} must exceed 1/(2*T1) = {:e} for pure dephasing",
                1.0 / t2_s,
                1.0 / (2.0 * t1_s)
            ),
        });
    }
    Ok(1.0 / rate)
}

/// `1/T2 − 1/(2 T1)`; zero or negative when T2 is at or beyond the
/// relaxation limit.
fn pure_dephasing_rate(t1_s: f64, t2_s: f64) -> f64 {
    1.0 / t2_s - 1.0 / (2.0 * t1_s)
}

/// Pure dephasing over `duration_s`, as two Kraus operators.
pub fn pure_dephasing_channel(t1_s: f64, t2_s: f64, duration_s: f64) -> NoiseResult<KrausChannel> {
    let t_phi = pure_dephasing_time(t1_s, t2_s)?;
    check_domain("duration", duration_s, true)?;
    let lambda = -(-duration_s / t_phi).exp_m1();
    phase_randomization(lambda)
}

fn phase_randomization(lambda: f64) -> NoiseResult<KrausChannel> {
    let flip = lambda / 2.0;
    let identity = pauli(0).mapv(|z| z * (1.0 - flip).sqrt());
    let z = pauli(3).mapv(|z| z * flip.sqrt());
    KrausChannel::new("pure_dephasing", vec![identity, z])
}

/// Depolarizing mixing weight `λ` for an `n`-qubit gate with error `ε`.
pub fn depolarization_param(num_qubits: usize, epsilon: f64) -> f64 {
    let d = (1u64 << num_qubits) as f64;
    let p_rb = 1.0 - d * epsilon / (d - 1.0);
    (d * d - 1.0) / (d * d) * (1.0 - p_rb)
}

/// Generalized `n`-qubit depolarizing channel over the full Pauli basis.
pub fn depolarization_channel(num_qubits: usize, epsilon: f64) -> NoiseResult<KrausChannel> {
    let label = format!("depolarizing_{num_qubits}q");
    if num_qubits == 0 {
        return Err(NoiseError::construction(label, "channel needs at least one qubit"));
    }
    if !(0.0..=1.0).contains(&epsilon) {
        return Err(NoiseError::construction(
            label,
            format!("gate error {epsilon} outside [0, 1]"),
        ));
    }
    let lambda = depolarization_param(num_qubits, epsilon);
    let terms = ((1u64 << (2 * num_qubits)) - 1) as f64;
    if !(0.0..=1.0).contains(&lambda) {
        return Err(NoiseError::construction(
            label,
            format!("gate error {epsilon} gives mixing weight {lambda} outside [0, 1]"),
        ));
    }

    let identity_weight = Complex64::new((1.0 - lambda).sqrt(), 0.0);
    let pauli_weight = Complex64::new((lambda / terms).sqrt(), 0.0);
    let operators: Vec<Array2<Complex64>> = pauli_basis(num_qubits)
        .into_iter()
        .enumerate()
        .map(|(s, p)| {
            let weight = if s == 0 { identity_weight } else { pauli_weight };
            p.mapv(|z| z * weight)
        })
        .collect();
    KrausChannel::new(&label, operators)
}

/// Per-gate error from an RB error per Clifford and the average gate count per Clifford.
///
/// `ε = 1 − (1 − r)^n`.
pub fn gate_error_from_rb(rb_error: f64, gates_per_clifford: f64) -> f64 {
    1.0 - (1.0 - rb_error).powf(gates_per_clifford)
}

/// Thermal relaxation with dephasing, in parameterized form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalRelaxation {
    /// Interval the channel covers, in seconds.
    pub duration_s: f64,
    /// Weight of the decay branch.
    pub decay_probability: f64,
    /// Amplitude damping rate `γ = 1 − exp(−t/T1)`.
    pub relaxation_gamma: f64,
    /// Phase randomization probability `λ = 1 − exp(−t/Tφ)`; zero without pure dephasing.
    pub dephasing_lambda: f64,
}

impl ThermalRelaxation {
    /// Derive the parameters for one qubit and interval.
    ///
    /// When `T2 = 2 T1` there is no pure dephasing and `dephasing_lambda` is 0.
    pub fn new(
        temperature_k: f64,
        frequency_hz: f64,
        t1_s: f64,
        t2_s: f64,
        duration_s: f64,
    ) -> NoiseResult<Self> {
        check_domain("temperature", temperature_k, false)?;
        check_domain("frequency", frequency_hz, false)?;
        check_domain("T1", t1_s, false)?;
        check_domain("T2", t2_s, false)?;
        check_domain("duration", duration_s, true)?;
        if t2_s > 2.0 * t1_s {
            return Err(NoiseError::Domain {
                parameter: "T2",
                reason: format!("T2 = {t2_s:e} exceeds 2*T1 = {:e}", 2.0 * t1_s),
            });
        }

        let rate = pure_dephasing_rate(t1_s, t2_s);
        let dephasing_lambda = if rate > 0.0 {
            -(-duration_s * rate).exp_m1()
        } else {
            0.0
        };
        Ok(Self {
            duration_s,
            decay_probability: thermal_decay_probability(frequency_hz, temperature_k),
            relaxation_gamma: -(-duration_s / t1_s).exp_m1(),
            dephasing_lambda,
        })
    }

    /// Kraus form: relaxation followed by dephasing.
    pub fn to_kraus(&self) -> NoiseResult<KrausChannel> {
        let relaxation = amplitude_damping_operators(self.decay_probability, self.relaxation_gamma)?;
        if self.dephasing_lambda == 0.0 {
            return Ok(relaxation);
        }
        let dephasing = phase_randomization(self.dephasing_lambda)?;
        relaxation.compose(&dephasing, "thermal_relaxation")
    }
}

/// Relaxation followed by pure dephasing for one qubit and interval.
pub fn thermal_relaxation_channel(
    temperature_k: f64,
    frequency_hz: f64,
    t1_s: f64,
    t2_s: f64,
    duration_s: f64,
) -> NoiseResult<KrausChannel> {
    ThermalRelaxation::new(temperature_k, frequency_hz, t1_s, t2_s, duration_s)?.to_kraus()
}

/// Row-stochastic readout confusion matrix of one qubit.
///
/// Rows are the prepared state, columns the declared outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadoutConfusion {
    matrix: [[f64; 2]; 2],
}

impl ReadoutConfusion {
    /// `P(declared | prepared)`.
    pub fn probability(&self, prepared: usize, declared: usize) -> f64 {
        self.matrix[prepared & 1][declared & 1]
    }

    /// Probability that the declared bit differs from the prepared one.
    pub fn flip_probability(&self, prepared: usize) -> f64 {
        self.matrix[prepared & 1][1 - (prepared & 1)]
    }

    /// Matrix rows.
    pub fn rows(&self) -> [[f64; 2]; 2] {
        self.matrix
    }

    /// As a 2×2 array.
    pub fn to_array(&self) -> Array2<f64> {
        Array2::from_shape_fn((2, 2), |(r, c)| self.matrix[r][c])
    }

    /// Whether readout is perfect.
    pub fn is_ideal(&self) -> bool {
        self.matrix[0][1] == 0.0 && self.matrix[1][0] == 0.0
    }

    /// Joint confusion matrix of independent qubits.
    ///
    /// Position `k` in `confusions` corresponds to bit `k` of the joint index.
    pub fn tensor(confusions: &[ReadoutConfusion]) -> Array2<f64> {
        confusions
            .iter()
            .rev()
            .fold(Array2::eye(1), |acc, c| ndarray::linalg::kron(&acc, &c.to_array()))
    }
}

/// Readout confusion matrix from SSRO error rates.
pub fn readout_confusion(p1_given_0: f64, p0_given_1: f64) -> NoiseResult<ReadoutConfusion> {
    for (name, value) in [("p1given0", p1_given_0), ("p0given1", p0_given_1)] {
        if check_probability(name, None, value).is_err() {
            return Err(NoiseError::construction(
                "readout_confusion",
                format!("{name} = {value} outside [0, 1]"),
            ));
        }
    }
    Ok(ReadoutConfusion {
        matrix: [
            [1.0 - p1_given_0, p1_given_0],
            [p0_given_1, 1.0 - p0_given_1],
        ],
    })
}

/// A noise channel attached to one operation.
#[derive(Debug, Clone, PartialEq)]
pub enum NoiseChannel {
    /// Relaxation and dephasing, keeping its physical parameters.
    ThermalRelaxation {
        /// Parameterized form.
        parameters: ThermalRelaxation,
        /// Materialized Kraus operators.
        kraus: KrausChannel,
    },
    /// Depolarizing channel on `n` qubits.
    Depolarizing {
        /// Per-gate error the channel was built from.
        epsilon: f64,
        /// Mixing weight.
        lambda: f64,
        /// Materialized Kraus operators.
        kraus: KrausChannel,
    },
    /// Any other channel given directly by Kraus operators.
    Kraus(KrausChannel),
}

impl NoiseChannel {
    /// Build the relaxation/dephasing channel for one qubit and interval.
    pub fn thermal_relaxation(
        temperature_k: f64,
        frequency_hz: f64,
        t1_s: f64,
        t2_s: f64,
        duration_s: f64,
    ) -> NoiseResult<Self> {
        let parameters = ThermalRelaxation::new(temperature_k, frequency_hz, t1_s, t2_s, duration_s)?;
        let kraus = parameters.to_kraus()?;
        Ok(NoiseChannel::ThermalRelaxation { parameters, kraus })
    }

    /// Build the `n`-qubit depolarizing channel for gate error `ε`.
    pub fn depolarizing(num_qubits: usize, epsilon: f64) -> NoiseResult<Self> {
        let kraus = depolarization_channel(num_qubits, epsilon)?;
        Ok(NoiseChannel::Depolarizing {
            epsilon,
            lambda: depolarization_param(num_qubits, epsilon),
            kraus,
        })
    }

    /// Kraus operators of the channel.
    pub fn kraus(&self) -> &KrausChannel {
        match self {
            NoiseChannel::ThermalRelaxation { kraus, .. }
            | NoiseChannel::Depolarizing { kraus, .. }
            | NoiseChannel::Kraus(kraus) => kraus,
        }
    }

    /// Number of qubits the channel acts on.
    pub fn num_qubits(&self) -> usize {
        self.kraus().num_qubits()
    }

    /// Short description for listings.
    pub fn summary(&self) -> String {
        match self {
            NoiseChannel::ThermalRelaxation { parameters, kraus } => format!(
                "thermal_relaxation(t={:.3e}s, p_decay={:.6}, gamma={:.3e}, lambda={:.3e}; {} ops)",
                parameters.duration_s,
                parameters.decay_probability,
                parameters.relaxation_gamma,
                parameters.dephasing_lambda,
                kraus.operators().len()
            ),
            NoiseChannel::Depolarizing { epsilon, lambda, kraus } => format!(
                "depolarizing_{}q(eps={epsilon:.3e}, lambda={lambda:.3e}; {} ops)",
                kraus.num_qubits(),
                kraus.operators().len()
            ),
            NoiseChannel::Kraus(kraus) => format!(
                "kraus_{}q({} ops)",
                kraus.num_qubits(),
                kraus.operators().len()
            ),
        }
    }
}
