//! Calibrated noise models for superconducting processors.
//!
//! This crate turns device calibration data into quantum error channels:
//!
//! - [`params`]: the on-disk parameter file format ([`BackendParameters`])
//! - [`calibration`]: validated [`CalibrationProfile`]s with an explicit
//!   label → physical index [`QubitLayout`]
//! - [`channels`]: pure channel synthesis (thermal relaxation, pure
//!   dephasing, generalized depolarization, readout confusion)
//! - [`kraus`]: the [`KrausChannel`] representation and its completeness check
//! - [`model`]: [`NoiseModelAssembler`] and the immutable [`AssembledNoiseModel`]
//!
//! # Example
//!
//! ```rust
//! use qisim_noise::{
//!     AssemblyOptions, CalibrationProfile, NoiseModelAssembler, QubitCalibration,
//!     ReadoutFidelity,
//! };
//!
//! let qubit = QubitCalibration {
//!     frequency_hz: 5.0e9,
//!     t1_s: 20e-6,
//!     t2_s: 15e-6,
//!     rb_error: 0.001,
//!     readout: ReadoutFidelity { p1_given_0: 0.02, p0_given_1: 0.05 },
//! };
//! let profile = CalibrationProfile::builder("demo")
//!     .base_temperature(0.02)
//!     .delay_unit_duration(1e-6)
//!     .measurement_duration(2e-6)
//!     .qubit("Q0", qubit)
//!     .qubit("Q1", qubit)
//!     .pair_error(0, 1, 0.02)
//!     .build()
//!     .unwrap();
//!
//! let model = NoiseModelAssembler::new(AssemblyOptions::default())
//!     .assemble(&profile)
//!     .unwrap();
//! assert!(model.channel("cz", &[1, 0]).is_some());
//! assert!(model.channel("delay", &[0]).is_some());
//! ```

pub mod calibration;
pub mod channels;
pub mod error;
pub mod kraus;
pub mod model;
pub mod params;

pub use calibration::{
    CalibrationProfile, CalibrationProfileBuilder, QubitCalibration, QubitLayout, QubitPair,
    ReadoutFidelity,
};
pub use channels::{
    NoiseChannel, ReadoutConfusion, ThermalRelaxation, depolarization_channel,
    depolarization_param, gate_error_from_rb, pure_dephasing_channel, readout_confusion,
    relaxation_channel, thermal_decay_probability, thermal_relaxation_channel,
};
pub use error::{NoiseError, NoiseResult};
pub use kraus::{COMPLETENESS_TOLERANCE, KrausChannel};
pub use model::{
    AssembledNoiseModel, AssemblyOptions, DELAY, MEASURE, NoiseModelAssembler,
    SINGLE_QUBIT_NOISY_GATES, TWO_QUBIT_NOISY_GATES,
};
pub use params::{BackendParameters, ParameterFormat};
