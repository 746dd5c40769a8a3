//! Property tests: every synthesized channel is trace preserving.

use proptest::prelude::*;
use qisim_noise::{
    BackendParameters, CalibrationProfile, COMPLETENESS_TOLERANCE, NoiseChannel, NoiseError,
    NoiseModelAssembler, depolarization_channel, pure_dephasing_channel, readout_confusion,
    relaxation_channel,
};

/// (T1, T2) with T2 strictly inside (0, 2·T1).
fn coherence_times() -> impl Strategy<Value = (f64, f64)> {
    (1e-6f64..500e-6).prop_flat_map(|t1| (Just(t1), (0.01f64..0.999).prop_map(move |r| r * 2.0 * t1)))
}

proptest! {
    #[test]
    fn relaxation_is_complete(
        temperature in 0.005f64..0.5,
        frequency in 1e9f64..10e9,
        t1 in 1e-6f64..500e-6,
        duration in 0.0f64..50e-6,
    ) {
        let channel = relaxation_channel(temperature, frequency, t1, duration).unwrap();
        prop_assert!(channel.completeness_deviation() <= COMPLETENESS_TOLERANCE);
    }

    #[test]
    fn dephasing_is_complete((t1, t2) in coherence_times(), duration in 0.0f64..50e-6) {
        let channel = pure_dephasing_channel(t1, t2, duration).unwrap();
        prop_assert_eq!(channel.operators().len(), 2);
        prop_assert!(channel.completeness_deviation() <= COMPLETENESS_TOLERANCE);
    }

    #[test]
    fn thermal_relaxation_is_complete(
        (t1, t2) in coherence_times(),
        duration in 0.0f64..50e-6,
        frequency in 1e9f64..10e9,
    ) {
        let channel = NoiseChannel::thermal_relaxation(0.02, frequency, t1, t2, duration).unwrap();
        prop_assert!(channel.kraus().completeness_deviation() <= COMPLETENESS_TOLERANCE);
    }

    #[test]
    fn depolarizing_is_complete(n in 1usize..=2, epsilon in 0.0f64..0.5) {
        let channel = depolarization_channel(n, epsilon).unwrap();
        prop_assert_eq!(channel.operators().len(), 1 << (2 * n));
        prop_assert!(channel.completeness_deviation() <= COMPLETENESS_TOLERANCE);
    }

    #[test]
    fn confusion_rows_are_stochastic(p10 in 0.0f64..=1.0, p01 in 0.0f64..=1.0) {
        let confusion = readout_confusion(p10, p01).unwrap();
        for row in confusion.rows() {
            prop_assert!((row[0] + row[1] - 1.0).abs() < 1e-12);
            prop_assert!(row.iter().all(|&p| (0.0..=1.0).contains(&p)));
        }
    }
}

const PARAMS: &str = r#"{
    "Tuna-5": {
        "Qubits": {
            "0": {"Frequency [Hz]": 6.1e9, "T1 [s]": 3.0e-5, "T2 [s]": 2.2e-5,
                  "RB error": 0.0012, "SSRO": {"p1given0": 0.015, "p0given1": 0.042}},
            "1": {"Frequency [Hz]": 5.4e9, "T1 [s]": 2.5e-5, "T2 [s]": 1.8e-5,
                  "RB error": 0.0020, "SSRO": {"p1given0": 0.022, "p0given1": 0.051}},
            "2": {"Frequency [Hz]": 4.9e9, "T1 [s]": 4.1e-5, "T2 [s]": 3.9e-5,
                  "RB error": 0.0009, "SSRO": {"p1given0": 0.011, "p0given1": 0.037}}
        },
        "CZ IRB errors": {"(0, 2)": 0.021, "(1, 2)": 0.034},
        "Base temperature [K]": 0.015,
        "Delay duration [s]": 2.0e-8,
        "Measurement duration [s]": 1.5e-6,
        "Native operations": ["id", "x", "y", "z", "rx", "ry", "cz", "measure", "delay", "barrier"],
        "Coupling map": [[0, 2], [1, 2]],
        "Qubit register": 3,
        "Default shots": 1024,
        "Max shots": 16384
    }
}"#;

#[test]
fn parameter_file_to_model() {
    let params = BackendParameters::from_json_str(PARAMS, Some("Tuna-5")).unwrap();
    let profile = CalibrationProfile::from_parameters("Tuna-5", &params).unwrap();
    assert_eq!(profile.num_qubits(), 3);
    assert_eq!(profile.pair_error(2, 0), Some(0.021));

    let model = NoiseModelAssembler::default().assemble(&profile).unwrap();
    assert!(model.channel("cz", &[2, 1]).is_some());
    assert!(model.channel("cz", &[0, 1]).is_none());
    for (_, _, channel) in model.entries() {
        assert!(channel.kraus().completeness_deviation() <= COMPLETENESS_TOLERANCE);
    }
}

#[test]
fn explicit_layout_overrides_labels() {
    let mut params = BackendParameters::from_json_str(PARAMS, None).unwrap();
    let relabelled = params
        .qubits
        .iter()
        .map(|(label, q)| (format!("alpha{label}"), *q))
        .collect();
    params.qubits = relabelled;
    assert!(matches!(
        CalibrationProfile::from_parameters("Tuna-5", &params),
        Err(NoiseError::Validation { .. })
    ));

    params.layout = Some(
        [("alpha0", 2), ("alpha1", 1), ("alpha2", 0)]
            .into_iter()
            .map(|(l, i)| (l.to_string(), i))
            .collect(),
    );
    let profile = CalibrationProfile::from_parameters("Tuna-5", &params).unwrap();
    assert_eq!(profile.layout().label(0), Some("alpha2"));
    assert_eq!(profile.qubit_at(0).unwrap().frequency_hz, 4.9e9);
}

#[test]
fn invalid_calibration_is_rejected_at_load() {
    let broken = PARAMS.replace("\"T2 [s]\": 3.9e-5", "\"T2 [s]\": 9.9e-5");
    let params = BackendParameters::from_json_str(&broken, None).unwrap();
    let err = CalibrationProfile::from_parameters("Tuna-5", &params).unwrap_err();
    match err {
        NoiseError::Validation { parameter, qubit, .. } => {
            assert_eq!(parameter, "T2 [s]");
            assert_eq!(qubit.as_deref(), Some("2"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
