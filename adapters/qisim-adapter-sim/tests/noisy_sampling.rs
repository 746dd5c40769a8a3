//! Sampling statistics of the trajectory backend under a calibrated model.

use std::sync::Arc;

use qisim_adapter_sim::SimulatorBackend;
use qisim_hal::{Backend, ExecutionRequest};
use qisim_ir::{Circuit, ClbitId, Instruction, QubitId};
use qisim_noise::{
    AssembledNoiseModel, AssemblyOptions, CalibrationProfile, NoiseModelAssembler,
    QubitCalibration, ReadoutFidelity,
};

const SHOTS: u32 = 4000;

fn model(t1_s: f64, p0_given_1: f64) -> Arc<AssembledNoiseModel> {
    let qubit = QubitCalibration {
        frequency_hz: 5e9,
        t1_s,
        t2_s: t1_s,
        rb_error: 0.0,
        readout: ReadoutFidelity {
            p1_given_0: 0.0,
            p0_given_1,
        },
    };
    let profile = CalibrationProfile::builder("single")
        .qubit("0", qubit)
        .base_temperature(0.01)
        .delay_unit_duration(1e-6)
        .measurement_duration(1e-12)
        .build()
        .unwrap();
    Arc::new(
        NoiseModelAssembler::new(AssemblyOptions::exact())
            .assemble(&profile)
            .unwrap(),
    )
}

fn fraction(counts: u64) -> f64 {
    counts as f64 / f64::from(SHOTS)
}

#[tokio::test]
async fn readout_error_flips_declared_ones() {
    let backend = SimulatorBackend::ideal(1).with_seed(5);
    let mut circuit = Circuit::with_size("excited", 1, 1);
    circuit.x(QubitId(0)).unwrap().measure_all().unwrap();

    let request = ExecutionRequest::new(SHOTS).with_noise_model(model(1.0, 0.2));
    let result = backend.execute(&circuit, &request).await.unwrap();

    let p0 = fraction(result.counts.get("0"));
    assert!((p0 - 0.2).abs() < 0.03, "P(0) = {p0}");
}

#[tokio::test]
async fn unit_delays_integrate_decay() {
    let backend = SimulatorBackend::ideal(1).with_seed(17);
    let mut circuit = Circuit::with_size("idle", 1, 1);
    circuit.x(QubitId(0)).unwrap();
    for _ in 0..10 {
        circuit.push(Instruction::delay(QubitId(0), 1)).unwrap();
    }
    circuit.measure(QubitId(0), ClbitId(0)).unwrap();

    // Ten steps of 1 µs against T1 = 10 µs leave e^-1 in |1⟩.
    let request = ExecutionRequest::new(SHOTS).with_noise_model(model(10e-6, 0.0));
    let result = backend.execute(&circuit, &request).await.unwrap();

    let p1 = fraction(result.counts.get("1"));
    let expected = (-1.0f64).exp();
    assert!((p1 - expected).abs() < 0.03, "P(1) = {p1}, expected {expected}");
}

#[tokio::test]
async fn ideal_request_ignores_calibration() {
    let backend = SimulatorBackend::ideal(1).with_seed(2);
    let mut circuit = Circuit::with_size("excited", 1, 1);
    circuit.x(QubitId(0)).unwrap().measure_all().unwrap();

    let result = backend
        .execute(&circuit, &ExecutionRequest::new(200))
        .await
        .unwrap();
    assert_eq!(result.counts.get("1"), 200);
}
