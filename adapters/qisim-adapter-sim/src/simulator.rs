//! Simulator backend implementation.

use std::time::Instant;

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, instrument};

use qisim_hal::{
    Backend, Capabilities, Counts, ExecutionRequest, ExecutionResult, HalError, HalResult,
    MAX_CLASSICAL_BITS, format_bitstring,
};
use qisim_ir::{Circuit, Instruction, InstructionKind};
use qisim_noise::{AssembledNoiseModel, DELAY, MEASURE};

use crate::statevector::Statevector;

/// Widest register the statevector engine accepts.
pub const MAX_QUBITS: u32 = 24;

/// Trajectory statevector backend.
///
/// Each shot evolves a fresh statevector through the circuit. After every
/// gate, unit delay and before every measurement collapse, the channel the
/// noise model attaches to that operation and those physical qubits is
/// sampled. Declared measurement outcomes are then flipped with the readout
/// confusion probabilities of the measured qubit.
pub struct SimulatorBackend {
    name: String,
    capabilities: Capabilities,
    seed: Option<u64>,
}

impl SimulatorBackend {
    /// A simulator of the described processor.
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            name: capabilities.name.clone(),
            capabilities,
            seed: None,
        }
    }

    /// An unconstrained simulator of `num_qubits` qubits.
    pub fn ideal(num_qubits: u32) -> Self {
        Self::new(Capabilities::simulator(num_qubits))
    }

    /// Seed the sampler; every execution then restarts from this seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Run all shots synchronously.
    #[instrument(skip_all, fields(circuit = circuit.name(), shots = request.shots))]
    fn run_simulation(
        &self,
        circuit: &Circuit,
        request: &ExecutionRequest,
    ) -> HalResult<ExecutionResult> {
        let start = Instant::now();
        let num_qubits = circuit.num_qubits();
        let num_clbits = circuit.num_clbits();
        let noise = request.noise_model.as_deref();
        debug!(
            "Starting simulation: {} qubits, {} clbits, noisy: {}",
            num_qubits,
            num_clbits,
            noise.is_some()
        );

        let mut rng = self.rng();
        let mut counts = Counts::zero_filled(num_clbits);
        let mut memory = request.memory.then(|| Vec::with_capacity(request.shots as usize));

        for shot in 0..request.shots {
            let mut sv = Statevector::new(num_qubits);
            let mut clbits = vec![0u8; num_clbits];
            for instruction in circuit.instructions() {
                apply_instruction(&mut sv, &mut clbits, instruction, noise, &mut rng)?;
            }

            let index = clbits
                .iter()
                .enumerate()
                .fold(0usize, |acc, (bit, &value)| acc | (usize::from(value) << bit));
            let bitstring = format_bitstring(index, num_clbits);
            counts.insert(bitstring.clone(), 1);
            if let Some(memory) = memory.as_mut() {
                memory.push(bitstring);
            }

            if shot > 0 && shot % 1000 == 0 {
                debug!("Completed {} shots", shot);
            }
        }

        let elapsed = start.elapsed();
        debug!("Simulation completed in {:?}", elapsed);

        let mut result = ExecutionResult::new(counts, request.shots)
            .with_circuit(circuit.name())
            .with_backend(&self.name)
            .with_execution_time(elapsed.as_millis() as u64);
        if let Some(memory) = memory {
            result = result.with_memory(memory);
        }
        Ok(result)
    }
}

fn physical(instruction: &Instruction) -> Vec<u32> {
    instruction.qubits.iter().map(|q| q.0).collect()
}

/// Sample the channel attached to `operation` on `qubits`, if there is one.
fn apply_noise(
    sv: &mut Statevector,
    noise: Option<&AssembledNoiseModel>,
    operation: &str,
    qubits: &[u32],
    rng: &mut StdRng,
) {
    let Some(channel) = noise.and_then(|model| model.channel(operation, qubits)) else {
        return;
    };
    let targets: Vec<usize> = qubits.iter().map(|&q| q as usize).collect();
    sv.apply_channel(channel.kraus(), &targets, rng);
}

fn apply_instruction(
    sv: &mut Statevector,
    clbits: &mut [u8],
    instruction: &Instruction,
    noise: Option<&AssembledNoiseModel>,
    rng: &mut StdRng,
) -> HalResult<()> {
    let qubits = physical(instruction);
    match &instruction.kind {
        InstructionKind::Gate(gate) => {
            let targets: Vec<usize> = qubits.iter().map(|&q| q as usize).collect();
            sv.apply_gate(gate, &targets);
            apply_noise(sv, noise, gate.name(), &qubits, rng);
        }
        InstructionKind::Delay { duration } => match *duration {
            0 => {}
            // The idle channel is calibrated for exactly one unit.
            1 => {
                for &q in &qubits {
                    apply_noise(sv, noise, DELAY, &[q], rng);
                }
            }
            units => {
                return Err(HalError::InvalidCircuit(format!(
                    "delay of {units} units reached the simulator unexpanded"
                )));
            }
        },
        InstructionKind::Measure => {
            for (&q, clbit) in qubits.iter().zip(&instruction.clbits) {
                let declared = measure_qubit(sv, noise, q, rng);
                clbits[clbit.0 as usize] = declared;
            }
        }
        InstructionKind::Reset => {
            for &q in &qubits {
                sv.reset(q as usize, rng);
            }
        }
        InstructionKind::Barrier => {}
    }
    Ok(())
}

/// Relax for the measurement duration, collapse, then apply readout error.
fn measure_qubit(
    sv: &mut Statevector,
    noise: Option<&AssembledNoiseModel>,
    qubit: u32,
    rng: &mut StdRng,
) -> u8 {
    use rand::Rng;

    apply_noise(sv, noise, MEASURE, &[qubit], rng);
    let outcome = sv.measure(qubit as usize, rng);
    let flip = noise
        .and_then(|model| model.readout(qubit))
        .map_or(0.0, |confusion| confusion.flip_probability(usize::from(outcome)));
    if flip > 0.0 && rng.r#gen::<f64>() < flip {
        1 - outcome
    } else {
        outcome
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    #[instrument(skip_all, fields(backend = %self.name))]
    async fn execute(
        &self,
        circuit: &Circuit,
        request: &ExecutionRequest,
    ) -> HalResult<ExecutionResult> {
        let available = self.capabilities.num_qubits.min(MAX_QUBITS) as usize;
        if circuit.num_qubits() > available {
            return Err(HalError::Capacity {
                required: circuit.num_qubits(),
                available,
            });
        }
        if circuit.num_clbits() > MAX_CLASSICAL_BITS {
            return Err(HalError::ClassicalCapacity {
                required: circuit.num_clbits(),
                max: MAX_CLASSICAL_BITS,
            });
        }
        if request.shots == 0 {
            return Err(HalError::InvalidShots("shots must be positive".into()));
        }
        if request.shots > self.capabilities.max_shots {
            return Err(HalError::ShotLimit {
                requested: request.shots,
                max: self.capabilities.max_shots,
            });
        }

        self.run_simulation(circuit, request)
    }
}
