//! Delay expansion.
//!
//! The assembled noise model holds one idle channel per qubit, built for a
//! single delay unit. Splitting every delay into unit steps applies that
//! channel exactly once per unit, in order with the surrounding operations.

use tracing::debug;

use qisim_ir::{Circuit, Instruction};

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Rewrite each delay of `d` units into `d` unit delays on the same qubits.
pub struct DelayExpansion;

impl Pass for DelayExpansion {
    fn name(&self) -> &str {
        "DelayExpansion"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, _properties: &mut PropertySet) -> CompileResult<()> {
        let expanded = expand_instructions(circuit.instructions());
        debug!(
            "Expanded delays: {} -> {} instructions",
            circuit.len(),
            expanded.len()
        );
        circuit.replace_instructions(expanded)?;
        Ok(())
    }

    fn should_run(&self, circuit: &Circuit, _properties: &PropertySet) -> bool {
        circuit
            .instructions()
            .iter()
            .any(|i| i.delay_duration().is_some_and(|d| d != 1))
    }
}

/// Expand the delays of a circuit into unit delays.
///
/// Zero-length delays are dropped; every other instruction is kept in its
/// original position relative to the rest.
pub fn expand_delays(circuit: &Circuit) -> CompileResult<Circuit> {
    let mut expanded = circuit.clone();
    expanded.replace_instructions(expand_instructions(circuit.instructions()))?;
    Ok(expanded)
}

fn expand_instructions(instructions: &[Instruction]) -> Vec<Instruction> {
    let mut out = Vec::with_capacity(instructions.len());
    for instruction in instructions {
        match instruction.delay_duration() {
            Some(duration) => {
                for _ in 0..duration {
                    out.push(Instruction::delay_on(instruction.qubits.iter().copied(), 1));
                }
            }
            None => out.push(instruction.clone()),
        }
    }
    out
}
