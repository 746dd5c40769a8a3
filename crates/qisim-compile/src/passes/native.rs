//! Native gate check.

use tracing::debug;

use qisim_ir::Circuit;

use super::physical_qubits;
use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Operations accepted on every target regardless of its native gate set.
pub const DIRECTIVES: &[&str] = &["measure", "reset", "barrier", "delay"];

/// Reject any gate outside the target's native operations.
///
/// No decomposition is attempted: translating a gate would change the noise
/// the circuit accumulates.
pub struct NativeGateCheck;

impl Pass for NativeGateCheck {
    fn name(&self) -> &str {
        "NativeGateCheck"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let basis = properties
            .basis_gates
            .as_ref()
            .ok_or(CompileError::MissingBasisGates)?;

        for instruction in circuit.instructions() {
            let name = instruction.name();
            if DIRECTIVES.contains(&name) || basis.contains(name) {
                continue;
            }
            debug!("Rejecting non-native operation {name}");
            return Err(CompileError::UnsupportedOperation {
                operation: name.to_string(),
                qubits: physical_qubits(instruction),
                reason: format!("not in native gate set {:?}", basis.gates()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::BasisGates;
    use qisim_ir::QubitId;

    fn props() -> PropertySet {
        let mut props = PropertySet::new();
        props.basis_gates = Some(BasisGates::new(["ry", "cz"]));
        props
    }

    #[test]
    fn test_native_circuit_passes() {
        let mut circuit = Circuit::bell().unwrap();
        circuit.delay(QubitId(0), 3).unwrap().reset(QubitId(1)).unwrap();
        NativeGateCheck.run(&mut circuit, &mut props()).unwrap();
    }

    #[test]
    fn test_non_native_gate_rejected() {
        let mut circuit = Circuit::with_size("h", 2, 0);
        circuit.ry(0.1, QubitId(0)).unwrap().h(QubitId(1)).unwrap();

        let err = NativeGateCheck.run(&mut circuit, &mut props()).unwrap_err();
        match err {
            CompileError::UnsupportedOperation {
                operation, qubits, ..
            } => {
                assert_eq!(operation, "h");
                assert_eq!(qubits, vec![1]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_basis() {
        let mut circuit = Circuit::bell().unwrap();
        let err = NativeGateCheck
            .run(&mut circuit, &mut PropertySet::new())
            .unwrap_err();
        assert!(matches!(err, CompileError::MissingBasisGates));
    }
}
