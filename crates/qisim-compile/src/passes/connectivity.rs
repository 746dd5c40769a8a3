//! Connectivity check.

use qisim_ir::Circuit;

use super::physical_qubits;
use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Reject two-qubit gates on uncoupled qubits.
///
/// There is no routing: a swap inserted here would add two-qubit noise the
/// caller never asked for.
pub struct ConnectivityCheck;

impl Pass for ConnectivityCheck {
    fn name(&self) -> &str {
        "ConnectivityCheck"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let coupling_map = properties
            .coupling_map
            .as_ref()
            .ok_or(CompileError::MissingCouplingMap)?;

        for instruction in circuit.instructions() {
            if !instruction.is_gate() || instruction.qubits.len() != 2 {
                continue;
            }
            let physical: Vec<u32> = match &properties.layout {
                Some(layout) => instruction
                    .qubits
                    .iter()
                    .map(|&q| layout.get_physical(q).unwrap_or(q.0))
                    .collect(),
                None => physical_qubits(instruction),
            };
            if !coupling_map.is_connected(physical[0], physical[1]) {
                return Err(CompileError::UnsupportedOperation {
                    operation: instruction.name().to_string(),
                    qubits: physical,
                    reason: "qubits are not coupled".into(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::CouplingMap;
    use qisim_ir::QubitId;

    fn props() -> PropertySet {
        let mut props = PropertySet::new();
        props.coupling_map = Some(CouplingMap::from_edges(3, [(0, 2), (1, 2)]));
        props
    }

    #[test]
    fn test_coupled_pairs_pass_in_either_order() {
        let mut circuit = Circuit::with_size("star", 3, 0);
        circuit
            .cz(QubitId(2), QubitId(0))
            .unwrap()
            .cz(QubitId(1), QubitId(2))
            .unwrap();
        ConnectivityCheck.run(&mut circuit, &mut props()).unwrap();
    }

    #[test]
    fn test_uncoupled_pair_rejected() {
        let mut circuit = Circuit::with_size("bad", 3, 0);
        circuit.cz(QubitId(0), QubitId(1)).unwrap();

        let err = ConnectivityCheck.run(&mut circuit, &mut props()).unwrap_err();
        match err {
            CompileError::UnsupportedOperation {
                operation, qubits, ..
            } => {
                assert_eq!(operation, "cz");
                assert_eq!(qubits, vec![0, 1]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_single_qubit_gates_ignored() {
        let mut circuit = Circuit::with_size("1q", 3, 0);
        circuit.x(QubitId(0)).unwrap().x(QubitId(1)).unwrap();
        ConnectivityCheck.run(&mut circuit, &mut props()).unwrap();
    }
}
