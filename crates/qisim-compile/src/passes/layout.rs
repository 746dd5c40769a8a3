//! Trivial layout pass.

use qisim_ir::Circuit;

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{Layout, PropertySet};

/// Place circuit qubit `i` on physical qubit `i`.
///
/// The layout is fixed so that the noise a circuit sees depends only on the
/// qubits it names.
pub struct TrivialLayout;

impl Pass for TrivialLayout {
    fn name(&self) -> &str {
        "TrivialLayout"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let coupling_map = properties
            .coupling_map
            .as_ref()
            .ok_or(CompileError::MissingCouplingMap)?;

        let num_qubits = circuit.num_qubits();
        let available = coupling_map.num_qubits();
        if num_qubits > available as usize {
            return Err(CompileError::CircuitTooLarge {
                required: num_qubits,
                available,
            });
        }

        properties.layout = Some(Layout::trivial(num_qubits as u32));
        Ok(())
    }

    fn should_run(&self, _circuit: &Circuit, properties: &PropertySet) -> bool {
        properties.layout.is_none() && properties.coupling_map.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::CouplingMap;
    use qisim_ir::QubitId;

    #[test]
    fn test_trivial_layout() {
        let mut circuit = Circuit::with_size("test", 3, 0);
        let mut props = PropertySet::new();
        props.coupling_map = Some(CouplingMap::linear(5));

        TrivialLayout.run(&mut circuit, &mut props).unwrap();

        let layout = props.layout.unwrap();
        assert_eq!(layout.len(), 3);
        assert_eq!(layout.get_physical(QubitId(2)), Some(2));
    }

    #[test]
    fn test_circuit_too_large() {
        let mut circuit = Circuit::with_size("test", 6, 0);
        let mut props = PropertySet::new();
        props.coupling_map = Some(CouplingMap::linear(5));

        let err = TrivialLayout.run(&mut circuit, &mut props).unwrap_err();
        assert!(matches!(
            err,
            CompileError::CircuitTooLarge {
                required: 6,
                available: 5
            }
        ));
    }

    #[test]
    fn test_skipped_when_layout_present() {
        let circuit = Circuit::with_size("test", 2, 0);
        let props = PropertySet::new()
            .with_layout(Layout::trivial(2));
        assert!(!TrivialLayout.should_run(&circuit, &props));
    }
}
