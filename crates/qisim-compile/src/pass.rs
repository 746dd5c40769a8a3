//! Pass trait and types for compilation passes.

use qisim_ir::Circuit;

use crate::error::CompileResult;
use crate::property::PropertySet;

/// The kind of compilation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Analysis pass that reads but does not modify the circuit.
    Analysis,
    /// Transformation pass that rewrites the circuit.
    Transformation,
}

/// A compilation pass that operates on a circuit.
///
/// Passes run in order over one ordered instruction list. Analysis passes
/// validate and may write to the [`PropertySet`]; transformation passes
/// rewrite the circuit.
pub trait Pass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Get the kind of this pass.
    fn kind(&self) -> PassKind;

    /// Run the pass on the given circuit.
    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()>;

    /// Check if this pass should run based on current state.
    fn should_run(&self, _circuit: &Circuit, _properties: &PropertySet) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::Layout;

    struct IdentityLayoutPass;

    impl Pass for IdentityLayoutPass {
        fn name(&self) -> &str {
            "identity_layout"
        }

        fn kind(&self) -> PassKind {
            PassKind::Analysis
        }

        fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
            properties.layout = Some(Layout::trivial(circuit.num_qubits() as u32));
            Ok(())
        }
    }

    #[test]
    fn test_pass_writes_property() {
        let pass = IdentityLayoutPass;
        let mut circuit = Circuit::bell().unwrap();
        let mut props = PropertySet::new();

        assert_eq!(pass.kind(), PassKind::Analysis);
        assert!(pass.should_run(&circuit, &props));
        pass.run(&mut circuit, &mut props).unwrap();
        let layout = props.layout.as_ref().unwrap();
        assert_eq!(layout.len(), circuit.num_qubits());
    }
}
