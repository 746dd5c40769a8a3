//! Pass manager for orchestrating compilation.

use tracing::{debug, info, instrument};

use qisim_ir::Circuit;

use crate::error::CompileResult;
use crate::pass::Pass;
use crate::passes::{ConnectivityCheck, DelayExpansion, NativeGateCheck, TrivialLayout};
use crate::property::{BasisGates, CouplingMap, PropertySet};

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given circuit, stopping at the first failure.
    #[instrument(skip(self, circuit, properties), fields(circuit = circuit.name()))]
    pub fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on circuit with {} qubits",
            self.passes.len(),
            circuit.num_qubits()
        );

        for pass in &self.passes {
            if pass.should_run(circuit, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(circuit, properties)?;
                debug!("Pass {} completed, ops: {}", pass.name(), circuit.len());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!("Pass manager completed, ops: {}", circuit.len());
        Ok(())
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for the executor's pass pipeline.
pub struct PassManagerBuilder {
    properties: PropertySet,
    expand_delays: bool,
}

impl PassManagerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            properties: PropertySet::new(),
            expand_delays: true,
        }
    }

    /// Set the target properties.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    /// Set the target coupling map and basis gates.
    #[must_use]
    pub fn with_target(mut self, coupling_map: CouplingMap, basis_gates: BasisGates) -> Self {
        self.properties.coupling_map = Some(coupling_map);
        self.properties.basis_gates = Some(basis_gates);
        self
    }

    /// Keep delays as written instead of splitting them into unit steps.
    #[must_use]
    pub fn without_delay_expansion(mut self) -> Self {
        self.expand_delays = false;
        self
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();

        if self.properties.coupling_map.is_some() {
            pm.add_pass(TrivialLayout);
        }
        if self.properties.basis_gates.is_some() {
            pm.add_pass(NativeGateCheck);
        }
        if self.properties.coupling_map.is_some() {
            pm.add_pass(ConnectivityCheck);
        }
        if self.expand_delays {
            pm.add_pass(DelayExpansion);
        }

        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use qisim_ir::QubitId;

    fn target() -> (CouplingMap, BasisGates) {
        (
            CouplingMap::from_edges(3, [(0, 2), (1, 2)]),
            BasisGates::new(["x", "ry", "cz"]),
        )
    }

    #[test]
    fn test_empty_pass_manager() {
        let pm = PassManager::new();
        assert!(pm.is_empty());

        let mut circuit = Circuit::bell().unwrap();
        let before = circuit.clone();
        pm.run(&mut circuit, &mut PropertySet::new()).unwrap();
        assert_eq!(circuit, before);
    }

    #[test]
    fn test_builder_pipeline() {
        let (cm, basis) = target();
        let (pm, props) = PassManagerBuilder::new().with_target(cm, basis).build();
        assert_eq!(pm.len(), 4);
        assert!(props.coupling_map.is_some());

        let (pm, _) = PassManagerBuilder::new().without_delay_expansion().build();
        assert!(pm.is_empty());
    }

    #[test]
    fn test_pipeline_expands_after_checks() {
        let (cm, basis) = target();
        let (pm, mut props) = PassManagerBuilder::new().with_target(cm, basis).build();

        let mut circuit = Circuit::with_size("idle", 3, 3);
        circuit
            .x(QubitId(0))
            .unwrap()
            .delay(QubitId(0), 4)
            .unwrap()
            .cz(QubitId(0), QubitId(2))
            .unwrap()
            .measure_all()
            .unwrap();

        pm.run(&mut circuit, &mut props).unwrap();
        assert_eq!(circuit.len(), 1 + 4 + 1 + 1);
        assert!(props.layout.is_some());
    }

    #[test]
    fn test_pipeline_rejects_uncoupled_gate() {
        let (cm, basis) = target();
        let (pm, mut props) = PassManagerBuilder::new().with_target(cm, basis).build();

        let mut circuit = Circuit::with_size("bad", 3, 0);
        circuit.cz(QubitId(0), QubitId(1)).unwrap();

        assert!(matches!(
            pm.run(&mut circuit, &mut props),
            Err(CompileError::UnsupportedOperation { .. })
        ));
    }
}
