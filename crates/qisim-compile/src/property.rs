//! Property set for passing information between passes.
//!
//! The [`PropertySet`] carries the target description (coupling map and
//! native operations) into the passes and collects what they compute
//! (the qubit layout).
//!
//! ```rust
//! use qisim_compile::{BasisGates, CouplingMap, PropertySet};
//!
//! let props = PropertySet::new()
//!     .with_target(CouplingMap::from_edges(3, [(0, 2), (1, 2)]), BasisGates::new(["ry", "cz"]));
//!
//! let cm = props.coupling_map.as_ref().unwrap();
//! assert!(cm.is_connected(2, 1));
//! assert!(!cm.is_connected(0, 1));
//! ```

use petgraph::graphmap::UnGraphMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use qisim_ir::QubitId;

/// A mapping from circuit qubits to physical qubits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    logical_to_physical: FxHashMap<QubitId, u32>,
    physical_to_logical: FxHashMap<u32, QubitId>,
}

impl Layout {
    /// Create a new empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a trivial layout (circuit qubit i -> physical qubit i).
    pub fn trivial(num_qubits: u32) -> Self {
        let mut layout = Self::new();
        for i in 0..num_qubits {
            layout.add(QubitId(i), i);
        }
        layout
    }

    /// Add a mapping, replacing any mapping either side already had.
    pub fn add(&mut self, logical: QubitId, physical: u32) {
        if let Some(old_logical) = self.physical_to_logical.remove(&physical) {
            self.logical_to_physical.remove(&old_logical);
        }
        if let Some(old_physical) = self.logical_to_physical.remove(&logical) {
            self.physical_to_logical.remove(&old_physical);
        }
        self.logical_to_physical.insert(logical, physical);
        self.physical_to_logical.insert(physical, logical);
    }

    /// Get the physical qubit for a circuit qubit.
    pub fn get_physical(&self, logical: QubitId) -> Option<u32> {
        self.logical_to_physical.get(&logical).copied()
    }

    /// Get the circuit qubit placed on a physical qubit.
    pub fn get_logical(&self, physical: u32) -> Option<QubitId> {
        self.physical_to_logical.get(&physical).copied()
    }

    /// Number of mapped qubits.
    pub fn len(&self) -> usize {
        self.logical_to_physical.len()
    }

    /// Whether nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.logical_to_physical.is_empty()
    }
}

/// Undirected qubit connectivity of the target.
#[derive(Debug, Clone)]
pub struct CouplingMap {
    graph: UnGraphMap<u32, ()>,
    num_qubits: u32,
}

impl CouplingMap {
    /// A register of `num_qubits` with no couplings.
    pub fn new(num_qubits: u32) -> Self {
        let mut graph = UnGraphMap::with_capacity(num_qubits as usize, 0);
        for q in 0..num_qubits {
            graph.add_node(q);
        }
        Self { graph, num_qubits }
    }

    /// Build from a list of couplings.
    pub fn from_edges(num_qubits: u32, edges: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let mut map = Self::new(num_qubits);
        for (a, b) in edges {
            map.add_edge(a, b);
        }
        map
    }

    /// Every pair coupled.
    pub fn full(num_qubits: u32) -> Self {
        let edges = (0..num_qubits).flat_map(|i| ((i + 1)..num_qubits).map(move |j| (i, j)));
        Self::from_edges(num_qubits, edges)
    }

    /// Nearest-neighbour chain.
    pub fn linear(num_qubits: u32) -> Self {
        Self::from_edges(num_qubits, (1..num_qubits).map(|i| (i - 1, i)))
    }

    /// Add a bidirectional coupling.
    pub fn add_edge(&mut self, q1: u32, q2: u32) {
        self.graph.add_edge(q1, q2, ());
        self.num_qubits = self.num_qubits.max(q1.max(q2) + 1);
    }

    /// Whether a two-qubit interaction between `q1` and `q2` is allowed.
    pub fn is_connected(&self, q1: u32, q2: u32) -> bool {
        self.graph.contains_edge(q1, q2)
    }

    /// Number of physical qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Couplings in insertion order.
    pub fn edges(&self) -> Vec<(u32, u32)> {
        self.graph.all_edges().map(|(a, b, _)| (a, b)).collect()
    }

    /// Qubits coupled to `qubit`.
    pub fn neighbors(&self, qubit: u32) -> impl Iterator<Item = u32> + '_ {
        self.graph.neighbors(qubit)
    }
}

/// Operation names the target executes natively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasisGates {
    gates: Vec<String>,
}

impl BasisGates {
    /// Create a basis from operation names. Names are lowercased.
    pub fn new(gates: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            gates: gates
                .into_iter()
                .map(|g| g.into().to_ascii_lowercase())
                .collect(),
        }
    }

    /// Check if an operation is in the basis.
    pub fn contains(&self, gate: &str) -> bool {
        self.gates.iter().any(|g| g == gate)
    }

    /// Get the operation names.
    pub fn gates(&self) -> &[String] {
        &self.gates
    }
}

/// Properties shared between passes.
#[derive(Debug, Default)]
pub struct PropertySet {
    /// Circuit-to-physical qubit mapping, set by the layout pass.
    pub layout: Option<Layout>,

    /// Target coupling map.
    pub coupling_map: Option<CouplingMap>,

    /// Target native operations.
    pub basis_gates: Option<BasisGates>,
}

impl PropertySet {
    /// Create a new empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a property set with target configuration.
    #[must_use]
    pub fn with_target(mut self, coupling_map: CouplingMap, basis_gates: BasisGates) -> Self {
        self.coupling_map = Some(coupling_map);
        self.basis_gates = Some(basis_gates);
        self
    }

    /// Set the layout.
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_trivial() {
        let layout = Layout::trivial(3);
        assert_eq!(layout.get_physical(QubitId(2)), Some(2));
        assert_eq!(layout.get_logical(1), Some(QubitId(1)));
        assert_eq!(layout.len(), 3);
    }

    #[test]
    fn test_layout_add_replaces() {
        let mut layout = Layout::trivial(2);
        layout.add(QubitId(0), 1);
        assert_eq!(layout.get_physical(QubitId(0)), Some(1));
        assert_eq!(layout.get_physical(QubitId(1)), None);
        assert_eq!(layout.get_logical(0), None);
    }

    #[test]
    fn test_coupling_map() {
        let cm = CouplingMap::from_edges(3, [(0, 2), (1, 2)]);
        assert!(cm.is_connected(0, 2));
        assert!(cm.is_connected(2, 0));
        assert!(!cm.is_connected(0, 1));
        assert_eq!(cm.num_qubits(), 3);
        assert_eq!(cm.edges().len(), 2);

        let mut neighbors: Vec<u32> = cm.neighbors(2).collect();
        neighbors.sort_unstable();
        assert_eq!(neighbors, vec![0, 1]);
    }

    #[test]
    fn test_preset_maps() {
        assert_eq!(CouplingMap::full(4).edges().len(), 6);
        assert!(CouplingMap::linear(4).is_connected(3, 2));
        assert!(!CouplingMap::linear(4).is_connected(0, 3));
    }

    #[test]
    fn test_basis_gates_lowercase() {
        let basis = BasisGates::new(["RY", "cz"]);
        assert!(basis.contains("ry"));
        assert!(!basis.contains("h"));
    }
}
