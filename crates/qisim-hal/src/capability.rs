//! Processor description.
//!
//! [`Capabilities`] describes what a processor accepts: register size,
//! native operations, qubit connectivity and shot limits. It is built from the
//! same parameter file as the calibration profile, so the executor validates
//! circuits against exactly the device the noise model describes.
//!
//! All edges in [`Topology`] are bidirectional: if `(a, b)` is present,
//! both `a → b` and `b → a` are valid two-qubit interactions.

use serde::{Deserialize, Serialize};
use tracing::debug;

use qisim_noise::BackendParameters;

use crate::error::{HalError, HalResult};

/// Operations that act on every qubit regardless of the native gate set.
pub const DIRECTIVES: &[&str] = &["measure", "reset", "barrier", "delay"];

/// Two-qubit operation names understood by the IR.
const TWO_QUBIT_OPERATIONS: &[&str] = &["cz", "cx", "swap"];

/// Hardware capabilities of a processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the processor.
    pub name: String,
    /// Number of qubits in the register.
    pub num_qubits: u32,
    /// Supported gate set.
    pub gate_set: GateSet,
    /// Qubit connectivity topology. All edges are bidirectional.
    pub topology: Topology,
    /// Shots used when none are requested.
    pub default_shots: u32,
    /// Maximum number of shots per run.
    pub max_shots: u32,
    /// Whether this is a simulator.
    pub is_simulator: bool,
}

impl Capabilities {
    /// An unconstrained simulator description.
    pub fn simulator(num_qubits: u32) -> Self {
        Self {
            name: "simulator".into(),
            num_qubits,
            gate_set: GateSet::universal(),
            topology: Topology::full(num_qubits),
            default_shots: 1024,
            max_shots: 1_000_000,
            is_simulator: true,
        }
    }

    /// Build the description of a calibrated processor.
    ///
    /// Fails if the coupling map references qubits outside the register or
    /// the shot limits are inconsistent.
    pub fn from_parameters(name: impl Into<String>, params: &BackendParameters) -> HalResult<Self> {
        let name = name.into();
        if params.qubit_register == 0 {
            return Err(HalError::Configuration(format!(
                "{name}: qubit register must not be empty"
            )));
        }
        if params.max_shots == 0 || params.default_shots > params.max_shots {
            return Err(HalError::Configuration(format!(
                "{name}: default shots {} must be at most max shots {} (> 0)",
                params.default_shots, params.max_shots
            )));
        }
        let mut edges = Vec::with_capacity(params.coupling_map.len());
        for &[a, b] in &params.coupling_map {
            if a == b || a >= params.qubit_register || b >= params.qubit_register {
                return Err(HalError::Configuration(format!(
                    "{name}: coupling ({a}, {b}) is invalid for a {}-qubit register",
                    params.qubit_register
                )));
            }
            edges.push((a, b));
        }
        debug!(
            "{name}: {} qubits, {} couplings, {} native operations",
            params.qubit_register,
            edges.len(),
            params.native_operations.len()
        );

        Ok(Self {
            name,
            num_qubits: params.qubit_register,
            gate_set: GateSet::from_native(&params.native_operations),
            topology: Topology::custom(edges),
            default_shots: params.default_shots,
            max_shots: params.max_shots,
            is_simulator: true,
        })
    }

    /// Override the topology.
    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Override the gate set.
    pub fn with_gate_set(mut self, gate_set: GateSet) -> Self {
        self.gate_set = gate_set;
        self
    }

    /// Override the shot limits.
    pub fn with_shots(mut self, default_shots: u32, max_shots: u32) -> Self {
        self.default_shots = default_shots;
        self.max_shots = max_shots;
        self
    }

    /// Whether `operation` may appear in a circuit for this processor.
    ///
    /// Directives are always accepted.
    pub fn accepts(&self, operation: &str) -> bool {
        DIRECTIVES.contains(&operation) || self.gate_set.contains(operation)
    }
}

/// Gate set supported by a processor.
///
/// Gate names are lowercase (`x`, `ry`, `cz`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateSet {
    /// Single-qubit gates supported.
    pub single_qubit: Vec<String>,
    /// Two-qubit gates supported.
    pub two_qubit: Vec<String>,
}

impl GateSet {
    /// Split a native operation list into gate classes, dropping directives.
    pub fn from_native(operations: &[String]) -> Self {
        let mut single_qubit = vec![];
        let mut two_qubit = vec![];
        for op in operations {
            let op = op.to_ascii_lowercase();
            if DIRECTIVES.contains(&op.as_str()) {
                continue;
            }
            let bucket = if TWO_QUBIT_OPERATIONS.contains(&op.as_str()) {
                &mut two_qubit
            } else {
                &mut single_qubit
            };
            if !bucket.contains(&op) {
                bucket.push(op);
            }
        }
        Self {
            single_qubit,
            two_qubit,
        }
    }

    /// Every gate the IR knows.
    pub fn universal() -> Self {
        Self {
            single_qubit: [
                "id", "x", "y", "z", "h", "s", "sdg", "t", "tdg", "sx", "rx", "ry", "rz",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            two_qubit: TWO_QUBIT_OPERATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Check if a gate is supported.
    pub fn contains(&self, gate: &str) -> bool {
        self.single_qubit.iter().any(|g| g == gate) || self.two_qubit.iter().any(|g| g == gate)
    }
}

/// Qubit connectivity topology.
///
/// All edges are bidirectional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    /// Kind of topology.
    pub kind: TopologyKind,
    /// Coupling edges. Bidirectional.
    pub edges: Vec<(u32, u32)>,
}

impl Topology {
    /// Create a linear topology.
    pub fn linear(n: u32) -> Self {
        let edges: Vec<_> = (0..n.saturating_sub(1)).map(|i| (i, i + 1)).collect();
        Self {
            kind: TopologyKind::Linear,
            edges,
        }
    }

    /// Create a star topology centred on qubit 0.
    pub fn star(n: u32) -> Self {
        let edges: Vec<_> = (1..n).map(|i| (0, i)).collect();
        Self {
            kind: TopologyKind::Star,
            edges,
        }
    }

    /// Create a fully connected topology.
    pub fn full(n: u32) -> Self {
        let mut edges = vec![];
        for i in 0..n {
            for j in (i + 1)..n {
                edges.push((i, j));
            }
        }
        Self {
            kind: TopologyKind::FullyConnected,
            edges,
        }
    }

    /// Create a custom topology from edges.
    pub fn custom(edges: Vec<(u32, u32)>) -> Self {
        Self {
            kind: TopologyKind::Custom,
            edges,
        }
    }

    /// Check if two qubits are connected.
    pub fn is_connected(&self, q1: u32, q2: u32) -> bool {
        self.edges
            .iter()
            .any(|&(a, b)| (a == q1 && b == q2) || (a == q2 && b == q1))
    }
}

/// Kind of qubit topology.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopologyKind {
    /// Fully connected (all-to-all).
    FullyConnected,
    /// Linear chain.
    Linear,
    /// Star topology (center connected to all).
    Star,
    /// Taken from a coupling map.
    Custom,
}
