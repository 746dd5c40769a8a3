//! qisim Compilation Framework
//!
//! Checks and rewrites applied to a circuit before it is sampled. Unlike a
//! general transpiler, nothing here changes the gates a circuit applies:
//! inserting a swap or decomposing a gate would change the noise the circuit
//! accumulates, so a circuit that does not fit the target is rejected.
//!
//! # Pipeline
//!
//! ```text
//! Input Circuit
//!       │
//!       ▼
//! ┌─────────────┐
//! │ PassManager │ ◄── PropertySet (coupling map, native operations, layout)
//! └─────────────┘
//!       │
//!       ├── TrivialLayout      (circuit qubit i on physical qubit i)
//!       ├── NativeGateCheck    (gates must be native)
//!       ├── ConnectivityCheck  (two-qubit gates on coupled pairs only)
//!       └── DelayExpansion     (delays split into unit steps)
//!       │
//!       ▼
//! Executable Circuit
//! ```
//!
//! # Example
//!
//! ```rust
//! use qisim_compile::{BasisGates, CouplingMap, PassManagerBuilder};
//! use qisim_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("idle", 2, 2);
//! circuit.x(QubitId(0))?.delay(QubitId(1), 3)?.cz(QubitId(0), QubitId(1))?;
//!
//! let (pm, mut props) = PassManagerBuilder::new()
//!     .with_target(CouplingMap::linear(2), BasisGates::new(["x", "cz"]))
//!     .build();
//! pm.run(&mut circuit, &mut props)?;
//!
//! assert_eq!(circuit.len(), 5);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod manager;
pub mod pass;
pub mod passes;
pub mod property;

pub use error::{CompileError, CompileResult};
pub use manager::{PassManager, PassManagerBuilder};
pub use pass::{Pass, PassKind};
pub use passes::{
    ConnectivityCheck, DIRECTIVES, DelayExpansion, NativeGateCheck, TrivialLayout, expand_delays,
};
pub use property::{BasisGates, CouplingMap, Layout, PropertySet};
