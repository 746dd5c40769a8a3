//! qisim Circuit Representation
//!
//! This crate provides the circuit data structures shared by the noise model,
//! the compilation passes, the simulator backend and the readout tools.
//!
//! # Overview
//!
//! A [`Circuit`] is an ordered list of [`Instruction`]s over numbered qubits
//! and classical bits. Order is significant: noise channels are attached per
//! instruction in program order, so the representation stays a flat sequence
//! rather than a dependency graph.
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use qisim_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell_state", 2, 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cz(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.len(), 4);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `I` | 1 | Identity |
//! | `X`, `Y`, `Z` | 1 | Pauli gates |
//! | `H` | 1 | Hadamard gate |
//! | `S`, `Sdg`, `T`, `Tdg`, `SX` | 1 | Phase and root gates |
//! | `Rx`, `Ry`, `Rz` | 1 | Rotation gates (bound angles) |
//! | `CX`, `CZ` | 2 | Controlled gates |
//! | `Swap` | 2 | SWAP gate |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{ClbitId, QubitId};
