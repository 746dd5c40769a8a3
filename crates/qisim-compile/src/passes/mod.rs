//! Built-in compilation passes.
//!
//! The executor runs them in this order:
//! [`TrivialLayout`], [`NativeGateCheck`], [`ConnectivityCheck`],
//! [`DelayExpansion`]. None of them inserts gates: a circuit that does not
//! already fit the target is rejected, never rewritten to fit.

mod connectivity;
mod delay;
mod layout;
mod native;

pub use connectivity::ConnectivityCheck;
pub use delay::{DelayExpansion, expand_delays};
pub use layout::TrivialLayout;
pub use native::{DIRECTIVES, NativeGateCheck};

use qisim_ir::Instruction;

/// Physical qubits of an instruction under the identity layout.
pub(crate) fn physical_qubits(instruction: &Instruction) -> Vec<u32> {
    instruction.qubits.iter().map(|q| q.0).collect()
}
