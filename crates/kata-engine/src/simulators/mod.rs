//! Reference execution backends.
//!
//! Two backends over a shared state-vector core:
//!
//! - [`FullStateSimulator`] — rich-display-capable; emits messages and, when
//!   an exercise asks for it, a structured state dump.
//! - [`TraceSimulator`] — generic; emits one plain line per gate applied.

pub mod full_state;
pub mod state;
pub mod trace;

pub use full_state::FullStateSimulator;
pub use state::{verify, StateVector, PROBABILITY_TOLERANCE};
pub use trace::TraceSimulator;

use anyhow::{anyhow, Result};
use kata_grader_types::{Exercise, OperationInfo};

use crate::binder::BindingTable;

/// The operation the harness will actually run: the bound solution when a
/// submission is live, otherwise the exercise's placeholder skeleton.
pub(crate) fn bound_operation<'a>(
    exercise: &'a Exercise,
    bindings: &'a BindingTable,
) -> &'a OperationInfo {
    bindings
        .active(&exercise.skeleton.name)
        .unwrap_or(&exercise.skeleton)
}

/// Backend-fault checks shared by the reference backends: the expectation
/// must cover the whole register, and the operation must fit in it.
pub(crate) fn check_harness(exercise: &Exercise, op: &OperationInfo) -> Result<()> {
    let register = exercise.expectation.qubit_count;
    let states = 1usize << register;
    if exercise.expectation.basis_probabilities.len() != states {
        return Err(anyhow!(
            "exercise `{}` expects {} basis probabilities for a {register}-qubit register, found {}",
            exercise.id,
            states,
            exercise.expectation.basis_probabilities.len()
        ));
    }
    if op.signature.qubit_count() > register {
        return Err(anyhow!(
            "operation `{}` expects {} qubit(s) but the register holds {register}",
            op.name,
            op.signature.qubit_count()
        ));
    }
    Ok(())
}
