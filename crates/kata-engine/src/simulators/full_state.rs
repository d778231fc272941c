//! Full state-vector simulator.
//!
//! The default backend for grading runs. Rich-display-capable: alongside
//! plain messages it emits structured state dumps, so the execution
//! dispatcher swaps its native log hook for a rich renderer before running.

use anyhow::Result;
use kata_grader_types::{Diagnostic, Exercise, Verdict};
use tracing::debug;

use crate::backend::{BackendCapabilities, DiagnosticHook, ExecutionBackend};
use crate::binder::BindingTable;

use super::state::{verify, StateVector};
use super::{bound_operation, check_harness};

/// Rich-capable state-vector backend.
#[derive(Default)]
pub struct FullStateSimulator {
    hook: Option<DiagnosticHook>,
}

impl FullStateSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    fn emit(&self, diagnostic: Diagnostic) {
        if let Some(hook) = &self.hook {
            hook(&diagnostic);
        }
    }
}

impl ExecutionBackend for FullStateSimulator {
    fn name(&self) -> &'static str {
        "full-state"
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities { rich_display: true }
    }

    fn subscribe_diagnostics(&mut self, hook: DiagnosticHook) {
        self.hook = Some(hook);
    }

    fn unsubscribe_diagnostics(&mut self) {
        self.hook = None;
    }

    fn execute(&mut self, exercise: &Exercise, bindings: &BindingTable) -> Result<Verdict> {
        let op = bound_operation(exercise, bindings);
        check_harness(exercise, op)?;

        let qubits = exercise.expectation.qubit_count;
        let mut state = StateVector::new(qubits)?;
        self.emit(Diagnostic::Message(format!(
            "Allocated {qubits} qubit(s) in ∣0…0⟩"
        )));

        state.run(&exercise.prelude)?;
        self.emit(Diagnostic::Message(format!("Invoking {op}")));
        state.run(&op.body)?;
        state.run(&exercise.postlude)?;

        if exercise.dump_machine {
            self.emit(Diagnostic::StateDump(state.dump()));
        }

        let verdict = verify(&state, &exercise.expectation);
        debug!(exercise = %exercise.id, pass = verdict.is_pass(), "verification complete");
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use kata_grader_types::{OperationBody, OperationInfo};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn collect_hook() -> (DiagnosticHook, Arc<Mutex<Vec<Diagnostic>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let hook: DiagnosticHook = Arc::new(move |d| sink.lock().push(d.clone()));
        (hook, seen)
    }

    fn solution(name: &str, source_skeleton: &OperationInfo, body: OperationBody) -> OperationInfo {
        OperationInfo {
            name: name.to_string(),
            signature: source_skeleton.signature.clone(),
            body,
        }
    }

    #[test]
    fn unbound_skeleton_fails_verification() {
        let exercise = catalog::find_exercise("T101_StateFlip").expect("exercise");
        let mut backend = FullStateSimulator::new();
        let verdict = backend
            .execute(&exercise, &BindingTable::new())
            .expect("execution");
        assert!(!verdict.is_pass());
    }

    #[test]
    fn bound_solution_passes() {
        use kata_grader_types::{Gate, GateCall};
        use smallvec::smallvec;

        let exercise = catalog::find_exercise("T101_StateFlip").expect("exercise");
        let mut bindings = BindingTable::new();
        bindings.bind(
            &exercise.skeleton,
            solution(
                "StateFlip",
                &exercise.skeleton,
                OperationBody(vec![GateCall {
                    gate: Gate::X,
                    targets: smallvec![0],
                }]),
            ),
        );
        let mut backend = FullStateSimulator::new();
        let verdict = backend.execute(&exercise, &bindings).expect("execution");
        assert!(verdict.is_pass());
    }

    #[test]
    fn emits_dump_when_exercise_requests_it() {
        let exercise = catalog::find_exercise("T101_StateFlip").expect("exercise");
        assert!(exercise.dump_machine);

        let (hook, seen) = collect_hook();
        let mut backend = FullStateSimulator::new();
        backend.subscribe_diagnostics(hook);
        backend
            .execute(&exercise, &BindingTable::new())
            .expect("execution");
        let dumps = seen
            .lock()
            .iter()
            .filter(|d| matches!(d, Diagnostic::StateDump(_)))
            .count();
        assert_eq!(dumps, 1);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let mut backend = FullStateSimulator::new();
        backend.unsubscribe_diagnostics();
        let (hook, seen) = collect_hook();
        backend.subscribe_diagnostics(hook);
        backend.unsubscribe_diagnostics();
        backend.unsubscribe_diagnostics();

        let exercise = catalog::find_exercise("T101_StateFlip").expect("exercise");
        backend
            .execute(&exercise, &BindingTable::new())
            .expect("execution");
        assert!(seen.lock().is_empty());
    }
}
