//! Gate-trace simulator.
//!
//! Generic backend: no rich display, so its native log hook stays wired
//! straight to the output channel. Emits one plain line per gate applied,
//! harness gates included. Ignores dump requests; it has no structured
//! diagnostic channel.

use anyhow::Result;
use kata_grader_types::{Diagnostic, Exercise, Gate, OperationBody, Verdict};

use crate::backend::{BackendCapabilities, DiagnosticHook, ExecutionBackend};
use crate::binder::BindingTable;

use super::state::{verify, StateVector};
use super::{bound_operation, check_harness};

/// Generic tracing backend.
#[derive(Default)]
pub struct TraceSimulator {
    hook: Option<DiagnosticHook>,
}

impl TraceSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    fn emit(&self, text: String) {
        if let Some(hook) = &self.hook {
            hook(&Diagnostic::Message(text));
        }
    }

    fn run_traced(&self, state: &mut StateVector, body: &OperationBody) -> Result<()> {
        for call in &body.0 {
            state.apply(call.gate, &call.targets)?;
            self.emit(trace_line(call.gate, &call.targets));
        }
        Ok(())
    }
}

fn trace_line(gate: Gate, targets: &[u8]) -> String {
    let mut args = String::new();
    for (i, t) in targets.iter().enumerate() {
        if i > 0 {
            args.push_str(", ");
        }
        args.push('q');
        args.push_str(&t.to_string());
    }
    format!("Applied {gate} on {args}")
}

impl ExecutionBackend for TraceSimulator {
    fn name(&self) -> &'static str {
        "trace"
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            rich_display: false,
        }
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

        let mut state = StateVector::new(exercise.expectation.qubit_count)?;
        self.run_traced(&mut state, &exercise.prelude)?;
        self.run_traced(&mut state, &op.body)?;
        self.run_traced(&mut state, &exercise.postlude)?;

        Ok(verify(&state, &exercise.expectation))
    }
}
