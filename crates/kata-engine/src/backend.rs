//! Execution backend seam.
//!
//! A backend executes an exercise's verification routine against the solution
//! currently bound over the exercise skeleton. Backends own a single
//! diagnostic hook slot; hook state is instance-scoped, so preparing one
//! backend's display never alters another's.

use std::sync::Arc;

use anyhow::Result;
use kata_grader_types::Diagnostic;
use kata_grader_types::{Exercise, Verdict};

use crate::binder::BindingTable;

/// Receiver for backend diagnostics.
pub type DiagnosticHook = Arc<dyn Fn(&Diagnostic) + Send + Sync>;

/// What a backend supports beyond plain execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendCapabilities {
    /// The backend emits structured state dumps that an interactive surface
    /// can render richly.
    pub rich_display: bool,
}

/// A stateful simulation handle used to execute one grading run.
pub trait ExecutionBackend {
    /// Stable backend name for reports and logs.
    fn name(&self) -> &'static str;

    /// Capability flags consulted by the execution dispatcher.
    fn capabilities(&self) -> BackendCapabilities;

    /// Attach the diagnostic hook, replacing any previous subscription.
    /// At most one hook is live per backend instance.
    fn subscribe_diagnostics(&mut self, hook: DiagnosticHook);

    /// Detach the current hook. Safe to call when none is attached.
    fn unsubscribe_diagnostics(&mut self);

    /// Run the exercise's verification routine with the bound solution.
    ///
    /// A wrong final state is a failing [`Verdict`], not an error; `Err` is
    /// reserved for backend faults, which are fatal for the attempt.
    fn execute(&mut self, exercise: &Exercise, bindings: &BindingTable) -> Result<Verdict>;
}
