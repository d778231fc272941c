//! Execution dispatcher.
//!
//! One-shot display preparation for an execution backend. Step 1 applies the
//! universal setup every backend gets: its native diagnostic hook is
//! subscribed to the output channel, rendering every diagnostic as plain
//! text. Step 2 tests the backend's capabilities and picks a
//! [`DisplayPolicy`]:
//!
//! - **Rich-capable backends** have the native hook detached *first*, then a
//!   rich-rendering hook attached and the backend wrapped in a decorator.
//!   Detach-before-decorate is the ordering invariant here: with both hooks
//!   live, every diagnostic line would reach the channel twice.
//! - **Generic backends** are returned unchanged, native hook still wired
//!   straight to the channel.
//!
//! Preparation runs once per execution request; it is not resumable or
//! reentrant on the same handle.

use std::sync::Arc;

use anyhow::Result;
use kata_grader_types::{Diagnostic, Exercise, StateDump, Verdict};
use tracing::debug;

use crate::backend::{BackendCapabilities, DiagnosticHook, ExecutionBackend};
use crate::binder::BindingTable;
use crate::channel::{basis_label, plain_lines, OutputChannel};
use crate::config::{DisplayConfig, DumpStyle};

/// Capability-selected decoration step.
pub trait DisplayPolicy {
    /// Return a display-ready backend, possibly wrapped in a decorator.
    fn decorate(
        &self,
        backend: Box<dyn ExecutionBackend>,
        channel: &Arc<dyn OutputChannel>,
        config: &DisplayConfig,
    ) -> Box<dyn ExecutionBackend>;
}

/// No-op policy for generic backends.
pub struct PlainDisplay;

impl DisplayPolicy for PlainDisplay {
    fn decorate(
        &self,
        backend: Box<dyn ExecutionBackend>,
        _channel: &Arc<dyn OutputChannel>,
        _config: &DisplayConfig,
    ) -> Box<dyn ExecutionBackend> {
        backend
    }
}

/// Rich-rendering policy for backends that support it.
pub struct RichDisplay;

impl DisplayPolicy for RichDisplay {
    fn decorate(
        &self,
        mut backend: Box<dyn ExecutionBackend>,
        channel: &Arc<dyn OutputChannel>,
        config: &DisplayConfig,
    ) -> Box<dyn ExecutionBackend> {
        // Detach the native hook before attaching the rich renderer; the
        // other order would leave a window where both deliver.
        backend.unsubscribe_diagnostics();
        backend.subscribe_diagnostics(rich_hook(channel.clone(), config.clone()));
        debug!(backend = backend.name(), "decorated backend with rich display");
        Box::new(RichDisplayBackend { inner: backend })
    }
}

/// Prepare a backend for execution: universal hook setup, then
/// capability-selected decoration.
pub fn prepare_display(
    mut backend: Box<dyn ExecutionBackend>,
    channel: &Arc<dyn OutputChannel>,
    config: &DisplayConfig,
) -> Box<dyn ExecutionBackend> {
    backend.subscribe_diagnostics(plain_hook(channel.clone()));
    debug!(backend = backend.name(), "subscribed native log hook");

    let policy: &dyn DisplayPolicy = if backend.capabilities().rich_display {
        &RichDisplay
    } else {
        &PlainDisplay
    };
    policy.decorate(backend, channel, config)
}

/// Hook that renders every diagnostic as plain text lines.
pub fn plain_hook(channel: Arc<dyn OutputChannel>) -> DiagnosticHook {
    Arc::new(move |diagnostic| {
        for line in plain_lines(diagnostic) {
            channel.write_line(&line);
        }
    })
}

/// Hook that renders state dumps richly and forwards messages untouched.
fn rich_hook(channel: Arc<dyn OutputChannel>, config: DisplayConfig) -> DiagnosticHook {
    Arc::new(move |diagnostic| match diagnostic {
        Diagnostic::Message(text) => channel.write_line(text),
        Diagnostic::StateDump(dump) => {
            for line in rich_dump_lines(dump, &config) {
                channel.write_line(&line);
            }
        }
    })
}

/// Render a state dump with the configured style, precision, and truncation.
fn rich_dump_lines(dump: &StateDump, config: &DisplayConfig) -> Vec<String> {
    let width = dump.qubit_count as usize;
    let precision = config.precision;
    let total = dump.amplitudes.len();
    let shown = total.min(config.truncate_after.max(1));

    let mut lines = Vec::with_capacity(shown + 2);
    let header = match config.dump_style {
        DumpStyle::Amplitudes => format!("Register state ({width} qubit(s), amplitudes):"),
        DumpStyle::Probabilities => format!("Register state ({width} qubit(s), probabilities):"),
    };
    lines.push(header);
    for (basis, amp) in dump.amplitudes.iter().take(shown).enumerate() {
        let label = basis_label(basis, width);
        let line = match config.dump_style {
            DumpStyle::Amplitudes => format!("  ∣{label}⟩  {amp:+.precision$}"),
            DumpStyle::Probabilities => {
                let p = amp * amp;
                format!("  ∣{label}⟩  {p:.precision$}")
            }
        };
        lines.push(line);
    }
    if shown < total {
        lines.push(format!("  … {} more basis state(s)", total - shown));
    }
    lines
}

/// Decorator marking a backend whose diagnostics render richly.
///
/// All behavior is delegated; the rich hook was installed on the inner
/// backend during decoration.
struct RichDisplayBackend {
    inner: Box<dyn ExecutionBackend>,
}

impl ExecutionBackend for RichDisplayBackend {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn capabilities(&self) -> BackendCapabilities {
        self.inner.capabilities()
    }

    fn subscribe_diagnostics(&mut self, hook: DiagnosticHook) {
        self.inner.subscribe_diagnostics(hook);
    }

    fn unsubscribe_diagnostics(&mut self) {
        self.inner.unsubscribe_diagnostics();
    }

    fn execute(&mut self, exercise: &Exercise, bindings: &BindingTable) -> Result<Verdict> {
        self.inner.execute(exercise, bindings)
    }
}
