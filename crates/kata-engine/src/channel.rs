//! Output channel adapter.
//!
//! The channel is the single delivery point for everything a grading run
//! tells the caller: compiler warnings, backend diagnostics, and the final
//! verdict text. Producers hold it as `Arc<dyn OutputChannel>`; it must be
//! safe to write from any of them multiple times per submission.

use kata_grader_types::{Diagnostic, StateDump};
use parking_lot::Mutex;

/// Line-oriented sink for everything the pipeline reports to the caller.
pub trait OutputChannel: Send + Sync {
    /// Deliver one line to the interactive surface.
    fn write_line(&self, line: &str);
}

/// Channel that prints to standard output.
#[derive(Debug, Default)]
pub struct StdoutChannel;

impl OutputChannel for StdoutChannel {
    fn write_line(&self, line: &str) {
        println!("{line}");
    }
}

/// Channel that collects lines in memory. Used by tests and embedders that
/// post-process output.
#[derive(Debug, Default)]
pub struct BufferChannel {
    lines: Mutex<Vec<String>>,
}

impl BufferChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far, in delivery order.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Number of delivered lines matching `pattern` as a substring.
    pub fn count_matching(&self, pattern: &str) -> usize {
        self.lines
            .lock()
            .iter()
            .filter(|l| l.contains(pattern))
            .count()
    }
}

impl OutputChannel for BufferChannel {
    fn write_line(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}

/// Render a diagnostic as plain text lines.
///
/// This is the rendering used by a backend's native log hook; rich display
/// replaces it for state dumps but forwards plain messages untouched.
pub fn plain_lines(diagnostic: &Diagnostic) -> Vec<String> {
    match diagnostic {
        Diagnostic::Message(text) => vec![text.clone()],
        Diagnostic::StateDump(dump) => plain_dump_lines(dump),
    }
}

fn plain_dump_lines(dump: &StateDump) -> Vec<String> {
    let width = dump.qubit_count as usize;
    dump.amplitudes
        .iter()
        .enumerate()
        .map(|(basis, amp)| format!("|{}⟩: {amp:.4}", basis_label(basis, width)))
        .collect()
}

/// Bitstring label for a basis state, qubit 0 leftmost.
pub fn basis_label(basis: usize, qubit_count: usize) -> String {
    (0..qubit_count)
        .map(|q| if basis >> q & 1 == 1 { '1' } else { '0' })
        .collect()
}
