//! Shared types for the kata-grader workspace.
//!
//! This crate contains the data model passed between the grading engine and
//! its callers: operation handles, gate programs, exercise definitions,
//! diagnostics, verdicts, and grade reports.

use chrono::{DateTime, Utc};
use smallvec::SmallVec;

// ============================================================================
// Gate Programs
// ============================================================================

/// Maximum register width supported by the reference simulators.
pub const MAX_QUBITS: u8 = 8;

/// A primitive gate in the snippet language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Identity (no-op).
    I,
    /// Pauli X (bit flip).
    X,
    /// Pauli Z (sign flip).
    Z,
    /// Hadamard (basis change).
    H,
    /// Controlled-NOT; first target is the control.
    Cnot,
}

impl Gate {
    /// Number of qubit arguments the gate takes.
    pub fn arity(&self) -> usize {
        match self {
            Gate::I | Gate::X | Gate::Z | Gate::H => 1,
            Gate::Cnot => 2,
        }
    }

    /// Parse a gate name as written in snippet source.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "I" => Some(Gate::I),
            "X" => Some(Gate::X),
            "Z" => Some(Gate::Z),
            "H" => Some(Gate::H),
            "CNOT" => Some(Gate::Cnot),
            _ => None,
        }
    }
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Gate::I => "I",
            Gate::X => "X",
            Gate::Z => "Z",
            Gate::H => "H",
            Gate::Cnot => "CNOT",
        };
        write!(f, "{name}")
    }
}

/// One gate application inside an operation body.
///
/// Targets are qubit indices into the operation's parameter list, resolved at
/// compile time. Most gates touch one or two qubits, hence the inline size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateCall {
    /// The gate to apply.
    pub gate: Gate,
    /// Parameter indices the gate acts on (control first for CNOT).
    pub targets: SmallVec<[u8; 2]>,
}

/// The compiled body of an operation: gates in source order.
///
/// An empty body is valid; exercise skeletons are empty placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationBody(pub Vec<GateCall>);

impl OperationBody {
    /// Whether the body contains no gates.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Operation Handles
// ============================================================================

/// Printable signature of a declared operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSignature {
    /// Parameter names in declaration order; each names one qubit.
    pub params: Vec<String>,
}

impl OperationSignature {
    /// Register width the operation expects.
    pub fn qubit_count(&self) -> u8 {
        self.params.len() as u8
    }
}

impl std::fmt::Display for OperationSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{p} : Qubit")?;
        }
        write!(f, ") : Unit")
    }
}

/// Handle to a compiled, executable operation.
///
/// The grading pipeline holds and passes these without looking inside; only
/// an execution backend interprets the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationInfo {
    /// Declared operation name.
    pub name: String,
    /// Declared signature.
    pub signature: OperationSignature,
    /// Compiled gate program.
    pub body: OperationBody,
}

impl OperationInfo {
    /// A placeholder operation with an empty body, used as an exercise
    /// skeleton until a submission is bound over it.
    pub fn placeholder(name: &str, params: &[&str]) -> Self {
        OperationInfo {
            name: name.to_string(),
            signature: OperationSignature {
                params: params.iter().map(|p| p.to_string()).collect(),
            },
            body: OperationBody::default(),
        }
    }
}

impl std::fmt::Display for OperationInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.signature)
    }
}

// ============================================================================
// Exercises
// ============================================================================

/// Expected register state after running a submission, expressed as
/// probabilities over the computational basis.
#[derive(Debug, Clone, PartialEq)]
pub struct StateExpectation {
    /// Register width the verification routine allocates.
    pub qubit_count: u8,
    /// Expected probability per basis state; length is `2^qubit_count`.
    pub basis_probabilities: Vec<f64>,
}

/// One graded exercise: the skeleton the harness calls, the identifier a
/// submission must declare, and the verification routine.
#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    /// Stable exercise id, e.g. `T101_StateFlip`. Doubles as the skeleton id
    /// in the binding table.
    pub id: String,
    /// The placeholder operation the harness invokes.
    pub skeleton: OperationInfo,
    /// Operation name a submission must declare to solve this exercise.
    pub solution_name: String,
    /// One-line description shown in catalog listings.
    pub summary: String,
    /// Gates the harness applies before invoking the skeleton (state
    /// preparation).
    pub prelude: OperationBody,
    /// Gates the harness applies after the skeleton returns (basis rotation
    /// ahead of the state check).
    pub postlude: OperationBody,
    /// Post-run state check.
    pub expectation: StateExpectation,
    /// Ask the backend to emit a state dump diagnostic after the run.
    pub dump_machine: bool,
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Snapshot of the simulator register, emitted as a diagnostic when an
/// exercise requests a dump.
#[derive(Debug, Clone, PartialEq)]
pub struct StateDump {
    /// Register width.
    pub qubit_count: u8,
    /// Real amplitude per basis state; length is `2^qubit_count`.
    pub amplitudes: Vec<f64>,
}

/// One diagnostic event produced by an execution backend.
///
/// Plain log hooks render every variant as text; a rich display decorator
/// renders `StateDump` with structured formatting instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Free-form log line.
    Message(String),
    /// Structured register snapshot.
    StateDump(StateDump),
}

// ============================================================================
// Verdicts and Reports
// ============================================================================

/// Outcome of running an exercise's verification routine.
///
/// A failing verdict is a normal, completed grading run; it is never an
/// error.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Verdict {
    /// The submission produced the expected state.
    Pass,
    /// The submission ran to completion but produced a wrong state.
    Fail {
        /// What went wrong, in learner-facing terms.
        message: String,
        /// Expected probability at the first mismatching basis state.
        expected: f64,
        /// Observed probability at that basis state.
        actual: f64,
    },
}

impl Verdict {
    /// Whether this verdict is a pass.
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

/// Terminal outcome code for a completed grading run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GradeOutcome {
    /// Verification passed.
    Passed,
    /// Verification completed with a failing verdict.
    TestFailed,
}

/// Result of one completed grading run.
///
/// Produced only when the pipeline reaches execution; compile and resolve
/// failures surface as errors instead.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GradeReport {
    /// Unique id for correlating log lines with this run.
    pub run_id: String,
    /// Exercise that was graded.
    pub exercise: String,
    /// Backend that executed the verification routine.
    pub backend: String,
    /// Terminal outcome code.
    pub outcome: GradeOutcome,
    /// The verdict, including failure detail when present.
    pub verdict: Verdict,
    /// When the grading run started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the run in milliseconds.
    pub elapsed_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_arity_matches_targets() {
        assert_eq!(Gate::X.arity(), 1);
        assert_eq!(Gate::Cnot.arity(), 2);
    }

    #[test]
    fn gate_parse_round_trips_display() {
        for name in ["I", "X", "Z", "H", "CNOT"] {
            let gate = Gate::parse(name).expect("known gate");
            assert_eq!(gate.to_string(), name);
        }
        assert!(Gate::parse("Y").is_none());
    }

    #[test]
    fn placeholder_has_empty_body() {
        let op = OperationInfo::placeholder("T101_StateFlip", &["q"]);
        assert!(op.body.is_empty());
        assert_eq!(op.signature.qubit_count(), 1);
        assert_eq!(op.to_string(), "T101_StateFlip (q : Qubit) : Unit");
    }

    #[test]
    fn failing_verdict_is_not_pass() {
        let verdict = Verdict::Fail {
            message: "register in invalid state".to_string(),
            expected: 0.0,
            actual: 0.5,
        };
        assert!(!verdict.is_pass());
    }
}
