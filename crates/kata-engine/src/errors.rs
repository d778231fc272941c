//! Error types for the grading pipeline.
//!
//! Compile and resolve failures terminate a grading attempt without mutating
//! session state; a failing verification verdict is *not* an error and never
//! appears here.

/// Structured compile failure reported by a snippet compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The snippet contains no operation declarations.
    NoDeclarations,
    /// A declaration header could not be parsed.
    MalformedDeclaration {
        /// What the parser was looking at when it gave up.
        detail: String,
    },
    /// Brace nesting never closes.
    UnbalancedBraces {
        /// Operation whose body is unterminated.
        operation: String,
    },
    /// A body statement is not a gate application of the form `Gate(args);`.
    MalformedStatement {
        /// The statement as written.
        statement: String,
        /// Operation containing the statement.
        operation: String,
    },
    /// A body statement names a gate outside the supported set.
    UnknownGate {
        /// The gate name as written.
        name: String,
        /// Operation containing the statement.
        operation: String,
    },
    /// A gate was applied to the wrong number of qubits.
    WrongArity {
        /// The gate name as written.
        gate: String,
        /// Operation containing the statement.
        operation: String,
        /// Arity the gate requires.
        expected: usize,
        /// Arguments actually supplied.
        got: usize,
    },
    /// A gate argument does not name a declared parameter.
    UnknownQubit {
        /// The argument as written.
        name: String,
        /// Operation containing the statement.
        operation: String,
    },
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::NoDeclarations => {
                write!(f, "no operation declarations found in snippet")
            }
            CompileError::MalformedDeclaration { detail } => {
                write!(f, "malformed operation declaration: {detail}")
            }
            CompileError::UnbalancedBraces { operation } => {
                write!(f, "unterminated body for operation `{operation}`")
            }
            CompileError::MalformedStatement {
                statement,
                operation,
            } => {
                write!(
                    f,
                    "malformed statement `{statement}` in operation `{operation}`"
                )
            }
            CompileError::UnknownGate { name, operation } => {
                write!(f, "unknown gate `{name}` in operation `{operation}`")
            }
            CompileError::WrongArity {
                gate,
                operation,
                expected,
                got,
            } => {
                write!(
                    f,
                    "gate `{gate}` in operation `{operation}` takes {expected} qubit(s), got {got}"
                )
            }
            CompileError::UnknownQubit { name, operation } => {
                write!(
                    f,
                    "`{name}` in operation `{operation}` does not name a declared qubit"
                )
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// Why a grading attempt could not run to completion.
#[derive(Debug)]
pub enum GradeError {
    /// The submission did not compile. Carries the compiler's diagnostic
    /// unchanged.
    Compilation(CompileError),
    /// The expected solution identifier did not resolve to any compiled
    /// callable. A miss is a lookup against already-compiled state, never a
    /// transient failure, so there is no retry.
    SolutionNotFound {
        /// The identifier the exercise expected the submission to declare.
        identifier: String,
    },
    /// The backend faulted during execution. Fatal for the attempt.
    Backend {
        /// Backend-reported failure detail.
        message: String,
    },
}

impl std::fmt::Display for GradeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GradeError::Compilation(err) => write!(f, "compilation failed: {err}"),
            GradeError::SolutionNotFound { identifier } => {
                write!(f, "solution not found for `{identifier}`")
            }
            GradeError::Backend { message } => write!(f, "execution backend fault: {message}"),
        }
    }
}

impl std::error::Error for GradeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GradeError::Compilation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CompileError> for GradeError {
    fn from(err: CompileError) -> Self {
        GradeError::Compilation(err)
    }
}
