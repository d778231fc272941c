//! Kata Grader Engine
//!
//! Submission-resolution-and-execution pipeline for interactive exercise
//! grading: compile freeform submitted source into callables, resolve the
//! operation an exercise expects, bind it over the exercise skeleton, execute
//! the verification routine under a simulation backend, and stream
//! diagnostics to the caller's output channel.
//!
//! # Core Modules
//!
//! - [`grader`]: `GradingSession`, the per-submission orchestrator
//! - [`snippets`]: compilation gateway and the reference snippet compiler
//! - [`resolver`]: solution lookup against compiled state
//! - [`binder`]: skeleton → solution binding table
//! - [`dispatch`]: display preparation (plain vs. rich diagnostics)
//! - [`simulators`]: reference execution backends
//! - [`catalog`]: built-in exercises
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use kata_grader_engine::catalog;
//! use kata_grader_engine::channel::BufferChannel;
//! use kata_grader_engine::grader::GradingSession;
//! use kata_grader_engine::simulators::FullStateSimulator;
//!
//! let channel = Arc::new(BufferChannel::new());
//! let mut session = GradingSession::new(channel.clone());
//! let exercise = catalog::find_exercise("T101_StateFlip").unwrap();
//! let report = session
//!     .grade(
//!         &exercise,
//!         "operation StateFlip (q : Qubit) : Unit { X(q); }",
//!         Box::new(FullStateSimulator::new()),
//!     )
//!     .unwrap();
//! assert!(report.verdict.is_pass());
//! ```

pub mod backend;
pub mod binder;
pub mod catalog;
pub mod channel;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod grader;
pub mod resolver;
pub mod simulators;
pub mod snippets;

// Re-export main types at crate root for convenience
pub use backend::{BackendCapabilities, DiagnosticHook, ExecutionBackend};
pub use binder::BindingTable;
pub use channel::{BufferChannel, OutputChannel, StdoutChannel};
pub use config::{DisplayConfig, DumpStyle};
pub use errors::{CompileError, GradeError};
pub use grader::GradingSession;
pub use resolver::{CallableRegistry, Resolution};
pub use simulators::{FullStateSimulator, TraceSimulator};
pub use snippets::{CompiledUnit, SnippetCompiler, SnippetParser, SnippetStore};
