//! Grading orchestrator.
//!
//! `GradingSession` owns the per-session state (binding table, compiler,
//! registry, output channel) and drives one submission at a time through the
//! linear pipeline: compile → resolve → bind → prepare → execute → report.
//!
//! Compile and resolve failures terminate the attempt before any session
//! state is touched; a failing verification verdict is a normal completion
//! carrying a failing result.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use kata_grader_types::{Exercise, GradeOutcome, GradeReport, Verdict};
use tracing::{debug, info};
use uuid::Uuid;

use crate::backend::ExecutionBackend;
use crate::binder::BindingTable;
use crate::channel::OutputChannel;
use crate::config::DisplayConfig;
use crate::dispatch::prepare_display;
use crate::errors::GradeError;
use crate::resolver::{resolve_solution, CallableRegistry, Resolution};
use crate::snippets::{compile_snippet, SnippetCompiler, SnippetParser, SnippetStore};

/// Session-scoped grading state plus the collaborator handles the pipeline
/// calls into.
pub struct GradingSession {
    compiler: Box<dyn SnippetCompiler>,
    registry: Arc<dyn CallableRegistry>,
    channel: Arc<dyn OutputChannel>,
    config: DisplayConfig,
    bindings: BindingTable,
}

impl GradingSession {
    /// Create a session wired to the reference snippet compiler and an empty
    /// registry.
    pub fn new(channel: Arc<dyn OutputChannel>) -> Self {
        let store = Arc::new(SnippetStore::new());
        GradingSession {
            compiler: Box::new(SnippetParser::new(store.clone())),
            registry: store,
            channel,
            config: DisplayConfig::default(),
            bindings: BindingTable::new(),
        }
    }

    /// Replace the display configuration consumed during display preparation.
    pub fn with_display_config(mut self, config: DisplayConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom compiler/registry pair instead of the reference stack.
    pub fn with_snippet_service(
        mut self,
        compiler: Box<dyn SnippetCompiler>,
        registry: Arc<dyn CallableRegistry>,
    ) -> Self {
        self.compiler = compiler;
        self.registry = registry;
        self
    }

    /// The session's binding table.
    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    /// Grade one submission against `exercise` on the given backend.
    ///
    /// The backend handle is consumed: display preparation is one-shot and
    /// the prepared backend is not reusable across runs.
    pub fn grade(
        &mut self,
        exercise: &Exercise,
        source: &str,
        backend: Box<dyn ExecutionBackend>,
    ) -> Result<GradeReport, GradeError> {
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let started = Instant::now();
        let backend_name = backend.name();

        debug!(run_id = %run_id, exercise = %exercise.id, phase = "compiling", "grading submission");
        let unit = compile_snippet(self.compiler.as_mut(), &self.channel, source)
            .map_err(GradeError::Compilation)?;
        debug!(run_id = %run_id, declared = unit.callables.len(), phase = "resolving", "snippet compiled");

        let solution = match resolve_solution(self.registry.as_ref(), &exercise.solution_name) {
            Resolution::Found(op) => op,
            Resolution::NotFound => {
                return Err(GradeError::SolutionNotFound {
                    identifier: exercise.solution_name.clone(),
                });
            }
        };

        debug!(run_id = %run_id, phase = "binding", solution = %solution, "binding solution over skeleton");
        self.bindings.bind(&exercise.skeleton, solution);

        debug!(run_id = %run_id, phase = "preparing", backend = backend_name, "preparing display");
        let mut prepared = prepare_display(backend, &self.channel, &self.config);

        debug!(run_id = %run_id, phase = "executing", "running verification");
        let verdict = prepared
            .execute(exercise, &self.bindings)
            .map_err(|err| GradeError::Backend {
                message: format!("{err:#}"),
            })?;

        self.report_verdict(&verdict);
        let outcome = if verdict.is_pass() {
            GradeOutcome::Passed
        } else {
            GradeOutcome::TestFailed
        };
        info!(run_id = %run_id, exercise = %exercise.id, ?outcome, "grading complete");

        Ok(GradeReport {
            run_id,
            exercise: exercise.id.clone(),
            backend: backend_name.to_string(),
            outcome,
            verdict,
            started_at,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }

    fn report_verdict(&self, verdict: &Verdict) {
        match verdict {
            Verdict::Pass => self.channel.write_line("Success!"),
            Verdict::Fail {
                message,
                expected,
                actual,
            } => {
                self.channel.write_line(message);
                self.channel.write_line(&format!("Expected:\t{expected}"));
                self.channel.write_line(&format!("Actual:\t{actual}"));
                self.channel.write_line("Try again!");
            }
        }
    }
}
