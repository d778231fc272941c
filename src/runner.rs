//! Command dispatch for the kata-grader CLI.
//!
//! Exit codes distinguish the four grading outcomes, plus backend faults:
//! 0 success, 1 failing verdict, 2 compile error, 3 resolve error,
//! 4 backend fault. Usage and environment errors surface through `main` as
//! code 64.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use kata_grader_engine::catalog;
use kata_grader_engine::{
    DisplayConfig, ExecutionBackend, FullStateSimulator, GradeError, GradingSession,
    OutputChannel, StdoutChannel, TraceSimulator,
};
use kata_grader_types::{GradeOutcome, GradeReport};

use crate::args::{Args, BackendKind, Command};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_TEST_FAILED: i32 = 1;
pub const EXIT_COMPILE_ERROR: i32 = 2;
pub const EXIT_RESOLVE_ERROR: i32 = 3;
pub const EXIT_BACKEND_FAULT: i32 = 4;

/// Run the parsed command, returning the process exit code.
pub fn run(args: Args) -> Result<i32> {
    match args.command {
        Command::Grade {
            exercise,
            file,
            code,
            backend,
            display_config,
            emit_json,
        } => run_grade(exercise, file, code, backend, display_config, emit_json),
        Command::List => run_list(),
    }
}

fn run_grade(
    exercise_id: String,
    file: Option<PathBuf>,
    code: Option<String>,
    backend_kind: BackendKind,
    display_config: Option<PathBuf>,
    emit_json: Option<PathBuf>,
) -> Result<i32> {
    let exercise = catalog::find_exercise(&exercise_id)
        .ok_or_else(|| anyhow!("unknown exercise `{exercise_id}`; run `kata-grader list`"))?;
    let source = read_source(file, code)?;
    let config = DisplayConfig::load(display_config.as_deref())?;

    debug!(exercise = %exercise.id, backend = ?backend_kind, "grading submission");

    let channel: Arc<dyn OutputChannel> = Arc::new(StdoutChannel);
    let mut session = GradingSession::new(channel).with_display_config(config);
    let backend: Box<dyn ExecutionBackend> = match backend_kind {
        BackendKind::FullState => Box::new(FullStateSimulator::new()),
        BackendKind::Trace => Box::new(TraceSimulator::new()),
    };

    match session.grade(&exercise, &source, backend) {
        Ok(report) => {
            if let Some(path) = emit_json {
                write_report(&path, &report)?;
            }
            Ok(match report.outcome {
                GradeOutcome::Passed => EXIT_SUCCESS,
                GradeOutcome::TestFailed => EXIT_TEST_FAILED,
            })
        }
        Err(err) => {
            eprintln!("{err}");
            Ok(match err {
                GradeError::Compilation(_) => EXIT_COMPILE_ERROR,
                GradeError::SolutionNotFound { .. } => EXIT_RESOLVE_ERROR,
                GradeError::Backend { .. } => EXIT_BACKEND_FAULT,
            })
        }
    }
}

fn read_source(file: Option<PathBuf>, code: Option<String>) -> Result<String> {
    match (file, code) {
        (Some(path), None) => fs::read_to_string(&path)
            .with_context(|| format!("reading submission {}", path.display())),
        (None, Some(code)) => Ok(code),
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading submission from stdin")?;
            Ok(buf)
        }
        // clap's conflicts_with already rejects this; keep the guard for
        // programmatic callers.
        (Some(_), Some(_)) => Err(anyhow!("--file and --code are mutually exclusive")),
    }
}

fn write_report(path: &Path, report: &GradeReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("serializing grade report")?;
    fs::write(path, json).with_context(|| format!("writing grade report {}", path.display()))
}

fn run_list() -> Result<i32> {
    for exercise in catalog::builtin_exercises() {
        println!(
            "{:<18} {}  [solution operation: {}]",
            exercise.id, exercise.summary, exercise.solution_name
        );
    }
    Ok(EXIT_SUCCESS)
}
