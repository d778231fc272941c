//! Command-line arguments for the kata-grader CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Simulation backend selector.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Default)]
pub enum BackendKind {
    /// Full state-vector simulator with rich state dumps.
    #[default]
    FullState,
    /// Gate-trace simulator; plain text, one line per gate.
    Trace,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Grade a submission against one exercise and report the verdict.
    Grade {
        /// Exercise id, e.g. `T101_StateFlip`. See `kata-grader list`.
        exercise: String,

        /// Read the submission from a file. Defaults to stdin when neither
        /// `--file` nor `--code` is given.
        #[arg(long, value_name = "PATH", conflicts_with = "code")]
        file: Option<PathBuf>,

        /// Pass the submission inline.
        #[arg(long, value_name = "SOURCE")]
        code: Option<String>,

        /// Simulation backend to execute the verification on.
        #[arg(long, value_enum, default_value_t = BackendKind::FullState)]
        backend: BackendKind,

        /// Display configuration file (JSON). Defaults to the per-user
        /// config location; missing file means defaults.
        #[arg(long, value_name = "PATH")]
        display_config: Option<PathBuf>,

        /// Write the grade report as JSON to this path.
        #[arg(long, value_name = "PATH")]
        emit_json: Option<PathBuf>,
    },
    /// List the built-in exercise catalog.
    List,
}
