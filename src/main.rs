//! kata-grader: interactive exercise grading CLI.
//!
//! Grades quantum-operation submissions against a built-in exercise catalog:
//! the submission is compiled, the expected operation resolved, bound over
//! the exercise skeleton, and executed in a local simulator; pass/fail
//! diagnostics stream to stdout.
//!
//! ```text
//! $ kata-grader grade T101_StateFlip --code \
//!       'operation StateFlip (q : Qubit) : Unit { X(q); }'
//! Success!
//! ```

mod args;
mod runner;

use clap::Parser;

fn main() {
    let args = args::Args::parse();
    match runner::run(args) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(64);
        }
    }
}
