//! Fitness worker for the process pool.
//!
//! Reads newline-delimited `WorkItem`s on stdin and answers each with one
//! `WorkResponse` line on stdout until stdin is closed. Logs go to stderr.

use std::io::{self, BufWriter};
use std::process::ExitCode;

use hamlet_evolver::evaluation::worker;
use tracing::{debug, error, Level};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(Level::WARN)
        .init();

    let stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());

    match worker::serve(stdin, stdout) {
        Ok(batches) => {
            debug!(batches, "input closed, worker exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "worker stopped");
            ExitCode::FAILURE
        }
    }
}
