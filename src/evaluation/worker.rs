//! # Process Worker Protocol
//!
//! Work crosses the process boundary as newline-delimited JSON. The parent
//! writes one [`WorkItem`] per line to the worker's stdin; the worker answers
//! each with exactly one [`WorkResponse`] line on stdout.
//!
//! Workers report integer match counts rather than floating-point scores. The
//! parent converts them with [`fitness_from_matches`](crate::fitness::fitness_from_matches),
//! the same formula every other strategy uses.
//!
//! ```rust
//! use hamlet_evolver::evaluation::worker::{serve, WorkItem, WorkResponse};
//!
//! let item = WorkItem {
//!     batch: 0,
//!     target: "Ay, there's the rub".to_string(),
//!     candidates: vec!["Ay, there's the tub".to_string()],
//! };
//! let input = format!("{}\n", serde_json::to_string(&item).unwrap());
//! let mut output = Vec::new();
//!
//! assert_eq!(serve(input.as_bytes(), &mut output).unwrap(), 1);
//!
//! let response: WorkResponse = serde_json::from_slice(&output).unwrap();
//! assert_eq!(
//!     response,
//!     WorkResponse::Scored {
//!         batch: 0,
//!         results: vec![("Ay, there's the tub".to_string(), 18)],
//!     }
//! );
//! ```

use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{error::Result, fitness::try_matches};

/// One batch of candidates plus the target they are scored against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub batch: usize,
    pub target: String,
    pub candidates: Vec<String>,
}

/// A worker's answer to one [`WorkItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkResponse {
    /// `(candidate, matches)` pairs in the order they were received.
    Scored {
        batch: usize,
        results: Vec<(String, usize)>,
    },
    Failed {
        batch: usize,
        message: String,
    },
}

impl WorkResponse {
    pub fn batch(&self) -> usize {
        match self {
            WorkResponse::Scored { batch, .. } | WorkResponse::Failed { batch, .. } => *batch,
        }
    }
}

/// Scores one batch. A candidate whose length differs from the target fails
/// the whole batch.
pub fn score_batch(item: &WorkItem) -> WorkResponse {
    let target = item.target.as_bytes();

    let results: Result<Vec<(String, usize)>> = item
        .candidates
        .iter()
        .map(|candidate| {
            let matches = try_matches(candidate.as_bytes(), target)?;
            Ok((candidate.clone(), matches))
        })
        .collect();

    match results {
        Ok(results) => WorkResponse::Scored {
            batch: item.batch,
            results,
        },
        Err(e) => WorkResponse::Failed {
            batch: item.batch,
            message: e.to_string(),
        },
    }
}

/// Serves work items from `input` until it is closed.
///
/// Returns the number of batches answered.
///
/// # Errors
///
/// Returns an error if a line is not a valid `WorkItem` or if writing the
/// response fails. The worker stops at the first such error.
pub fn serve<R: BufRead, W: Write>(input: R, mut output: W) -> Result<usize> {
    let mut served = 0;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let item: WorkItem = serde_json::from_str(&line)?;
        trace!(batch = item.batch, size = item.candidates.len(), "scoring batch");

        let response = score_batch(&item);
        serde_json::to_writer(&mut output, &response)?;
        output.write_all(b"\n")?;
        output.flush()?;

        served += 1;
    }

    Ok(served)
}
