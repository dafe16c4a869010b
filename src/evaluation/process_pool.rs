use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{
    available_units,
    worker::{WorkItem, WorkResponse},
    FitnessEvaluator,
};
use crate::{
    candidate::Candidate,
    error::{GeneticError, OptionExt, Result, ResultExt},
    fitness::{fitness_from_matches, Scored, Target},
};

/// Name of the worker binary shipped with this crate.
pub const WORKER_BIN: &str = "evolve-worker";

/// Default lower bound on candidates per batch.
pub const DEFAULT_MIN_BATCH_SIZE: usize = 50;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Settings for the process-isolated worker pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessPoolConfig {
    /// Worker processes. `None` uses half the available processing units, at least one.
    pub workers: Option<usize>,
    /// Smallest batch sent to a worker, to amortize per-batch dispatch cost.
    pub min_batch_size: usize,
    /// Path of the worker executable. `None` looks for `evolve-worker` next to
    /// the running executable.
    pub worker_program: Option<PathBuf>,
    /// Extra command-line arguments passed to every worker.
    pub worker_args: Vec<String>,
}

impl Default for ProcessPoolConfig {
    fn default() -> Self {
        Self {
            workers: None,
            min_batch_size: DEFAULT_MIN_BATCH_SIZE,
            worker_program: None,
            worker_args: Vec::new(),
        }
    }
}

impl ProcessPoolConfig {
    pub fn with_worker_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.worker_program = Some(program.into());
        self
    }

    pub fn with_worker_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.worker_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_min_batch_size(mut self, min_batch_size: usize) -> Self {
        self.min_batch_size = min_batch_size;
        self
    }

    pub fn resolved_workers(&self) -> usize {
        self.workers
            .unwrap_or_else(|| available_units() / 2)
            .max(1)
    }

    /// `max(min_batch_size, ceil(population_size / workers))`, never zero.
    pub fn batch_size(&self, population_size: usize) -> usize {
        population_size
            .div_ceil(self.resolved_workers())
            .max(self.min_batch_size)
            .max(1)
    }
}

/// Locates the worker binary next to the running executable.
///
/// Test and bench executables live in `target/<profile>/deps`, one level below
/// the worker, so the parent directory is searched as well.
///
/// # Errors
///
/// Returns `GeneticError::Configuration` if no worker binary is found.
pub fn default_worker_program() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    let name = format!("{}{}", WORKER_BIN, std::env::consts::EXE_SUFFIX);

    let found = exe
        .ancestors()
        .skip(1)
        .take(2)
        .map(|dir| dir.join(&name))
        .find(|path| path.is_file());

    found.ok_or_else_genetic(|| {
        GeneticError::Configuration(format!(
            "Could not find the `{}` worker near {}; set ProcessPoolConfig::worker_program",
            WORKER_BIN,
            exe.display()
        ))
    })
}

/// One long-lived worker process and its pipes.
struct WorkerProcess {
    id: usize,
    child: Child,
    stdin: Option<BufWriter<ChildStdin>>,
    stdout: BufReader<ChildStdout>,
}

impl WorkerProcess {
    fn spawn(id: usize, program: &Path, args: &[String]) -> Result<Self> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                GeneticError::WorkerPool(format!(
                    "Failed to start worker {} ({}): {}",
                    id,
                    program.display(),
                    e
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else_genetic(|| GeneticError::WorkerPool(format!("Worker {} has no stdin", id)))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else_genetic(|| GeneticError::WorkerPool(format!("Worker {} has no stdout", id)))?;

        Ok(Self {
            id,
            child,
            stdin: Some(BufWriter::new(stdin)),
            stdout: BufReader::new(stdout),
        })
    }

    fn request(&mut self, item: &WorkItem) -> Result<WorkResponse> {
        let id = self.id;
        let broken = |e: std::io::Error| {
            GeneticError::WorkerPool(format!("Worker {} pipe failed: {}", id, e))
        };

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else_genetic(|| GeneticError::WorkerPool(format!("Worker {} is shut down", id)))?;
        let mut request = serde_json::to_vec(item)?;
        request.push(b'\n');
        stdin.write_all(&request).map_err(broken)?;
        stdin.flush().map_err(broken)?;

        let mut line = String::new();
        let read = self.stdout.read_line(&mut line).map_err(broken)?;
        if read == 0 {
            return Err(GeneticError::WorkerPool(format!(
                "Worker {} exited before answering batch {}",
                id, item.batch
            )));
        }

        serde_json::from_str(&line).map_err(|e| {
            GeneticError::WorkerPool(format!(
                "Worker {} sent an unreadable response to batch {}: {}",
                id, item.batch, e
            ))
        })
    }

    /// Sends each assigned batch in turn and converts the answers to scores.
    fn run_batches(
        &mut self,
        batches: &[(usize, &[Candidate])],
        target: &Target,
        target_text: &str,
    ) -> Result<Vec<(usize, Vec<Scored>)>> {
        let mut scored_batches = Vec::with_capacity(batches.len());

        for &(batch, candidates) in batches {
            let item = WorkItem {
                batch,
                target: target_text.to_string(),
                candidates: candidates.iter().map(Candidate::to_text).collect(),
            };

            let scored = match self.request(&item)? {
                WorkResponse::Scored {
                    batch: answered,
                    results,
                } => {
                    if answered != batch {
                        return Err(GeneticError::WorkerPool(format!(
                            "Worker {} answered batch {} instead of {}",
                            self.id, answered, batch
                        )));
                    }
                    merge_batch(self.id, batch, candidates, &item.candidates, results, target)?
                }
                WorkResponse::Failed { batch, message } => {
                    return Err(GeneticError::WorkerPool(format!(
                        "Worker {} failed batch {}: {}",
                        self.id, batch, message
                    )));
                }
            };

            scored_batches.push((batch, scored));
        }

        Ok(scored_batches)
    }

    /// Closes stdin so the worker exits on end of input, then reaps it.
    /// A worker that lingers past the grace period is killed.
    fn shutdown(&mut self) {
        drop(self.stdin.take());

        let deadline = Instant::now() + SHUTDOWN_GRACE;
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    if !status.success() {
                        warn!(worker = self.id, %status, "worker exited with failure");
                    }
                    return;
                }
                Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(5)),
                Ok(None) | Err(_) => break,
            }
        }

        warn!(worker = self.id, "worker did not exit in time, killing it");
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Drop for WorkerProcess {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Pairs a worker's answers with the candidates that were sent, checking
/// that nothing was dropped, reordered or altered in transit.
fn merge_batch(
    worker: usize,
    batch: usize,
    candidates: &[Candidate],
    sent: &[String],
    results: Vec<(String, usize)>,
    target: &Target,
) -> Result<Vec<Scored>> {
    if results.len() != candidates.len() {
        return Err(GeneticError::WorkerPool(format!(
            "Worker {} returned {} scores for {} candidates in batch {}",
            worker,
            results.len(),
            candidates.len(),
            batch
        )));
    }

    candidates
        .iter()
        .zip(sent)
        .zip(results)
        .map(|((candidate, sent), (returned, matches))| {
            if *sent != returned {
                return Err(GeneticError::WorkerPool(format!(
                    "Worker {} returned a different candidate in batch {}",
                    worker, batch
                )));
            }
            if matches > target.len() {
                return Err(GeneticError::FitnessCalculation(format!(
                    "Worker {} reported {} matches against a target of length {}",
                    worker,
                    matches,
                    target.len()
                )));
            }
            Ok(Scored::new(
                candidate.clone(),
                fitness_from_matches(matches, target.len()),
            ))
        })
        .collect()
}

/// Scores the population on a bounded pool of worker processes.
///
/// The population is cut into batches of
/// `max(min_batch_size, ceil(population / workers))` candidates, dealt
/// round-robin to the workers, and the answers are reassembled in population
/// order. Workers are started once, reused for every generation, and shut
/// down when the evaluator is dropped.
pub struct ProcessPoolEvaluator {
    config: ProcessPoolConfig,
    workers: Vec<WorkerProcess>,
}

impl ProcessPoolEvaluator {
    /// Starts the worker processes.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::Configuration` if the worker binary cannot be
    /// located, or `GeneticError::WorkerPool` if a worker fails to start.
    pub fn new(config: &ProcessPoolConfig) -> Result<Self> {
        let program = match &config.worker_program {
            Some(path) => path.clone(),
            None => default_worker_program()?,
        };

        let count = config.resolved_workers();
        let workers = (0..count)
            .map(|id| WorkerProcess::spawn(id, &program, &config.worker_args))
            .collect::<Result<Vec<_>>>()?;

        debug!(workers = count, program = %program.display(), "started fitness worker processes");

        Ok(Self {
            config: config.clone(),
            workers,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers.len()
    }
}

impl FitnessEvaluator for ProcessPoolEvaluator {
    fn name(&self) -> &'static str {
        "process-pool"
    }

    fn evaluate(&mut self, population: &[Candidate], target: &Target) -> Result<Vec<Scored>> {
        if population.is_empty() {
            return Ok(Vec::new());
        }

        let batch_size = self.config.batch_size(population.len());
        let worker_count = self.workers.len();

        let mut assignments: Vec<Vec<(usize, &[Candidate])>> = vec![Vec::new(); worker_count];
        for (batch, candidates) in population.chunks(batch_size).enumerate() {
            assignments[batch % worker_count].push((batch, candidates));
        }

        let target_text = target.to_text();
        let outcomes: Vec<Result<Vec<(usize, Vec<Scored>)>>> = thread::scope(|scope| {
            let handles: Vec<_> = self
                .workers
                .iter_mut()
                .zip(&assignments)
                .filter(|(_, assigned)| !assigned.is_empty())
                .map(|(worker, assigned)| {
                    let target_text = target_text.as_str();
                    scope.spawn(move || worker.run_batches(assigned, target, target_text))
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        Err(GeneticError::WorkerPool(
                            "A batch dispatch thread panicked".to_string(),
                        ))
                    })
                })
                .collect()
        });

        let mut batches = Vec::new();
        for outcome in outcomes {
            batches.extend(outcome?);
        }
        batches.sort_by_key(|(batch, _)| *batch);

        let scored: Vec<Scored> = batches.into_iter().flat_map(|(_, s)| s).collect();
        if scored.len() != population.len() {
            return Err(GeneticError::WorkerPool(format!(
                "Process pool returned {} scores for {} candidates",
                scored.len(),
                population.len()
            )));
        }

        Ok(scored)
    }
}

impl Drop for ProcessPoolEvaluator {
    fn drop(&mut self) {
        debug!(workers = self.workers.len(), "stopping fitness worker processes");
        // Each WorkerProcess reaps its child on drop.
        self.workers.clear();
    }
}
