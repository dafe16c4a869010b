use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, warn};

use super::{available_units, FitnessEvaluator};
use crate::{
    candidate::Candidate,
    error::{GeneticError, OptionExt, Result},
    fitness::{Scored, Target},
};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Settings for the shared-memory worker pool.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThreadPoolConfig {
    /// Worker threads. `None` uses one per available processing unit.
    pub threads: Option<usize>,
}

impl ThreadPoolConfig {
    pub fn with_threads(threads: usize) -> Self {
        Self {
            threads: Some(threads),
        }
    }

    pub fn resolved_threads(&self) -> usize {
        self.threads.unwrap_or_else(available_units).max(1)
    }
}

/// Counts pool threads that have not exited yet.
#[derive(Debug)]
struct LiveThreads {
    count: Mutex<usize>,
    exited: Condvar,
}

impl LiveThreads {
    fn new(threads: usize) -> Self {
        Self {
            count: Mutex::new(threads),
            exited: Condvar::new(),
        }
    }

    fn count(&self) -> usize {
        *self.count.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn thread_exited(&self) {
        let mut count = self.count.lock().unwrap_or_else(|e| e.into_inner());
        *count = count.saturating_sub(1);
        self.exited.notify_all();
    }

    /// Blocks until every thread has exited or `timeout` passes. Returns
    /// the number still running.
    fn wait_all(&self, timeout: Duration) -> usize {
        let count = self.count.lock().unwrap_or_else(|e| e.into_inner());
        let (count, _) = self
            .exited
            .wait_timeout_while(count, timeout, |count| *count > 0)
            .unwrap_or_else(|e| e.into_inner());
        *count
    }
}

/// Splits the population into one contiguous chunk per worker thread and
/// scores the chunks concurrently.
///
/// The rayon pool is created once and reused for every generation. Fitness
/// touches only immutable data, so the workers share nothing mutable.
///
/// Dropping a rayon pool only asks its threads to terminate. The evaluator
/// therefore counts threads out through rayon's exit handler and, on drop,
/// waits for all of them to finish before returning.
pub struct ThreadPoolEvaluator {
    pool: Option<ThreadPool>,
    threads: usize,
    live: Arc<LiveThreads>,
}

impl ThreadPoolEvaluator {
    /// # Errors
    ///
    /// Returns `GeneticError::WorkerPool` if rayon cannot start the threads.
    pub fn new(config: &ThreadPoolConfig) -> Result<Self> {
        let threads = config.resolved_threads();
        let live = Arc::new(LiveThreads::new(threads));
        let on_exit = Arc::clone(&live);

        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("fitness-worker-{}", i))
            .exit_handler(move |_| on_exit.thread_exited())
            .build()
            .map_err(|e| GeneticError::WorkerPool(format!("Failed to start thread pool: {}", e)))?;

        debug!(threads, "started fitness thread pool");
        Ok(Self {
            pool: Some(pool),
            threads,
            live,
        })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    fn chunk_size(&self, population_size: usize) -> usize {
        population_size.div_ceil(self.threads.max(1)).max(1)
    }
}

impl FitnessEvaluator for ThreadPoolEvaluator {
    fn name(&self) -> &'static str {
        "thread-pool"
    }

    fn evaluate(&mut self, population: &[Candidate], target: &Target) -> Result<Vec<Scored>> {
        let chunk_size = self.chunk_size(population.len());
        let pool = self
            .pool
            .as_ref()
            .ok_or_else_genetic(|| GeneticError::WorkerPool("Thread pool is shut down".to_string()))?;

        // install blocks until every chunk is done; a panicking chunk aborts the generation.
        let chunks = panic::catch_unwind(AssertUnwindSafe(|| {
            pool.install(|| {
                population
                    .par_chunks(chunk_size)
                    .map(|chunk| chunk.iter().map(|c| target.evaluate(c)).collect::<Vec<_>>())
                    .collect::<Vec<_>>()
            })
        }))
        .map_err(|_| GeneticError::WorkerPool("A fitness worker thread panicked".to_string()))?;

        Ok(chunks.into_iter().flatten().collect())
    }
}

impl Drop for ThreadPoolEvaluator {
    fn drop(&mut self) {
        debug!(threads = self.threads, "stopping fitness thread pool");
        drop(self.pool.take());

        let running = self.live.wait_all(SHUTDOWN_GRACE);
        if running > 0 {
            warn!(running, "fitness threads still running after shutdown");
        }
    }
}
