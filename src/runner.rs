//! The demo's submission/shutdown lifecycle.
//!
//! [`run`] is the whole program once arguments are validated: start a
//! fixed-size pool, submit every job in index order, request a graceful
//! shutdown, and print the closing line without waiting for the drain.

use crate::core::Result;
use crate::pool::{WorkerPool, WorkerPoolConfig};
use log::info;
use std::thread;

/// A unit of work identified by its submission-order index.
///
/// The body does no real work; it prints which worker picked it up so the
/// interleaving is visible when running the binary.
pub struct IndexedJob {
    index: usize,
}

impl IndexedJob {
    /// Create a job with the given submission index
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    /// The job's submission-order index
    pub fn index(&self) -> usize {
        self.index
    }
}

impl crate::core::Job for IndexedJob {
    fn execute(&mut self) -> Result<()> {
        let current = thread::current();
        println!(
            "Job {} running on {}",
            self.index,
            current.name().unwrap_or("unnamed")
        );
        Ok(())
    }

    fn job_type(&self) -> &str {
        "IndexedJob"
    }
}

/// Runs `number_of_jobs` independent jobs on a pool of `number_of_threads`
/// worker threads.
///
/// Jobs are submitted in index order 0, 1, 2, ...; which worker runs which
/// job, and in what order they complete, is unspecified. After the last
/// submission the pool is asked to shut down gracefully and the runner
/// immediately prints `Last line <thread-name>` without waiting for the
/// drain, so that line may appear before, between, or after job output.
///
/// The pool is dropped on return, which joins the draining workers: the
/// process's natural exit is the only synchronization point.
///
/// # Errors
///
/// Returns an error only if the pool cannot be created or a worker thread
/// cannot be spawned; job bodies themselves have no failure mode here.
pub fn run(number_of_jobs: usize, number_of_threads: usize) -> Result<()> {
    let config = WorkerPoolConfig::new(number_of_threads).with_thread_name_prefix("pool-worker");
    let pool = WorkerPool::with_config(config)?;
    pool.start()?;

    info!(
        "submitting {} jobs to {} worker threads",
        number_of_jobs, number_of_threads
    );

    for index in 0..number_of_jobs {
        pool.submit(IndexedJob::new(index))?;
    }

    // Graceful and non-blocking: admitted jobs keep draining in the background
    pool.shutdown();

    let current = thread::current();
    println!("Last line {}", current.name().unwrap_or("unnamed"));

    Ok(())
}
