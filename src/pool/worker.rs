//! Worker thread implementation

use crate::core::{BoxedJob, PoolError, Result};
use crate::queue::{ChannelQueue, QueueError};
use log::{debug, error, warn};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Statistics for a worker thread
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Total number of jobs processed
    pub jobs_processed: AtomicU64,
    /// Total number of jobs that failed
    pub jobs_failed: AtomicU64,
    /// Total number of jobs that panicked
    pub jobs_panicked: AtomicU64,
}

impl WorkerStats {
    /// Create new worker statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment jobs processed counter
    pub fn increment_processed(&self) {
        self.jobs_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment jobs failed counter
    pub fn increment_failed(&self) {
        self.jobs_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment jobs panicked counter
    pub fn increment_panicked(&self) {
        self.jobs_panicked.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total jobs processed
    pub fn get_jobs_processed(&self) -> u64 {
        self.jobs_processed.load(Ordering::Relaxed)
    }

    /// Get total jobs failed
    pub fn get_jobs_failed(&self) -> u64 {
        self.jobs_failed.load(Ordering::Relaxed)
    }

    /// Get total jobs panicked
    pub fn get_jobs_panicked(&self) -> u64 {
        self.jobs_panicked.load(Ordering::Relaxed)
    }
}

/// A worker thread that processes jobs from the shared queue
#[derive(Debug)]
pub struct Worker {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
    stats: Arc<WorkerStats>,
}

impl Worker {
    /// Create and start a new worker
    ///
    /// # Arguments
    ///
    /// * `id` - Unique identifier for this worker
    /// * `name` - OS thread name
    /// * `queue` - Shared job queue
    /// * `poll_interval` - Duration between poll attempts for new jobs
    ///
    /// # Shutdown Behavior
    ///
    /// Workers exit when the queue is closed and empty,
    /// ensuring all admitted jobs are processed before shutdown completes.
    pub fn new(
        id: usize,
        name: String,
        queue: Arc<ChannelQueue>,
        poll_interval: Duration,
    ) -> Result<Self> {
        let stats = Arc::new(WorkerStats::new());
        let stats_clone = Arc::clone(&stats);

        let thread = thread::Builder::new()
            .name(name)
            .spawn(move || {
                Self::run(id, queue, stats_clone, poll_interval);
            })
            .map_err(|e| PoolError::spawn_with_source(id, "Cannot create thread", e))?;

        Ok(Self {
            id,
            thread: Some(thread),
            stats,
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get worker statistics
    pub fn stats(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }

    /// Join the worker thread
    pub fn join(mut self) -> Result<()> {
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| PoolError::join(self.id, "Worker panicked"))?;
        }
        Ok(())
    }

    /// Main worker loop
    ///
    /// Workers process jobs from the queue until it is closed and empty.
    fn run(id: usize, queue: Arc<ChannelQueue>, stats: Arc<WorkerStats>, poll_interval: Duration) {
        debug!("worker {} started", id);

        loop {
            match queue.recv_timeout(poll_interval) {
                Ok(mut job) => {
                    Self::execute_job(id, &mut job, &stats);
                }
                Err(QueueError::Empty) => {
                    // No job available within timeout, continue polling
                    continue;
                }
                Err(_) => {
                    // Queue closed and drained, shutdown
                    debug!(
                        "worker {} shutting down ({} jobs processed)",
                        id,
                        stats.get_jobs_processed()
                    );
                    break;
                }
            }
        }
    }

    /// Execute a single job with panic protection
    fn execute_job(id: usize, job: &mut BoxedJob, stats: &WorkerStats) {
        let panic_result = catch_unwind(AssertUnwindSafe(|| job.execute()));

        match panic_result {
            Ok(Ok(())) => {
                stats.increment_processed();
            }
            Ok(Err(e)) => {
                warn!("worker {}: job execution failed: {}", id, e);
                stats.increment_failed();
            }
            Err(panic_info) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                error!("worker {}: job panicked: {}", id, panic_msg);
                stats.increment_panicked();
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            // Bound the wait so Drop cannot hang on a wedged worker
            const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

            let start = std::time::Instant::now();
            loop {
                if thread.is_finished() {
                    if thread.join().is_err() {
                        error!("worker {} panicked during shutdown", self.id);
                    }
                    break;
                }

                if start.elapsed() >= JOIN_TIMEOUT {
                    warn!(
                        "worker {} did not finish within {}s during drop, thread may be leaked",
                        self.id,
                        JOIN_TIMEOUT.as_secs()
                    );
                    break;
                }

                thread::sleep(Duration::from_millis(10));
            }
        }
    }
}
