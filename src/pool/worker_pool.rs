//! Worker pool implementation

use crate::core::{ClosureJob, Job, PoolError, Result};
use crate::pool::worker::{Worker, WorkerStats};
use crate::queue::ChannelQueue;
use log::debug;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for the worker pool
///
/// The admission queue is always an unbounded FIFO: submissions beyond the
/// concurrency bound are queued without any backpressure signal to the
/// submitter.
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Number of worker threads (0 = number of CPUs)
    pub num_threads: usize,
    /// Thread name prefix
    pub thread_name_prefix: String,
    /// Worker poll interval for checking new jobs and shutdown state.
    /// Default: 100ms
    pub poll_interval: Duration,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get(),
            thread_name_prefix: "worker".to_string(),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl WorkerPoolConfig {
    /// Create a new configuration with specified number of threads
    #[must_use]
    pub fn new(num_threads: usize) -> Self {
        Self {
            num_threads: if num_threads == 0 {
                num_cpus::get()
            } else {
                num_threads
            },
            ..Default::default()
        }
    }

    /// Set thread name prefix
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the worker poll interval.
    ///
    /// This controls how frequently idle workers check for new jobs and
    /// shutdown signals. Shorter intervals improve drain latency at the cost
    /// of CPU; longer intervals the reverse.
    ///
    /// # Panics
    ///
    /// Panics if interval is zero.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        assert!(!interval.is_zero(), "poll interval must be non-zero");
        self.poll_interval = interval;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.num_threads == 0 {
            return Err(PoolError::invalid_config(
                "num_threads",
                "Number of threads must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// A fixed-size pool of reusable worker threads with an unbounded FIFO
/// admission queue.
///
/// # Lifecycle
///
/// The pool moves through three states:
///
/// - **Accepting**: after [`start`](WorkerPool::start); submissions are
///   admitted and at most `num_threads` jobs execute concurrently.
/// - **Draining**: after [`shutdown`](WorkerPool::shutdown); no new
///   submissions are admitted, already-admitted jobs still run to
///   completion.
/// - **Terminated**: every worker has exited. Reached asynchronously; a
///   caller that wants to observe it uses
///   [`await_termination`](WorkerPool::await_termination).
///
/// # Shutdown Mechanism
///
/// `shutdown` only closes the queue and returns immediately. Workers exit
/// once the queue is closed and empty, so every admitted job eventually runs
/// even though the shutdown requester never waits for it.
pub struct WorkerPool {
    config: WorkerPoolConfig,
    workers: RwLock<Vec<Worker>>,
    // Stats handles outlive the workers so counters stay readable after the
    // workers have been joined; replaced on restart.
    stats: RwLock<Vec<Arc<WorkerStats>>>,
    queue: RwLock<Option<Arc<ChannelQueue>>>,
    running: AtomicBool,
    total_jobs_submitted: AtomicU64,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("config", &self.config)
            .field("running", &self.running.load(Ordering::Relaxed))
            .field(
                "total_jobs_submitted",
                &self.total_jobs_submitted.load(Ordering::Relaxed),
            )
            .finish()
    }
}

impl WorkerPool {
    /// Create a new worker pool with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(WorkerPoolConfig::default())
    }

    /// Create a worker pool with specified number of threads
    pub fn with_threads(num_threads: usize) -> Result<Self> {
        Self::with_config(WorkerPoolConfig::new(num_threads))
    }

    /// Create a worker pool with custom configuration
    pub fn with_config(config: WorkerPoolConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            workers: RwLock::new(Vec::new()),
            stats: RwLock::new(Vec::new()),
            queue: RwLock::new(None),
            running: AtomicBool::new(false),
            total_jobs_submitted: AtomicU64::new(0),
        })
    }

    /// Start the worker pool
    ///
    /// Creates the admission queue and spawns `num_threads` workers. The
    /// pool accepts submissions as soon as this returns.
    ///
    /// # Restart Support
    ///
    /// The pool can be restarted after termination by calling `start` again;
    /// workers are recreated with a fresh queue.
    ///
    /// # Errors
    ///
    /// Multiple concurrent calls are safe: only the first succeeds, the
    /// others receive an `AlreadyRunning` error.
    pub fn start(&self) -> Result<()> {
        // Atomically check and set running flag to prevent race condition
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(PoolError::already_running(
                &self.config.thread_name_prefix,
                self.config.num_threads,
            ));
        }

        let queue = Arc::new(ChannelQueue::unbounded());

        let mut workers = Vec::with_capacity(self.config.num_threads);
        for id in 0..self.config.num_threads {
            let worker = Worker::new(
                id,
                format!("{}-{}", self.config.thread_name_prefix, id),
                Arc::clone(&queue),
                self.config.poll_interval,
            )?;
            workers.push(worker);
        }

        *self.stats.write() = workers.iter().map(|w| w.stats()).collect();
        *self.workers.write() = workers;
        *self.queue.write() = Some(queue);

        debug!(
            "worker pool '{}' started with {} threads",
            self.config.thread_name_prefix, self.config.num_threads
        );
        Ok(())
    }

    /// Submit a job to the pool
    ///
    /// Submission never blocks on execution: the job is enqueued and this
    /// returns immediately. Jobs are admitted in submission order; the order
    /// in which they start or complete is unspecified.
    ///
    /// # Errors
    ///
    /// - `NotRunning` before `start` or after termination
    /// - `ShuttingDown` while the pool is draining
    pub fn submit<J: Job + 'static>(&self, job: J) -> Result<()> {
        if !self.running.load(Ordering::Acquire) {
            return Err(self.rejection_error());
        }

        let queue_guard = self.queue.read();
        let queue = queue_guard
            .as_ref()
            .ok_or_else(|| PoolError::not_running(&self.config.thread_name_prefix))?;

        queue
            .send(Box::new(job))
            .map_err(|_| PoolError::shutting_down(queue.len()))?;

        self.total_jobs_submitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Submit a closure as a job
    pub fn execute<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.submit(ClosureJob::new(f))
    }

    /// Request a graceful shutdown. **Non-blocking.**
    ///
    /// Stops admitting new jobs and closes the queue, then returns
    /// immediately without waiting for queued or in-flight jobs: workers
    /// keep draining in the background and exit once the queue is empty.
    /// Calling this more than once is a no-op.
    ///
    /// Use [`await_termination`](WorkerPool::await_termination) to wait for
    /// the drain when determinism is needed.
    pub fn shutdown(&self) {
        if self
            .running
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        if let Some(queue) = self.queue.read().as_ref() {
            debug!(
                "worker pool '{}' draining ({} jobs pending)",
                self.config.thread_name_prefix,
                queue.len()
            );
            queue.close();
        }
    }

    /// Wait for the pool to terminate after a shutdown request.
    ///
    /// Joins every worker, which by the queue's close-then-drain protocol
    /// happens only after all admitted jobs have run. Idempotent once the
    /// pool has terminated.
    ///
    /// This is the explicit synchronization point for tests and embedders;
    /// the demo runner never calls it and relies on `Drop` instead.
    ///
    /// # Errors
    ///
    /// - `AlreadyRunning` if no shutdown was requested (waiting would never
    ///   return)
    /// - `JoinError` if a worker thread panicked
    pub fn await_termination(&self) -> Result<()> {
        if self.running.load(Ordering::Acquire) {
            return Err(PoolError::already_running(
                &self.config.thread_name_prefix,
                self.config.num_threads,
            ));
        }

        let workers = std::mem::take(&mut *self.workers.write());
        for worker in workers {
            worker.join()?;
        }

        *self.queue.write() = None;
        Ok(())
    }

    /// Get the number of worker threads
    pub fn num_threads(&self) -> usize {
        self.config.num_threads
    }

    /// Check if the pool is accepting submissions
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Check if the pool has fully terminated
    ///
    /// True once no workers remain and the pool is not accepting jobs. A
    /// pool that was never started is trivially terminated.
    pub fn is_terminated(&self) -> bool {
        !self.running.load(Ordering::Acquire) && self.workers.read().is_empty()
    }

    /// Get total number of jobs submitted
    pub fn total_jobs_submitted(&self) -> u64 {
        self.total_jobs_submitted.load(Ordering::Relaxed)
    }

    /// Get the number of admitted jobs not yet picked up by a worker
    ///
    /// The value is approximate as it may change between checking and using
    /// it.
    pub fn pending_jobs(&self) -> usize {
        self.queue.read().as_ref().map(|q| q.len()).unwrap_or(0)
    }

    /// Get statistics for all workers
    ///
    /// Counters remain readable after termination; they reset on restart.
    pub fn worker_stats(&self) -> Vec<Arc<WorkerStats>> {
        self.stats.read().clone()
    }

    /// Get total jobs processed across all workers
    pub fn total_jobs_processed(&self) -> u64 {
        let stats = self.stats.read();
        stats.iter().map(|s| s.get_jobs_processed()).sum()
    }

    /// Get total jobs failed across all workers
    pub fn total_jobs_failed(&self) -> u64 {
        let stats = self.stats.read();
        stats.iter().map(|s| s.get_jobs_failed()).sum()
    }

    /// Get total jobs panicked across all workers
    pub fn total_jobs_panicked(&self) -> u64 {
        let stats = self.stats.read();
        stats.iter().map(|s| s.get_jobs_panicked()).sum()
    }

    /// The error a rejected submission gets: `ShuttingDown` while draining,
    /// `NotRunning` otherwise.
    fn rejection_error(&self) -> PoolError {
        let queue_guard = self.queue.read();
        match queue_guard.as_ref() {
            Some(queue) if queue.is_closed() => PoolError::shutting_down(queue.len()),
            _ => PoolError::not_running(&self.config.thread_name_prefix),
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
        if let Err(e) = self.await_termination() {
            log::error!(
                "worker pool '{}' did not shut down cleanly during drop: {}",
                self.config.thread_name_prefix,
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn test_pool_creation() {
        let pool = WorkerPool::new().expect("Failed to create worker pool");
        assert!(!pool.is_running());

        pool.start().expect("Failed to start pool");
        assert!(pool.is_running());
        assert_eq!(pool.num_threads(), num_cpus::get());

        pool.shutdown();
        pool.await_termination().expect("Failed to terminate pool");
        assert!(!pool.is_running());
        assert!(pool.is_terminated());
    }

    #[test]
    fn test_pool_with_threads() {
        let pool = WorkerPool::with_threads(4).expect("Failed to create worker pool");
        pool.start().expect("Failed to start pool");
        assert_eq!(pool.num_threads(), 4);
        pool.shutdown();
        pool.await_termination().expect("Failed to terminate pool");
    }

    #[test]
    fn test_zero_threads_uses_cpu_count() {
        let config = WorkerPoolConfig::new(0);
        assert_eq!(config.num_threads, num_cpus::get());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = WorkerPoolConfig {
            num_threads: 0,
            ..Default::default()
        };
        let result = WorkerPool::with_config(config);
        assert!(matches!(result, Err(PoolError::InvalidConfig { .. })));
    }

    #[test]
    #[should_panic(expected = "poll interval must be non-zero")]
    fn test_poll_interval_zero_panics() {
        let _ = WorkerPoolConfig::new(2).with_poll_interval(Duration::ZERO);
    }

    #[test]
    fn test_job_execution() {
        let pool = WorkerPool::with_threads(2).expect("Failed to create worker pool");
        pool.start().expect("Failed to start pool");

        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let counter_clone = Arc::clone(&counter);
            pool.execute(move || {
                counter_clone.fetch_add(1, Ordering::Relaxed);
                Ok(())
            })
            .expect("Failed to submit job");
        }

        pool.shutdown();
        pool.await_termination().expect("Failed to terminate pool");

        assert_eq!(counter.load(Ordering::Relaxed), 10);
        assert_eq!(pool.total_jobs_submitted(), 10);
        assert_eq!(pool.total_jobs_processed(), 10);
    }

    #[test]
    fn test_submit_when_not_running() {
        let pool = WorkerPool::new().expect("Failed to create worker pool");
        let result = pool.execute(|| Ok(()));
        assert!(matches!(result, Err(PoolError::NotRunning { .. })));
    }

    #[test]
    fn test_shutdown_is_non_blocking() {
        let pool = WorkerPool::with_threads(2).expect("Failed to create worker pool");
        pool.start().expect("Failed to start pool");

        // Keep the workers busy so the queue is non-empty at shutdown
        for _ in 0..8 {
            pool.execute(|| {
                thread::sleep(Duration::from_millis(50));
                Ok(())
            })
            .expect("Failed to submit job");
        }

        let start = Instant::now();
        pool.shutdown();
        let elapsed = start.elapsed();

        // The request must return without waiting for the ~200ms of queued work
        assert!(
            elapsed < Duration::from_millis(40),
            "shutdown blocked for {:?}",
            elapsed
        );

        pool.await_termination().expect("Failed to terminate pool");
        assert_eq!(pool.total_jobs_submitted(), 8);
    }

    #[test]
    fn test_shutdown_drains_admitted_jobs() {
        let pool = WorkerPool::with_threads(2).expect("Failed to create worker pool");
        pool.start().expect("Failed to start pool");

        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..20 {
            let counter_clone = Arc::clone(&counter);
            pool.execute(move || {
                thread::sleep(Duration::from_millis(5));
                counter_clone.fetch_add(1, Ordering::Relaxed);
                Ok(())
            })
            .expect("Failed to submit job");
        }

        // Shutdown with most jobs still queued; every one must still run
        pool.shutdown();
        pool.await_termination().expect("Failed to terminate pool");

        assert_eq!(counter.load(Ordering::Relaxed), 20);
    }

    #[test]
    fn test_submit_while_draining() {
        let pool = WorkerPool::with_threads(1).expect("Failed to create worker pool");
        pool.start().expect("Failed to start pool");

        // Hold the single worker so the pool is still draining when we probe it
        let (done_tx, done_rx) = std::sync::mpsc::channel::<()>();
        pool.execute(move || {
            let _ = done_rx.recv();
            Ok(())
        })
        .expect("Failed to submit blocking job");

        pool.shutdown();

        let result = pool.execute(|| Ok(()));
        assert!(matches!(result, Err(PoolError::ShuttingDown { .. })));

        let _ = done_tx.send(());
        pool.await_termination().expect("Failed to terminate pool");
    }

    #[test]
    fn test_submit_after_termination() {
        let pool = WorkerPool::with_threads(2).expect("Failed to create worker pool");
        pool.start().expect("Failed to start pool");
        pool.execute(|| Ok(())).expect("Failed to submit job");

        pool.shutdown();
        pool.await_termination().expect("Failed to terminate pool");

        let result = pool.execute(|| Ok(()));
        assert!(matches!(result, Err(PoolError::NotRunning { .. })));
    }

    #[test]
    fn test_double_start() {
        let pool = WorkerPool::with_threads(2).expect("Failed to create worker pool");
        pool.start().expect("Failed to start pool");

        let result = pool.start();
        assert!(matches!(result, Err(PoolError::AlreadyRunning { .. })));

        pool.shutdown();
        pool.await_termination().expect("Failed to terminate pool");
    }

    #[test]
    fn test_await_termination_while_accepting() {
        let pool = WorkerPool::with_threads(2).expect("Failed to create worker pool");
        pool.start().expect("Failed to start pool");

        let result = pool.await_termination();
        assert!(matches!(result, Err(PoolError::AlreadyRunning { .. })));

        pool.shutdown();
        pool.await_termination().expect("Failed to terminate pool");
    }

    #[test]
    fn test_shutdown_idempotent() {
        let pool = WorkerPool::with_threads(2).expect("Failed to create worker pool");
        pool.start().expect("Failed to start pool");

        pool.shutdown();
        pool.shutdown();
        pool.await_termination().expect("Failed to terminate pool");
        pool.await_termination()
            .expect("await_termination should be idempotent");
    }

    #[test]
    fn test_restart_after_termination() {
        let pool = WorkerPool::with_threads(2).expect("Failed to create worker pool");

        pool.start().expect("Failed to start pool");
        pool.execute(|| Ok(())).expect("Failed to submit job");
        pool.shutdown();
        pool.await_termination().expect("Failed to terminate pool");
        assert!(pool.is_terminated());

        pool.start().expect("Failed to restart pool");
        assert!(pool.is_running());
        pool.execute(|| Ok(())).expect("Failed to submit after restart");
        pool.shutdown();
        pool.await_termination().expect("Failed to terminate pool");
    }

    #[test]
    fn test_drop_drains_admitted_jobs() {
        let counter = Arc::new(AtomicUsize::new(0));

        {
            let pool = WorkerPool::with_threads(2).expect("Failed to create worker pool");
            pool.start().expect("Failed to start pool");

            for _ in 0..10 {
                let counter_clone = Arc::clone(&counter);
                pool.execute(move || {
                    thread::sleep(Duration::from_millis(5));
                    counter_clone.fetch_add(1, Ordering::Relaxed);
                    Ok(())
                })
                .expect("Failed to submit job");
            }
            // Pool dropped here without shutdown or await
        }

        assert_eq!(counter.load(Ordering::Relaxed), 10);
    }

    #[test]
    fn test_concurrent_submit() {
        let pool = Arc::new(WorkerPool::with_threads(4).expect("Failed to create worker pool"));
        pool.start().expect("Failed to start pool");

        let counter = Arc::new(AtomicUsize::new(0));
        let mut handles = vec![];

        for _ in 0..10 {
            let pool_clone = Arc::clone(&pool);
            let counter_clone = Arc::clone(&counter);

            let handle = thread::spawn(move || {
                for _ in 0..100 {
                    let counter_inner = Arc::clone(&counter_clone);
                    let _ = pool_clone.execute(move || {
                        counter_inner.fetch_add(1, Ordering::Relaxed);
                        Ok(())
                    });
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        pool.shutdown();
        pool.await_termination().expect("Failed to terminate pool");

        assert_eq!(counter.load(Ordering::Relaxed), 1000);
        assert_eq!(pool.total_jobs_submitted(), 1000);
        assert_eq!(pool.total_jobs_processed(), 1000);
    }

    #[test]
    fn test_single_thread_serializes_jobs() {
        let pool = WorkerPool::with_threads(1).expect("Failed to create worker pool");
        pool.start().expect("Failed to start pool");

        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..10usize {
            let order_clone = Arc::clone(&order);
            pool.execute(move || {
                order_clone.lock().unwrap().push(i);
                Ok(())
            })
            .expect("Failed to submit job");
        }

        pool.shutdown();
        pool.await_termination().expect("Failed to terminate pool");

        // One worker pulls from a FIFO queue: completion order is submission order
        let observed = order.lock().unwrap();
        assert_eq!(*observed, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_failed_jobs_are_counted() {
        let pool = WorkerPool::with_threads(2).expect("Failed to create worker pool");
        pool.start().expect("Failed to start pool");

        for i in 0..10 {
            pool.execute(move || {
                if i % 2 == 0 {
                    Err(PoolError::other("Test error"))
                } else {
                    Ok(())
                }
            })
            .expect("Failed to submit job");
        }

        pool.shutdown();
        pool.await_termination().expect("Failed to terminate pool");

        assert_eq!(pool.total_jobs_submitted(), 10);
        assert_eq!(pool.total_jobs_processed(), 5);
        assert_eq!(pool.total_jobs_failed(), 5);
        assert_eq!(pool.total_jobs_panicked(), 0);
    }

    #[test]
    fn test_worker_stats_survive_termination() {
        let pool = WorkerPool::with_threads(3).expect("Failed to create worker pool");
        pool.start().expect("Failed to start pool");

        for _ in 0..30 {
            pool.execute(|| Ok(())).expect("Failed to submit job");
        }

        pool.shutdown();
        pool.await_termination().expect("Failed to terminate pool");

        let stats = pool.worker_stats();
        assert_eq!(stats.len(), 3);
        let total: u64 = stats.iter().map(|s| s.get_jobs_processed()).sum();
        assert_eq!(total, 30);
    }

    #[test]
    fn test_pending_jobs() {
        let pool = WorkerPool::with_threads(1).expect("Failed to create worker pool");
        assert_eq!(pool.pending_jobs(), 0);

        pool.start().expect("Failed to start pool");

        let (started_tx, started_rx) = std::sync::mpsc::channel();
        let (done_tx, done_rx) = std::sync::mpsc::channel::<()>();

        pool.execute(move || {
            started_tx.send(()).unwrap();
            let _ = done_rx.recv();
            Ok(())
        })
        .expect("Failed to submit blocking job");

        started_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("Blocking job should start");

        // The worker is held, so these stay queued
        pool.execute(|| Ok(())).expect("Failed to submit job");
        pool.execute(|| Ok(())).expect("Failed to submit job");
        assert_eq!(pool.pending_jobs(), 2);

        let _ = done_tx.send(());
        pool.shutdown();
        pool.await_termination().expect("Failed to terminate pool");
        assert_eq!(pool.pending_jobs(), 0);
    }
}
