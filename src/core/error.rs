//! Error types for the worker pool

/// Result type for worker pool operations
pub type Result<T> = std::result::Result<T, PoolError>;

/// Errors that can occur in the worker pool
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PoolError {
    /// Worker pool is already running with details
    #[error("Worker pool '{pool_name}' is already running with {worker_count} workers")]
    AlreadyRunning {
        /// Name of the worker pool
        pool_name: String,
        /// Number of worker threads
        worker_count: usize,
    },

    /// Worker pool is not running
    #[error("Worker pool '{pool_name}' is not running")]
    NotRunning {
        /// Name of the worker pool
        pool_name: String,
    },

    /// Worker pool is draining and no longer admits jobs
    #[error("Worker pool is shutting down ({pending_jobs} jobs pending)")]
    ShuttingDown {
        /// Number of pending jobs
        pending_jobs: usize,
    },

    /// Failed to spawn a worker thread with details
    #[error("Failed to spawn worker thread #{thread_id}: {message}")]
    SpawnError {
        /// ID of the thread that failed to spawn
        thread_id: usize,
        /// Error message
        message: String,
        /// Source IO error
        #[source]
        source: Option<std::io::Error>,
    },

    /// Failed to join a worker thread
    #[error("Failed to join worker thread #{thread_id}: {message}")]
    JoinError {
        /// ID of the thread that failed to join
        thread_id: usize,
        /// Error message
        message: String,
    },

    /// Invalid configuration with parameter
    #[error("Invalid configuration for '{parameter}': {message}")]
    InvalidConfig {
        /// Configuration parameter name
        parameter: String,
        /// Error message
        message: String,
    },

    /// General error
    #[error("{0}")]
    Other(String),
}

impl PoolError {
    /// Create an already running error
    pub fn already_running(pool_name: impl Into<String>, worker_count: usize) -> Self {
        PoolError::AlreadyRunning {
            pool_name: pool_name.into(),
            worker_count,
        }
    }

    /// Create a not running error
    pub fn not_running(pool_name: impl Into<String>) -> Self {
        PoolError::NotRunning {
            pool_name: pool_name.into(),
        }
    }

    /// Create a shutting down error
    pub fn shutting_down(pending_jobs: usize) -> Self {
        PoolError::ShuttingDown { pending_jobs }
    }

    /// Create a spawn error
    pub fn spawn(thread_id: usize, message: impl Into<String>) -> Self {
        PoolError::SpawnError {
            thread_id,
            message: message.into(),
            source: None,
        }
    }

    /// Create a spawn error with source
    pub fn spawn_with_source(
        thread_id: usize,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        PoolError::SpawnError {
            thread_id,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a join error
    pub fn join(thread_id: usize, message: impl Into<String>) -> Self {
        PoolError::JoinError {
            thread_id,
            message: message.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        PoolError::InvalidConfig {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        PoolError::Other(msg.into())
    }
}
