//! Worker pool and worker thread types

pub mod worker;
pub mod worker_pool;

pub use worker::{Worker, WorkerStats};
pub use worker_pool::{WorkerPool, WorkerPoolConfig};
