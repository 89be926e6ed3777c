//! # poolrun
//!
//! A minimal fixed-size worker pool with a command-line demonstration front
//! end: submit N independent jobs to M pooled threads, then shut the pool
//! down gracefully without waiting for the drain.
//!
//! ## Features
//!
//! - **Worker Pool**: fixed worker count, created once and reused across jobs
//! - **Unbounded FIFO Queue**: submissions never block and carry no
//!   backpressure signal, built on crossbeam channels
//! - **Graceful Shutdown**: a non-blocking request stops admissions while
//!   every already-admitted job still runs to completion
//! - **Explicit Wait**: `await_termination` joins the drain when a caller
//!   needs determinism (tests); the demo runner never does
//! - **Panic Isolation**: a failing or panicking job is counted and logged,
//!   and its worker keeps running
//!
//! ## Quick Start
//!
//! ```rust
//! use poolrun::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let pool = WorkerPool::with_threads(4)?;
//! pool.start()?;
//!
//! for i in 0..10 {
//!     pool.submit(IndexedJob::new(i))?;
//! }
//!
//! // Non-blocking: returns before the jobs finish
//! pool.shutdown();
//!
//! // Optional explicit wait for deterministic teardown
//! pool.await_termination()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Closures as jobs
//!
//! ```rust
//! use poolrun::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let pool = WorkerPool::with_threads(2)?;
//! pool.start()?;
//!
//! pool.execute(|| {
//!     println!("running on a pool thread");
//!     Ok(())
//! })?;
//!
//! pool.shutdown();
//! pool.await_termination()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## The demo binary
//!
//! ```text
//! poolrun <number-of-jobs> <number-of-threads>
//! ```
//!
//! Submits the jobs, requests shutdown, and prints `Last line <thread-name>`
//! while the pool is still draining. Invalid arguments print a usage message
//! and exit with status 0, a long-standing quirk of this demo that is kept
//! on purpose.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod args;
pub mod core;
pub mod pool;
pub mod prelude;
pub mod queue;
pub mod runner;

pub use crate::core::{BoxedJob, ClosureJob, Job, PoolError, Result};
pub use crate::pool::{WorkerPool, WorkerPoolConfig, WorkerStats};
