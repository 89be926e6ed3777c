//! Unbounded FIFO admission queue using crossbeam channels.
//!
//! This is the only queue discipline of the pool: jobs are admitted in
//! submission order without backpressure, and a closed queue still hands out
//! already-admitted jobs until it is drained.

use crate::core::BoxedJob;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Errors that can occur during queue operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// Queue is closed and not accepting new jobs
    Closed,
    /// No job available within the receive timeout
    Empty,
    /// Queue is closed and fully drained
    Disconnected,
}

impl std::fmt::Display for QueueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueError::Closed => write!(f, "queue is closed"),
            QueueError::Empty => write!(f, "queue is empty"),
            QueueError::Disconnected => write!(f, "queue is disconnected"),
        }
    }
}

impl std::error::Error for QueueError {}

/// Result type for queue operations.
pub type QueueResult<T> = std::result::Result<T, QueueError>;

/// An unbounded FIFO job queue with a close-then-drain protocol.
///
/// Sending never blocks. After [`close`](ChannelQueue::close), sends are
/// rejected but receivers keep draining until the queue is empty, at which
/// point they observe [`QueueError::Disconnected`] and can exit.
pub struct ChannelQueue {
    sender: Sender<BoxedJob>,
    receiver: Receiver<BoxedJob>,
    closed: AtomicBool,
}

impl ChannelQueue {
    /// Creates a new open, unbounded queue.
    pub fn unbounded() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            closed: AtomicBool::new(false),
        }
    }

    /// Admits a job. Never blocks.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Closed`] once the queue has been closed.
    pub fn send(&self, job: BoxedJob) -> QueueResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(QueueError::Closed);
        }
        self.sender.send(job).map_err(|_| QueueError::Closed)
    }

    /// Receives a job, waiting up to `timeout`.
    ///
    /// # Returns
    ///
    /// - `Ok(job)` if a job was received within the timeout
    /// - `Err(QueueError::Empty)` if no job arrived and the queue is open
    /// - `Err(QueueError::Disconnected)` if the queue is closed and drained
    pub fn recv_timeout(&self, timeout: Duration) -> QueueResult<BoxedJob> {
        if self.closed.load(Ordering::SeqCst) && self.receiver.is_empty() {
            return Err(QueueError::Disconnected);
        }

        match self.receiver.recv_timeout(timeout) {
            Ok(job) => Ok(job),
            Err(RecvTimeoutError::Timeout) => {
                if self.closed.load(Ordering::SeqCst) && self.receiver.is_empty() {
                    Err(QueueError::Disconnected)
                } else {
                    Err(QueueError::Empty)
                }
            }
            Err(RecvTimeoutError::Disconnected) => Err(QueueError::Disconnected),
        }
    }

    /// Closes the queue. Already-admitted jobs can still be received.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Returns `true` if the queue has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Returns the number of jobs waiting in the queue.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if no jobs are waiting.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}
