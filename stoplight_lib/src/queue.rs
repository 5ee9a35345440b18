//! A generic blocking message queue.
//!
//! [`BlockingQueue`] is the handoff primitive between the light's updater thread and the
//! threads waiting on a phase. It is unbounded, protected by a mutex and a condition
//! variable, and **LIFO**: `recv` always takes the most recently sent message. A slow
//! consumer therefore sees the latest message first and may drain older ones out of
//! chronological order. This is the intended contract for "wait for the newest state"
//! consumers, not an accident; use a FIFO channel if arrival order matters.

use std::error;
use std::fmt;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use thiserror::Error;

/// An error returned from [`BlockingQueue::send`] when the queue has been closed.
///
/// The message could not be enqueued, so ownership is handed back to the caller as the
/// public field.
#[derive(PartialEq, Eq, Clone, Copy)]
pub struct SendError<T>(pub T);

impl<T> fmt::Debug for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SendError(..)")
    }
}

impl<T> fmt::Display for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sending on a closed queue")
    }
}

impl<T> error::Error for SendError<T> {}

/// An error returned from [`BlockingQueue::recv`] when the queue is closed and drained.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("receiving on an empty, closed queue")]
pub struct RecvError;

/// An error returned from [`BlockingQueue::recv_timeout`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RecvTimeoutError {
    /// The deadline passed with the queue still empty.
    #[error("timed out waiting on an empty queue")]
    Timeout,
    /// The queue is closed and drained, so no message will ever arrive.
    #[error("receiving on an empty, closed queue")]
    Closed,
}

struct Inner<T> {
    /// Messages, newest last. `recv` pops from the back.
    stack: Vec<T>,
    closed: bool,
}

/// An unbounded, thread-safe, LIFO blocking queue.
///
/// [`send`](BlockingQueue::send) never blocks; [`recv`](BlockingQueue::recv) blocks until a
/// message is available or the queue is closed. Closing the queue wakes every blocked
/// receiver; messages still in the queue at that point remain receivable.
///
/// The queue itself is not reference counted. Share it between threads by wrapping it in an
/// [`Arc`](std::sync::Arc) or by embedding it in a shared structure.
pub struct BlockingQueue<T> {
    inner: Mutex<Inner<T>>,
    not_empty: Condvar,
}

impl<T> BlockingQueue<T> {
    /// Creates an empty, open queue.
    pub fn new() -> Self {
        BlockingQueue {
            inner: Mutex::new(Inner {
                stack: Vec::new(),
                closed: false,
            }),
            not_empty: Condvar::new(),
        }
    }

    /// Moves `message` into the queue and wakes one blocked receiver.
    ///
    /// Never blocks. Fails only on a closed queue, in which case ownership of the message is
    /// handed back in the error.
    pub fn send(&self, message: T) -> Result<(), SendError<T>> {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return Err(SendError(message));
        }
        inner.stack.push(message);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Blocks until a message is available and returns the most recently sent one.
    ///
    /// Returns `Err(RecvError)` once the queue is closed and drained. The wait predicate is
    /// re-checked after every wakeup, so spurious wakeups and racing receivers never yield a
    /// message from an empty queue.
    pub fn recv(&self) -> Result<T, RecvError> {
        let mut inner = self.inner.lock().unwrap();
        loop {
            if let Some(message) = inner.stack.pop() {
                return Ok(message);
            }
            if inner.closed {
                return Err(RecvError);
            }
            inner = self.not_empty.wait(inner).unwrap();
        }
    }

    /// Like [`recv`](BlockingQueue::recv), but gives up once `timeout` has elapsed.
    ///
    /// The deadline is computed once at entry, so wakeups that find the queue empty do not
    /// extend the wait.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        let deadline = Instant::now() + timeout;
        let mut inner = self.inner.lock().unwrap();
        loop {
            if let Some(message) = inner.stack.pop() {
                return Ok(message);
            }
            if inner.closed {
                return Err(RecvTimeoutError::Closed);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(RecvTimeoutError::Timeout);
            }
            let (guard, _) = self.not_empty.wait_timeout(inner, deadline - now).unwrap();
            inner = guard;
        }
    }

    /// Removes and returns the most recently sent message, or `None` if the queue is empty.
    pub fn try_recv(&self) -> Option<T> {
        self.inner.lock().unwrap().stack.pop()
    }

    /// Closes the queue and wakes every blocked receiver.
    ///
    /// Subsequent `send` calls fail; messages already queued remain receivable. Calling
    /// `close` again has no effect.
    pub fn close(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.closed = true;
        self.not_empty.notify_all();
    }

    /// Returns `true` once [`close`](BlockingQueue::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }

    /// Returns the number of queued messages.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().stack.len()
    }

    /// Returns `true` if no messages are queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        BlockingQueue::new()
    }
}
