//! Bounded FIFO queue guarded by one mutex and two condition variables.
//!
//! # Overview
//!
//! [`BoundedQueue`] stores up to `capacity` elements in a circular buffer
//! allocated once at construction. Every operation takes `&self`; share the
//! queue between threads with [`Arc`](std::sync::Arc).
//!
//! | Operation | Full / empty behavior |
//! |-----------|-----------------------|
//! | [`try_enqueue`](BoundedQueue::try_enqueue) | returns [`QueueFull`] with the value |
//! | [`enqueue`](BoundedQueue::enqueue) | blocks until a slot frees up |
//! | [`try_dequeue`](BoundedQueue::try_dequeue) | returns [`QueueEmpty`] |
//! | [`dequeue`](BoundedQueue::dequeue) | blocks until an element arrives |
//! | `*_timeout`, `*_cancellable`, `*_with` | block until success, deadline, or cancel |
//!
//! # Wait protocol
//!
//! ```text
//! Producer                               Consumer
//! ────────────────────────────           ────────────────────────────
//! lock()                                 lock()
//! while full: wait(space_available)      while empty: wait(data_available)
//! write buffer[tail], tail += 1          read buffer[head], head += 1
//! notify_one(data_available)             notify_one(space_available)
//! unlock()                               unlock()
//! ```
//!
//! Each condition variable is only waited on by one direction, so a producer
//! is never woken by another producer's insertion. One insertion frees exactly
//! one element, so waking one waiter is enough. The predicate is re-checked in
//! a loop after every wake, which covers spurious wakeups and several waiters
//! racing for the same slot.
//!
//! Which blocked waiter gets the next slot or element is up to the scheduler.
//! Values are delivered in the order they were committed.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use boundq::sync::bounded::IntQueue;
//!
//! let queue = Arc::new(IntQueue::new(2).unwrap());
//!
//! let consumer = {
//!     let queue = Arc::clone(&queue);
//!     thread::spawn(move || queue.dequeue())
//! };
//!
//! queue.enqueue(42);
//! assert_eq!(consumer.join().unwrap(), 42);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use minstant::Instant;

use super::cancel::CancelToken;
use super::error::{DequeueError, EnqueueError, QueueEmpty, QueueFull, WaitAbort};
use crate::config::{ConfigError, QueueConfig};
use crate::ring::Ring;
use crate::trace::{debug, trace, warn};

/// Timeout specification for blocking operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Wait indefinitely.
    Infinite,
    /// Wait for at most the specified duration.
    Duration(Duration),
}

impl From<Duration> for Timeout {
    fn from(d: Duration) -> Self {
        Self::Duration(d)
    }
}

impl Timeout {
    /// Absolute deadline for this timeout, or `None` to wait without one.
    ///
    /// A duration too large to add to the clock cannot expire in practice, so
    /// it is treated as [`Timeout::Infinite`].
    fn deadline(self) -> Option<Instant> {
        match self {
            Self::Infinite => None,
            Self::Duration(d) => Instant::now().checked_add(d),
        }
    }
}

type RingGuard<'a, T> = MutexGuard<'a, Ring<T>>;

/// Thread-safe bounded FIFO queue.
///
/// The payload defaults to `i64`; [`IntQueue`] names that case. The
/// synchronization does not depend on the payload type.
pub struct BoundedQueue<T = i64> {
    /// Buffer, head, tail and length. Never touched without this lock.
    ring: Mutex<Ring<T>>,
    /// Signaled after a removal. Producers wait here.
    space_available: Condvar,
    /// Signaled after an insertion. Consumers wait here.
    data_available: Condvar,
    /// Immutable copy of the ring's capacity, readable without the lock.
    capacity: usize,
    /// Length mirror for lock-free diagnostics. Written under the lock,
    /// read without it, so readers may see a stale value.
    approx_len: AtomicUsize,
    cancel_poll_interval: Duration,
}

/// The integer queue.
pub type IntQueue = BoundedQueue<i64>;

impl<T> BoundedQueue<T> {
    /// Creates a queue with `capacity` slots.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCapacity`] if `capacity == 0`.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        Self::with_config(QueueConfig::with_capacity(capacity))
    }

    /// Creates a queue from a full [`QueueConfig`].
    ///
    /// The whole buffer is allocated here; no operation allocates afterwards.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] from [`QueueConfig::validate`].
    pub fn with_config(config: QueueConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        debug!(
            capacity = config.capacity,
            poll_interval = ?config.cancel_poll_interval,
            "creating bounded queue"
        );

        Ok(Self {
            ring: Mutex::new(Ring::with_capacity(config.capacity)),
            space_available: Condvar::new(),
            data_available: Condvar::new(),
            capacity: config.capacity,
            approx_len: AtomicUsize::new(0),
            cancel_poll_interval: config.cancel_poll_interval,
        })
    }

    /// Acquires the queue lock.
    ///
    /// No user code runs while the lock is held, so a poisoned lock still
    /// guards a consistent ring and is recovered rather than propagated.
    #[inline]
    fn lock(&self) -> RingGuard<'_, T> {
        self.ring.lock().unwrap_or_else(|poisoned| {
            warn!("recovering poisoned queue lock");
            poisoned.into_inner()
        })
    }

    /// Publishes the length for [`approx_len`](Self::approx_len). Call with the lock held.
    #[inline]
    fn publish_len(&self, ring: &Ring<T>) {
        self.approx_len.store(ring.len(), Ordering::Relaxed);
    }

    /// Bookkeeping after a successful insertion, lock still held.
    #[inline]
    fn inserted(&self, ring: &Ring<T>) {
        self.publish_len(ring);
        self.data_available.notify_one();
    }

    /// Bookkeeping after a successful removal, lock still held.
    #[inline]
    fn removed(&self, ring: &Ring<T>) {
        self.publish_len(ring);
        self.space_available.notify_one();
    }

    /// Adds `value` at the tail without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`QueueFull`] holding `value` if the queue is at capacity. The
    /// queue is left untouched.
    ///
    /// # Example
    ///
    /// ```
    /// use boundq::sync::bounded::IntQueue;
    /// use boundq::sync::error::QueueFull;
    ///
    /// let queue = IntQueue::new(1).unwrap();
    /// assert!(queue.try_enqueue(1).is_ok());
    /// assert_eq!(queue.try_enqueue(2), Err(QueueFull(2)));
    /// ```
    pub fn try_enqueue(&self, value: T) -> Result<(), QueueFull<T>> {
        let mut ring = self.lock();
        ring.push(value).map_err(QueueFull)?;
        self.inserted(&ring);
        Ok(())
    }

    /// Adds `value` at the tail, blocking while the queue is full.
    ///
    /// Never fails. Blocks forever if no consumer ever makes room; use
    /// [`enqueue_timeout`](Self::enqueue_timeout) or
    /// [`enqueue_cancellable`](Self::enqueue_cancellable) to bound the wait.
    pub fn enqueue(&self, value: T) {
        let mut value = value;
        let mut ring = self.lock();
        loop {
            match ring.push(value) {
                Ok(()) => break,
                Err(v) => value = v,
            }
            trace!("producer waiting for space");
            ring = self
                .space_available
                .wait(ring)
                .unwrap_or_else(PoisonError::into_inner);
        }
        self.inserted(&ring);
    }

    /// Removes the oldest element without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`QueueEmpty`] if there is nothing to remove.
    pub fn try_dequeue(&self) -> Result<T, QueueEmpty> {
        let mut ring = self.lock();
        let value = ring.pop().ok_or(QueueEmpty)?;
        self.removed(&ring);
        Ok(value)
    }

    /// Removes the oldest element, blocking while the queue is empty.
    ///
    /// Never fails. Blocks forever if no producer ever supplies a value.
    pub fn dequeue(&self) -> T {
        let mut ring = self.lock();
        let value = loop {
            if let Some(v) = ring.pop() {
                break v;
            }
            trace!("consumer waiting for data");
            ring = self
                .data_available
                .wait(ring)
                .unwrap_or_else(PoisonError::into_inner);
        };
        self.removed(&ring);
        value
    }

    /// Like [`enqueue`](Self::enqueue), giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`EnqueueError::TimedOut`] holding `value` if no slot freed up
    /// in time. The queue is left untouched.
    pub fn enqueue_timeout(
        &self,
        value: T,
        timeout: impl Into<Timeout>,
    ) -> Result<(), EnqueueError<T>> {
        self.enqueue_with(value, timeout, None)
    }

    /// Like [`dequeue`](Self::dequeue), giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`DequeueError::TimedOut`] if nothing arrived in time.
    pub fn dequeue_timeout(&self, timeout: impl Into<Timeout>) -> Result<T, DequeueError> {
        self.dequeue_with(timeout, None)
    }

    /// Like [`enqueue`](Self::enqueue), giving up once `token` is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`EnqueueError::Cancelled`] holding `value`.
    pub fn enqueue_cancellable(
        &self,
        value: T,
        token: &CancelToken,
    ) -> Result<(), EnqueueError<T>> {
        self.enqueue_with(value, Timeout::Infinite, Some(token))
    }

    /// Like [`dequeue`](Self::dequeue), giving up once `token` is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`DequeueError::Cancelled`].
    pub fn dequeue_cancellable(&self, token: &CancelToken) -> Result<T, DequeueError> {
        self.dequeue_with(Timeout::Infinite, Some(token))
    }

    /// Blocking enqueue bounded by a deadline and an optional cancel token.
    ///
    /// Free space is always taken if it exists when the lock is (re)acquired,
    /// even if the deadline has passed or the token has fired. Only when the
    /// queue is still full are the deadline and the token consulted.
    ///
    /// # Errors
    ///
    /// Returns [`EnqueueError`] holding `value` on timeout or cancellation.
    pub fn enqueue_with(
        &self,
        value: T,
        timeout: impl Into<Timeout>,
        cancel: Option<&CancelToken>,
    ) -> Result<(), EnqueueError<T>> {
        let deadline = timeout.into().deadline();
        let mut value = value;
        let mut ring = self.lock();
        loop {
            match ring.push(value) {
                Ok(()) => break,
                Err(v) => value = v,
            }
            trace!("producer waiting for space");
            ring = match self.wait_until(&self.space_available, ring, deadline, cancel) {
                Ok(ring) => ring,
                Err(abort) => {
                    debug!(reason = ?abort, "enqueue gave up");
                    return Err(abort.into_enqueue(value));
                }
            };
        }
        self.inserted(&ring);
        Ok(())
    }

    /// Blocking dequeue bounded by a deadline and an optional cancel token.
    ///
    /// An element present when the lock is (re)acquired is always returned,
    /// even if the deadline has passed or the token has fired.
    ///
    /// # Errors
    ///
    /// Returns [`DequeueError`] on timeout or cancellation.
    pub fn dequeue_with(
        &self,
        timeout: impl Into<Timeout>,
        cancel: Option<&CancelToken>,
    ) -> Result<T, DequeueError> {
        let deadline = timeout.into().deadline();
        let mut ring = self.lock();
        let value = loop {
            if let Some(v) = ring.pop() {
                break v;
            }
            trace!("consumer waiting for data");
            ring = match self.wait_until(&self.data_available, ring, deadline, cancel) {
                Ok(ring) => ring,
                Err(abort) => {
                    debug!(reason = ?abort, "dequeue gave up");
                    return Err(abort.into_dequeue());
                }
            };
        };
        self.removed(&ring);
        Ok(value)
    }

    /// Sleeps on `condvar` once, bounded by `deadline` and the cancel poll
    /// interval.
    ///
    /// Returns the re-acquired guard for the caller to re-check its predicate,
    /// or the reason to stop waiting. The abort check runs before sleeping, so
    /// a caller always re-checks its predicate between the last wake and the
    /// abort.
    fn wait_until<'a>(
        &self,
        condvar: &Condvar,
        guard: RingGuard<'a, T>,
        deadline: Option<Instant>,
        cancel: Option<&CancelToken>,
    ) -> Result<RingGuard<'a, T>, WaitAbort> {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(WaitAbort::Cancelled);
        }

        let remaining = match deadline {
            None => None,
            Some(dl) => match dl.checked_duration_since(Instant::now()) {
                Some(left) if !left.is_zero() => Some(left),
                _ => return Err(WaitAbort::TimedOut),
            },
        };

        let slice = match (remaining, cancel) {
            (remaining, None) => remaining,
            (None, Some(_)) => Some(self.cancel_poll_interval),
            (Some(left), Some(_)) => Some(left.min(self.cancel_poll_interval)),
        };

        let guard = match slice {
            None => condvar.wait(guard).unwrap_or_else(PoisonError::into_inner),
            Some(d) => {
                condvar
                    .wait_timeout(guard, d)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0
            }
        };

        Ok(guard)
    }

    /// Current number of elements, read under the lock.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Best-effort element count read without the lock.
    ///
    /// May be stale by the time it is returned. Only for logging and
    /// diagnostics; use [`len`](Self::len) for anything that affects control
    /// flow.
    #[inline]
    #[must_use]
    pub fn approx_len(&self) -> usize {
        self.approx_len.load(Ordering::Relaxed)
    }

    /// Returns `true` if the queue holds no elements (locked read).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns `true` if every slot is occupied (locked read).
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.lock().is_full()
    }

    /// Maximum number of elements. Fixed at construction.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Consumes the queue, returning the elements still buffered, oldest first.
    ///
    /// The queue holds no external resources, so this is only needed when the
    /// leftovers matter; dropping the queue releases everything too.
    pub fn close(self) -> Vec<T> {
        let mut ring = self.ring.into_inner().unwrap_or_else(PoisonError::into_inner);
        let leftovers = ring.drain();
        debug!(leftovers = leftovers.len(), "closed bounded queue");
        leftovers
    }
}

impl<T> fmt::Display for BoundedQueue<T> {
    /// Renders `Len:<n> Cap:<m>` from the advisory length.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Len:{} Cap:{}", self.approx_len(), self.capacity)
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("len", &self.approx_len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
