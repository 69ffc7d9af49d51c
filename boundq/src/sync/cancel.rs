//! Cooperative cancellation for blocking queue operations.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation flag.
///
/// Clones observe the same flag. Cancelling is one-way and idempotent. A
/// waiter blocked in a cancellable enqueue/dequeue notices the flag within
/// the queue's configured poll interval, re-checks its predicate under the
/// lock, and only then returns `Cancelled`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
///
/// use boundq::sync::bounded::BoundedQueue;
/// use boundq::sync::cancel::CancelToken;
///
/// let queue = Arc::new(BoundedQueue::<i64>::new(1).unwrap());
/// let token = CancelToken::new();
///
/// let waiter = {
///     let queue = Arc::clone(&queue);
///     let token = token.clone();
///     thread::spawn(move || queue.dequeue_cancellable(&token))
/// };
///
/// token.cancel();
/// assert!(waiter.join().unwrap().unwrap_err().is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the token. Every clone observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called on any clone.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_token_not_cancelled() {
        assert!(!CancelToken::new().is_cancelled());
    }

    #[test]
    fn test_cancel_visible_through_clone() {
        let token = CancelToken::new();
        let clone = token.clone();

        clone.cancel();

        assert!(token.is_cancelled());
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let token = CancelToken::new();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_cancel_from_other_thread() {
        let token = CancelToken::new();
        let remote = token.clone();

        std::thread::spawn(move || remote.cancel()).join().unwrap();

        assert!(token.is_cancelled());
    }
}
