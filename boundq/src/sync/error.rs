//! Errors reported by [`BoundedQueue`](super::bounded::BoundedQueue) operations.
//!
//! `QueueFull` and `QueueEmpty` are expected, local conditions from the
//! try-variants. The queue is never mutated when one is returned. The
//! blocking variants never produce them; they wait instead.

use thiserror::Error;

/// Returned by `try_enqueue` when every slot is occupied.
///
/// Carries the rejected value so the caller can retry or dispose of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("queue is full")]
pub struct QueueFull<T>(pub T);

impl<T> QueueFull<T> {
    /// Returns the value that could not be enqueued.
    pub fn into_inner(self) -> T {
        self.0
    }
}

/// Returned by `try_dequeue` when the queue holds no elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("queue is empty")]
pub struct QueueEmpty;

/// Error from a blocking enqueue with a deadline or cancel token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnqueueError<T> {
    /// No slot freed up before the deadline.
    #[error("timed out waiting for space")]
    TimedOut(T),
    /// The cancel token fired while waiting.
    #[error("enqueue cancelled")]
    Cancelled(T),
}

impl<T> EnqueueError<T> {
    /// Returns the value that could not be enqueued.
    pub fn into_inner(self) -> T {
        match self {
            Self::TimedOut(v) | Self::Cancelled(v) => v,
        }
    }

    /// Returns `true` for [`EnqueueError::TimedOut`].
    pub const fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut(_))
    }

    /// Returns `true` for [`EnqueueError::Cancelled`].
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Error from a blocking dequeue with a deadline or cancel token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DequeueError {
    /// No element arrived before the deadline.
    #[error("timed out waiting for data")]
    TimedOut,
    /// The cancel token fired while waiting.
    #[error("dequeue cancelled")]
    Cancelled,
}

impl DequeueError {
    /// Returns `true` for [`DequeueError::TimedOut`].
    pub const fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }

    /// Returns `true` for [`DequeueError::Cancelled`].
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Why a wait ended without the predicate becoming true.
///
/// Shared by both directions so the wait loop is written once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WaitAbort {
    TimedOut,
    Cancelled,
}

impl WaitAbort {
    pub(crate) fn into_enqueue<T>(self, value: T) -> EnqueueError<T> {
        match self {
            Self::TimedOut => EnqueueError::TimedOut(value),
            Self::Cancelled => EnqueueError::Cancelled(value),
        }
    }

    pub(crate) const fn into_dequeue(self) -> DequeueError {
        match self {
            Self::TimedOut => DequeueError::TimedOut,
            Self::Cancelled => DequeueError::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_returns_value() {
        let err = QueueFull(String::from("payload"));
        assert_eq!(err.to_string(), "queue is full");
        assert_eq!(err.into_inner(), "payload");
    }

    #[test]
    fn test_empty_message() {
        assert_eq!(QueueEmpty.to_string(), "queue is empty");
    }

    #[test]
    fn test_enqueue_error_variants() {
        let timed_out = WaitAbort::TimedOut.into_enqueue(7);
        assert!(timed_out.is_timed_out());
        assert!(!timed_out.is_cancelled());
        assert_eq!(timed_out.to_string(), "timed out waiting for space");
        assert_eq!(timed_out.into_inner(), 7);

        let cancelled = WaitAbort::Cancelled.into_enqueue(8);
        assert!(cancelled.is_cancelled());
        assert_eq!(cancelled.to_string(), "enqueue cancelled");
        assert_eq!(cancelled.into_inner(), 8);
    }

    #[test]
    fn test_dequeue_error_variants() {
        assert_eq!(WaitAbort::TimedOut.into_dequeue(), DequeueError::TimedOut);
        assert_eq!(WaitAbort::Cancelled.into_dequeue(), DequeueError::Cancelled);
        assert!(DequeueError::TimedOut.is_timed_out());
        assert!(DequeueError::Cancelled.is_cancelled());
        assert_eq!(DequeueError::TimedOut.to_string(), "timed out waiting for data");
    }

    #[test]
    fn test_errors_are_std_errors() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        assert_error(&QueueFull(1_i64));
        assert_error(&QueueEmpty);
        assert_error(&EnqueueError::TimedOut(1_i64));
        assert_error(&DequeueError::Cancelled);
    }
}
