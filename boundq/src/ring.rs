//! Core circular buffer algorithm.
//!
//! [`Ring`] is the unsynchronized storage behind [`crate::sync::bounded`]. It
//! owns a fixed number of slots allocated once at construction and tracks the
//! oldest element (`head`), the next write position (`tail`) and the number of
//! stored elements (`len`).
//!
//! # Layout
//!
//! ```text
//!        head            tail
//!         │               │
//!         ▼               ▼
//! ┌─────┬─────┬─────┬─────┬─────┬─────┐
//! │  -  │  a  │  b  │  -  │  -  │  -  │   len = 2, capacity = 6
//! └─────┴─────┴─────┴─────┴─────┴─────┘
//! ```
//!
//! Both cursors only ever move forward and wrap to 0 at `capacity`, so
//! `tail == (head + len) % capacity` holds between operations.
//!
//! # Synchronization
//!
//! `Ring` has no interior mutability. Callers that share it across threads
//! must serialize every call behind a single lock.

/// Fixed-capacity FIFO ring of `T`.
///
/// A slot holding `None` is empty, `Some` is occupied. Dequeueing takes the
/// value out of its slot, so an empty slot never holds a stale element.
pub(crate) struct Ring<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    tail: usize,
    len: usize,
}

impl<T> Ring<T> {
    /// Allocates a ring with `capacity` empty slots.
    ///
    /// `capacity` must be non-zero; [`crate::config::QueueConfig::validate`]
    /// rejects zero before a ring is ever built.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "ring capacity must be greater than 0");

        let slots: Box<[Option<T>]> = std::iter::repeat_with(|| None).take(capacity).collect();

        Self {
            slots,
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Advances a cursor to the next slot index, wrapping to 0 at capacity.
    ///
    /// Equivalent to `(cursor + 1) % capacity` without the division.
    #[inline]
    const fn bump_cursor(cursor: usize, capacity: usize) -> usize {
        let next = cursor + 1;
        if next == capacity { 0 } else { next }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Writes `item` at the tail.
    ///
    /// # Errors
    ///
    /// Returns `Err(item)` untouched if every slot is occupied.
    #[inline]
    pub(crate) fn push(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }

        let slot = &mut self.slots[self.tail];
        debug_assert!(slot.is_none(), "tail slot must be empty");
        *slot = Some(item);

        self.tail = Self::bump_cursor(self.tail, self.capacity());
        self.len += 1;

        Ok(())
    }

    /// Removes the element at the head.
    ///
    /// Returns `None` if the ring is empty.
    #[inline]
    pub(crate) fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let item = self.slots[self.head].take();
        debug_assert!(item.is_some(), "head slot must be occupied");

        self.head = Self::bump_cursor(self.head, self.capacity());
        self.len -= 1;

        item
    }

    /// Moves every stored element out, oldest first, leaving the ring empty.
    pub(crate) fn drain(&mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len);
        while let Some(item) = self.pop() {
            out.push(item);
        }
        out
    }

    #[cfg(test)]
    pub(crate) const fn cursors(&self) -> (usize, usize) {
        (self.head, self.tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_cursor_invariant<T>(ring: &Ring<T>) {
        let (head, tail) = ring.cursors();
        assert!(head < ring.capacity());
        assert!(tail < ring.capacity());
        assert_eq!(tail, (head + ring.len()) % ring.capacity());
    }

    #[test]
    fn test_new_ring_is_empty() {
        let ring = Ring::<i64>::with_capacity(4);

        assert_eq!(ring.capacity(), 4);
        assert_eq!(ring.len(), 0);
        assert!(ring.is_empty());
        assert!(!ring.is_full());
        assert_eq!(ring.cursors(), (0, 0));
    }

    #[test]
    fn test_push_until_full() {
        let mut ring = Ring::with_capacity(3);

        for i in 0..3 {
            assert!(ring.push(i).is_ok(), "Failed to push item {i}");
        }

        assert!(ring.is_full());
        assert_eq!(ring.push(99), Err(99));
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn test_pop_empty() {
        let mut ring = Ring::<i64>::with_capacity(2);
        assert_eq!(ring.pop(), None);
        assert_eq!(ring.cursors(), (0, 0));
    }

    #[test]
    fn test_tail_wraps_to_zero() {
        let mut ring = Ring::with_capacity(3);

        ring.push(1).unwrap();
        ring.push(2).unwrap();
        ring.push(3).unwrap();
        assert_eq!(ring.cursors(), (0, 0));

        assert_eq!(ring.pop(), Some(1));
        ring.push(4).unwrap();
        assert_eq!(ring.cursors(), (1, 1));
        assert_cursor_invariant(&ring);

        assert_eq!(ring.pop(), Some(2));
        assert_eq!(ring.pop(), Some(3));
        assert_eq!(ring.pop(), Some(4));
        assert_eq!(ring.pop(), None);
        assert_cursor_invariant(&ring);
    }

    #[test]
    fn test_wrapping_behavior() {
        let mut ring = Ring::with_capacity(4);

        for round in 0..5 {
            for i in 0..4 {
                ring.push(round * 10 + i).unwrap();
                assert_cursor_invariant(&ring);
            }

            for i in 0..4 {
                assert_eq!(ring.pop(), Some(round * 10 + i));
                assert_cursor_invariant(&ring);
            }
        }
    }

    #[test]
    fn test_interleaved_keeps_invariant() {
        let mut ring = Ring::with_capacity(5);
        let mut next_in = 0u64;
        let mut next_out = 0u64;

        // Push two, pop one: the ring fills and then walks around many laps.
        for _ in 0..200 {
            for _ in 0..2 {
                if ring.push(next_in).is_ok() {
                    next_in += 1;
                }
            }
            if let Some(v) = ring.pop() {
                assert_eq!(v, next_out);
                next_out += 1;
            }
            assert!(ring.len() <= ring.capacity());
            assert_cursor_invariant(&ring);
        }

        assert_eq!(next_in - next_out, ring.len() as u64);
    }

    #[test]
    fn test_drain_returns_fifo_and_empties() {
        let mut ring = Ring::with_capacity(4);
        ring.push("a").unwrap();
        ring.push("b").unwrap();
        ring.pop();
        ring.push("c").unwrap();
        ring.push("d").unwrap();
        ring.push("e").unwrap();

        assert_eq!(ring.drain(), vec!["b", "c", "d", "e"]);
        assert!(ring.is_empty());
        assert_cursor_invariant(&ring);
    }

    #[test]
    fn test_capacity_one() {
        let mut ring = Ring::with_capacity(1);

        for i in 0..10 {
            ring.push(i).unwrap();
            assert_eq!(ring.push(i + 100), Err(i + 100));
            assert_eq!(ring.pop(), Some(i));
            assert_eq!(ring.cursors(), (0, 0));
        }
    }
}
