//! Dispatch queue: bounded FIFO of frame locations.
//!
//! # Architecture
//!
//! ```text
//! Producers (under producer mutex)      Drain task (single consumer)
//! ────────────────────────────────      ────────────────────────────
//! try_push(Frame) ──▶ [F0][F1][P][F2] ──▶ peek_blocking / pop
//! push_blocking(Pause)       ▲
//!                            └ head peek = oldest undrained frame
//! ```
//!
//! Queue order is frame write order is drain order. The consumer peeks,
//! renders, and only then pops, so the head frame stays "undrained" for
//! admission control until its bytes have been copied out.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::store::Cursor;

/// One queue slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entry {
    /// Start of a stored frame.
    Frame(Cursor),
    /// Sentinel: the consumer pauses when it reaches this point.
    Pause,
}

/// Returned by [`DispatchQueue::try_push`] when every slot is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("dispatch queue full")]
pub struct QueueFull;

/// Bounded FIFO with blocking peek for the single consumer.
pub struct DispatchQueue {
    slots: Mutex<VecDeque<Entry>>,
    /// Signalled when an entry is pushed.
    not_empty: Condvar,
    /// Signalled when an entry is popped.
    not_full: Condvar,
    capacity: usize,
}

impl DispatchQueue {
    /// Create an empty queue holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be non-zero");
        Self {
            slots: Mutex::new(VecDeque::with_capacity(capacity)),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Entry>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append without waiting.
    pub fn try_push(&self, entry: Entry) -> Result<(), QueueFull> {
        let mut slots = self.lock();
        if slots.len() >= self.capacity {
            return Err(QueueFull);
        }
        slots.push_back(entry);
        drop(slots);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Append, waiting for a free slot if necessary.
    pub fn push_blocking(&self, entry: Entry) {
        let mut slots = self.lock();
        while slots.len() >= self.capacity {
            slots = self
                .not_full
                .wait(slots)
                .unwrap_or_else(PoisonError::into_inner);
        }
        slots.push_back(entry);
        drop(slots);
        self.not_empty.notify_one();
    }

    /// Head entry without removing it, `None` if empty.
    pub fn peek(&self) -> Option<Entry> {
        self.lock().front().copied()
    }

    /// Head entry without removing it, waiting while the queue is empty.
    pub fn peek_blocking(&self) -> Entry {
        let mut slots = self.lock();
        loop {
            if let Some(&entry) = slots.front() {
                return entry;
            }
            slots = self
                .not_empty
                .wait(slots)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Remove the head entry.
    pub fn pop(&self) -> Option<Entry> {
        let entry = self.lock().pop_front();
        if entry.is_some() {
            self.not_full.notify_one();
        }
        entry
    }

    /// Entries currently queued.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Arena;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn frame(i: usize) -> Entry {
        Entry::Frame(Arena::new(64).cursor(i))
    }

    #[test]
    fn test_fifo_order() {
        let q = DispatchQueue::new(4);
        q.try_push(frame(1)).unwrap();
        q.try_push(Entry::Pause).unwrap();
        q.try_push(frame(2)).unwrap();

        assert_eq!(q.peek(), Some(frame(1)));
        assert_eq!(q.pop(), Some(frame(1)));
        assert_eq!(q.pop(), Some(Entry::Pause));
        assert_eq!(q.pop(), Some(frame(2)));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn test_full_rejects() {
        let q = DispatchQueue::new(2);
        q.try_push(frame(1)).unwrap();
        q.try_push(frame(2)).unwrap();
        assert_eq!(q.try_push(frame(3)), Err(QueueFull));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn test_peek_does_not_remove() {
        let q = DispatchQueue::new(2);
        q.try_push(frame(7)).unwrap();
        assert_eq!(q.peek_blocking(), frame(7));
        assert_eq!(q.peek_blocking(), frame(7));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_peek_blocking_wakes_on_push() {
        let q = Arc::new(DispatchQueue::new(2));
        let consumer = {
            let q = Arc::clone(&q);
            thread::spawn(move || q.peek_blocking())
        };

        thread::sleep(Duration::from_millis(20));
        q.try_push(frame(3)).unwrap();

        assert_eq!(consumer.join().unwrap(), frame(3));
    }

    #[test]
    fn test_push_blocking_waits_for_pop() {
        let q = Arc::new(DispatchQueue::new(1));
        q.try_push(frame(1)).unwrap();

        let producer = {
            let q = Arc::clone(&q);
            thread::spawn(move || q.push_blocking(Entry::Pause))
        };

        thread::sleep(Duration::from_millis(20));
        assert_eq!(q.len(), 1);
        assert_eq!(q.pop(), Some(frame(1)));

        producer.join().unwrap();
        assert_eq!(q.pop(), Some(Entry::Pause));
    }
}
