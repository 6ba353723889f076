//! Min-ordered priority queue keyed by a floating-point priority.
//!
//! Entries are ordered by `(priority, payload)`, so equal priorities are
//! popped in ascending payload order. This keeps every solver built on top
//! of the queue deterministic.

use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Entry<T> {
    priority: OrderedFloat<f64>,
    payload: T,
}

/// Binary min-heap of `(priority, payload)` pairs.
#[derive(Debug, Clone)]
pub struct MinQueue<T: Ord> {
    heap: BinaryHeap<Reverse<Entry<T>>>,
}

impl<T: Ord> MinQueue<T> {
    pub fn new() -> Self {
        MinQueue { heap: BinaryHeap::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        MinQueue { heap: BinaryHeap::with_capacity(capacity) }
    }

    pub fn push(&mut self, priority: f64, payload: T) {
        debug_assert!(!priority.is_nan(), "NaN priority");
        self.heap.push(Reverse(Entry { priority: OrderedFloat(priority), payload }));
    }

    /// Remove and return the entry with the smallest priority.
    pub fn pop_min(&mut self) -> Option<(f64, T)> {
        self.heap
            .pop()
            .map(|Reverse(entry)| (entry.priority.into_inner(), entry.payload))
    }

    pub fn peek_min(&self) -> Option<(f64, &T)> {
        self.heap
            .peek()
            .map(|Reverse(entry)| (entry.priority.into_inner(), &entry.payload))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

impl<T: Ord> Default for MinQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_priority_order() {
        let mut queue = MinQueue::new();
        for (p, v) in [(3.5, 'c'), (0.25, 'a'), (7.0, 'd'), (1.0, 'b')] {
            queue.push(p, v);
        }

        assert_eq!(queue.len(), 4);
        assert_eq!(queue.peek_min(), Some((0.25, &'a')));

        let order: Vec<char> = std::iter::from_fn(|| queue.pop_min().map(|(_, v)| v)).collect();
        assert_eq!(order, vec!['a', 'b', 'c', 'd']);
        assert!(queue.is_empty());
        assert_eq!(queue.pop_min(), None);
    }

    #[test]
    fn test_ties_break_on_payload() {
        let mut queue = MinQueue::with_capacity(3);
        queue.push(1.0, (5usize, Some(2usize)));
        queue.push(1.0, (2, Some(9)));
        queue.push(1.0, (2, None));

        assert_eq!(queue.pop_min(), Some((1.0, (2, None))));
        assert_eq!(queue.pop_min(), Some((1.0, (2, Some(9)))));
        assert_eq!(queue.pop_min(), Some((1.0, (5, Some(2)))));
    }

    #[test]
    fn test_interleaved_push_pop() {
        let mut queue = MinQueue::new();
        queue.push(5.0, 5u32);
        queue.push(2.0, 2);
        assert_eq!(queue.pop_min(), Some((2.0, 2)));
        queue.push(1.0, 1);
        queue.push(9.0, 9);
        assert_eq!(queue.pop_min(), Some((1.0, 1)));
        assert_eq!(queue.pop_min(), Some((5.0, 5)));
        assert_eq!(queue.len(), 1);
    }
}
