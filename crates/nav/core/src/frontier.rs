//! Priority-ordered open set for A*.
//!
//! A binary min-heap keyed by total estimated cost `f`, with ties broken by
//! insertion order so expansion is fully deterministic. Decreasing the priority
//! of a queued position pushes a fresh entry and lazily discards the stale one
//! on pop; a position index answers membership in O(1).
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::collections::HashMap;

use crate::geometry::Position;

#[derive(Clone, Copy, Debug)]
struct Entry {
    priority: f64,
    sequence: u64,
    position: Position,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl Ord for Entry {
    // Reversed so that `BinaryHeap` (a max-heap) pops the lowest priority,
    // and the earliest sequence among equal priorities.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-priority queue of grid positions with membership lookup.
#[derive(Clone, Debug, Default)]
pub struct PriorityFrontier {
    heap: BinaryHeap<Entry>,
    /// Live priority per queued position.
    queued: HashMap<Position, f64>,
    next_sequence: u64,
}

impl PriorityFrontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `position`, or lowers its priority when already queued.
    ///
    /// Returns false when the position is already queued with a priority less
    /// than or equal to `priority` (nothing changes).
    pub fn push(&mut self, position: Position, priority: f64) -> bool {
        if let Some(&current) = self.queued.get(&position)
            && current <= priority
        {
            return false;
        }

        self.queued.insert(position, priority);
        self.heap.push(Entry {
            priority,
            sequence: self.next_sequence,
            position,
        });
        self.next_sequence += 1;
        true
    }

    /// Removes and returns the position with the lowest priority.
    pub fn pop(&mut self) -> Option<(Position, f64)> {
        while let Some(entry) = self.heap.pop() {
            match self.queued.get(&entry.position) {
                Some(&live) if live == entry.priority => {
                    self.queued.remove(&entry.position);
                    return Some((entry.position, entry.priority));
                }
                // Superseded by a cheaper push, or already popped.
                _ => continue,
            }
        }
        None
    }

    /// Lowest queued priority without removing it.
    pub fn peek_priority(&mut self) -> Option<f64> {
        while let Some(entry) = self.heap.peek() {
            if self.queued.get(&entry.position) == Some(&entry.priority) {
                return Some(entry.priority);
            }
            self.heap.pop();
        }
        None
    }

    #[inline]
    pub fn contains(&self, position: Position) -> bool {
        self.queued.contains_key(&position)
    }

    /// Current priority of a queued position.
    #[inline]
    pub fn priority_of(&self, position: Position) -> Option<f64> {
        self.queued.get(&position).copied()
    }

    /// Number of distinct queued positions.
    #[inline]
    pub fn len(&self) -> usize {
        self.queued.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.queued.clear();
        self.next_sequence = 0;
    }
}
