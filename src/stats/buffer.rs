// Rolling buffer of recent attack events
//
// Insertion-ordered, bounded; the oldest events are evicted first.

use crate::feed::AttackEvent;
use std::collections::vec_deque::{self, VecDeque};

#[derive(Debug, Clone)]
pub struct RollingBuffer {
    events: VecDeque<AttackEvent>,
    capacity: usize,
}

impl RollingBuffer {
    /// Create an empty buffer; a capacity of 0 is raised to 1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a batch in arrival order, then evict from the front
    ///
    /// Returns the evicted events, oldest first. Eviction cost is
    /// proportional to the excess only.
    pub fn append<I>(&mut self, batch: I) -> Vec<AttackEvent>
    where
        I: IntoIterator<Item = AttackEvent>,
    {
        self.events.extend(batch);
        let excess = self.events.len().saturating_sub(self.capacity);
        self.events.drain(..excess).collect()
    }

    /// Copy of the current contents, oldest first
    #[allow(dead_code)]
    pub fn snapshot(&self) -> Vec<AttackEvent> {
        self.events.iter().cloned().collect()
    }

    /// Borrowing iterator, oldest first
    pub fn iter(&self) -> vec_deque::Iter<'_, AttackEvent> {
        self.events.iter()
    }

    /// The `n` most recent events, newest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &AttackEvent> {
        self.events.iter().rev().take(n)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[allow(dead_code)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
