//! In-memory ordered buffer with stable priority tiers.

use std::collections::VecDeque;

use crate::core::{ScheduledUnit, TaskQueue};
use crate::util::serde::UnitId;

/// In-memory queue keeping units sorted highest tier first.
///
/// Insertion scans from the head (highest tier) and places the unit
/// immediately before the first unit of strictly lower priority, so units of
/// equal priority keep arrival order. O(n) enqueue, O(1) dequeue; buffers are
/// bounded by queue capacity.
pub struct InMemoryQueue<T> {
    units: VecDeque<ScheduledUnit<T>>,
}

impl<T> InMemoryQueue<T> {
    /// Create an empty queue sized for `capacity` units.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            units: VecDeque::with_capacity(capacity.min(1024)),
        }
    }
}

impl<T> Default for InMemoryQueue<T> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<T: Send> TaskQueue<T> for InMemoryQueue<T> {
    fn enqueue(&mut self, unit: ScheduledUnit<T>) {
        let priority = unit.meta.priority;
        match self.units.iter().position(|u| u.meta.priority < priority) {
            Some(idx) => self.units.insert(idx, unit),
            None => self.units.push_back(unit),
        }
    }

    fn dequeue(&mut self) -> Option<ScheduledUnit<T>> {
        self.units.pop_front()
    }

    fn drain_all(&mut self) -> Vec<ScheduledUnit<T>> {
        self.units.drain(..).collect()
    }

    fn contains(&self, id: &UnitId) -> bool {
        self.units.iter().any(|u| &u.meta.id == id)
    }

    fn len(&self) -> usize {
        self.units.len()
    }
}
