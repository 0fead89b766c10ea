//! Deferred actions keyed on the virtual clock.
//!
//! Timed stages (customs, OCR, gate checks, pickups, dropoffs) are not
//! waited on. Each one is stored as a typed action due at a simulated
//! millisecond and drained once per tick. Entries due at the same instant
//! fire in scheduling order. The consumer re-checks the entity's state
//! before acting, so a stale action is harmless.

use std::collections::BTreeMap;

/// Ordered queue of actions due at simulated times.
#[derive(Debug, Clone)]
pub struct TimerQueue<A> {
    queue: BTreeMap<(u64, u64), A>,
    next_seq: u64,
}

impl<A> TimerQueue<A> {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            queue: BTreeMap::new(),
            next_seq: 0,
        }
    }

    /// Schedule `action` to fire once the clock reaches `due_ms`.
    pub fn schedule(&mut self, due_ms: u64, action: A) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.queue.insert((due_ms, seq), action);
    }

    /// Remove and return every action due at or before `now_ms`, earliest
    /// first.
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<A> {
        let Some(split) = now_ms.checked_add(1) else {
            return std::mem::take(&mut self.queue).into_values().collect();
        };
        let later = self.queue.split_off(&(split, 0));
        std::mem::replace(&mut self.queue, later)
            .into_values()
            .collect()
    }

    /// Due time of the earliest pending action.
    pub fn next_due(&self) -> Option<u64> {
        self.queue.keys().next().map(|&(due, _)| due)
    }

    /// Number of pending actions.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_only_due_actions() {
        let mut timers = TimerQueue::new();
        timers.schedule(2000, "late");
        timers.schedule(1000, "early");
        assert_eq!(timers.next_due(), Some(1000));

        assert!(timers.drain_due(999).is_empty());
        assert_eq!(timers.drain_due(1000), vec!["early"]);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.drain_due(5000), vec!["late"]);
        assert!(timers.is_empty());
    }

    #[test]
    fn same_instant_fires_in_scheduling_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(10, 'a');
        timers.schedule(10, 'b');
        timers.schedule(5, 'c');
        assert_eq!(timers.drain_due(10), vec!['c', 'a', 'b']);
    }

    #[test]
    fn drain_at_end_of_time_takes_everything() {
        let mut timers = TimerQueue::new();
        timers.schedule(u64::MAX, 1);
        timers.schedule(3, 2);
        assert_eq!(timers.drain_due(u64::MAX), vec![2, 1]);
    }
}
