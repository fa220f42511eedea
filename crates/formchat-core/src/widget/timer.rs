//! Cancelable timer queue driven by the host clock.
//!
//! The host page owns time. It reports the current time through
//! [`TimerQueue::pop_due`]; the queue hands back due tasks one at a time, in
//! deadline order, so a task that schedules a follow-up timer sees it fire in
//! the same advance if the follow-up is also due.

use std::collections::{BTreeMap, HashMap};

/// Handle returned by [`TimerQueue::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
pub struct TimerQueue<T> {
    now_ms: u64,
    next_id: u64,
    /// Ordered by (deadline, id): ties fire in scheduling order.
    pending: BTreeMap<(u64, u64), T>,
    deadlines: HashMap<u64, u64>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            pending: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    /// Current clock reading in milliseconds.
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Number of timers that have neither fired nor been cancelled.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Schedule `task` to fire `delay_ms` after the current clock reading.
    pub fn schedule(&mut self, delay_ms: u64, task: T) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        let deadline = self.now_ms.saturating_add(delay_ms);
        self.pending.insert((deadline, id), task);
        self.deadlines.insert(id, deadline);
        TimerId(id)
    }

    /// Cancel a pending timer. Returns the task if it had not fired yet.
    pub fn cancel(&mut self, timer: TimerId) -> Option<T> {
        let deadline = self.deadlines.remove(&timer.0)?;
        self.pending.remove(&(deadline, timer.0))
    }

    /// Pop the earliest task due at or before `until_ms`, moving the clock to
    /// its deadline. Returns `None` (and moves the clock to `until_ms`) when
    /// nothing else is due.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerId, T)> {
        let next = self.pending.first_key_value().map(|(&key, _)| key);
        let Some((deadline, id)) = next.filter(|(deadline, _)| *deadline <= until_ms) else {
            self.now_ms = self.now_ms.max(until_ms);
            return None;
        };
        let task = self.pending.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        self.now_ms = self.now_ms.max(deadline);
        Some((TimerId(id), task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.schedule(300, "late");
        q.schedule(10, "early");
        q.schedule(10, "early-second");

        assert_eq!(q.pop_due(1_000).map(|(_, t)| t), Some("early"));
        assert_eq!(q.now(), 10);
        assert_eq!(q.pop_due(1_000).map(|(_, t)| t), Some("early-second"));
        assert_eq!(q.pop_due(1_000).map(|(_, t)| t), Some("late"));
        assert_eq!(q.now(), 300);
        assert!(q.pop_due(1_000).is_none());
        assert_eq!(q.now(), 1_000);
    }

    #[test]
    fn test_not_yet_due_stays_pending() {
        let mut q = TimerQueue::new();
        q.schedule(300, ());
        assert!(q.pop_due(299).is_none());
        assert_eq!(q.now(), 299);
        assert_eq!(q.len(), 1);
        assert!(q.pop_due(300).is_some());
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut q = TimerQueue::new();
        let id = q.schedule(10, "cancelled");
        q.schedule(20, "kept");
        assert_eq!(q.cancel(id), Some("cancelled"));
        assert_eq!(q.cancel(id), None);
        assert_eq!(q.pop_due(100).map(|(_, t)| t), Some("kept"));
        assert!(q.is_empty());
    }

    #[test]
    fn test_schedule_is_relative_to_clock() {
        let mut q = TimerQueue::new();
        assert!(q.pop_due(500).is_none());
        q.schedule(10, ());
        assert!(q.pop_due(509).is_none());
        assert!(q.pop_due(510).is_some());
    }
}
