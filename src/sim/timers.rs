//! Virtual-time timer queue
//!
//! Stands in for setTimeout/setInterval: the host advances the clock and
//! due timers are popped one at a time in (due time, schedule order).
//! Nothing fires on its own, so a cancelled or cleared timer can never run.

use std::collections::BTreeMap;

/// Handle for cancelling a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Entry<E> {
    id: TimerId,
    /// Some(period) for repeating timers
    period: Option<u64>,
    event: E,
}

#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    now_ms: u64,
    next_seq: u64,
    /// Keyed by (due time, sequence) so equal due times pop in schedule order
    queue: BTreeMap<(u64, u64), Entry<E>>,
}

impl<E: Clone> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_seq: 0,
            queue: BTreeMap::new(),
        }
    }

    /// Current virtual time
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    fn insert(&mut self, due: u64, id: TimerId, period: Option<u64>, event: E) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.insert((due, seq), Entry { id, period, event });
    }

    fn allocate(&mut self) -> TimerId {
        TimerId(self.next_seq)
    }

    /// Fire `event` once, `delay_ms` from now
    pub fn once(&mut self, delay_ms: u64, event: E) -> TimerId {
        let id = self.allocate();
        self.insert(self.now_ms + delay_ms, id, None, event);
        id
    }

    /// Fire `event` every `period_ms`, first after one period
    pub fn every(&mut self, period_ms: u64, event: E) -> TimerId {
        let period = period_ms.max(1);
        let id = self.allocate();
        self.insert(self.now_ms + period, id, Some(period), event);
        id
    }

    /// Remove a timer; returns false if it already fired or was cancelled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|_, e| e.id != id);
        self.queue.len() != before
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its due time. Repeating timers are re-armed before returning.
    pub fn pop_due(&mut self, until: u64) -> Option<(TimerId, E)> {
        let (&(due, seq), _) = self.queue.first_key_value()?;
        if due > until {
            return None;
        }
        let entry = self.queue.remove(&(due, seq))?;
        self.now_ms = self.now_ms.max(due);

        if let Some(period) = entry.period {
            self.insert(due + period, entry.id, Some(period), entry.event.clone());
        }
        Some((entry.id, entry.event))
    }

    /// Move the clock forward once nothing else is due
    pub fn settle(&mut self, until: u64) {
        self.now_ms = self.now_ms.max(until);
    }
}
