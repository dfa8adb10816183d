use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

// ---------------------------------------------------------------------------
// TimerId
// ---------------------------------------------------------------------------

/// Cancel handle returned by [`Scheduler::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

impl TimerId {
    pub fn get(self) -> u64 {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Delayed delivery of events. Time is measured as elapsed time since the
/// scheduler was created, not wall-clock time.
pub trait Scheduler<E> {
    /// Deliver `event` once `delay` has elapsed from `now()`.
    fn schedule(&mut self, delay: Duration, event: E) -> TimerId;

    /// Drop a pending timer. Returns false if it already fired or was cancelled.
    fn cancel(&mut self, id: TimerId) -> bool;

    fn now(&self) -> Duration;
}

// ---------------------------------------------------------------------------
// TimerQueue
// ---------------------------------------------------------------------------

/// Virtual-time scheduler. Nothing fires on its own: the owner pops due
/// events with [`TimerQueue::pop_due`], either fast-forwarding (tests) or
/// after sleeping until [`TimerQueue::next_deadline`] (real-time driver).
///
/// Events with the same deadline fire in scheduling order.
#[derive(Debug)]
pub struct TimerQueue<E> {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<(Duration, u64), E>,
    deadlines: HashMap<u64, Duration>,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 1,
            pending: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(due, _)| *due)
    }

    /// Remove the earliest event due at or before `until` and move `now` to
    /// its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, E)> {
        let key = *self.pending.keys().next()?;
        if key.0 > until {
            return None;
        }
        let event = self.pending.remove(&key)?;
        self.deadlines.remove(&key.1);
        if key.0 > self.now {
            self.now = key.0;
        }
        Some((TimerId(key.1), event))
    }

    /// Move time forward without firing anything. Time never goes backwards.
    pub fn advance_to(&mut self, t: Duration) {
        if t > self.now {
            self.now = t;
        }
    }
}

impl<E> Scheduler<E> for TimerQueue<E> {
    fn schedule(&mut self, delay: Duration, event: E) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        let due = self.now + delay;
        self.pending.insert((due, id), event);
        self.deadlines.insert(id, due);
        TimerId(id)
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id.0) {
            Some(due) => self.pending.remove(&(due, id.0)).is_some(),
            None => false,
        }
    }

    fn now(&self) -> Duration {
        self.now
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
