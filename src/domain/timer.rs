use std::{collections::BTreeMap, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// Deterministic timer queue on a virtual clock.
///
/// Time only moves through [`Timeline::pop_due`] and [`Timeline::settle`],
/// so state machines driven by it behave identically under test and in
/// production where a real clock feeds the elapsed time.
#[derive(Debug)]
pub struct Timeline<E> {
    now: Duration,
    next_seq: u64,
    pending: BTreeMap<(Duration, u64), E>,
}

impl<E> Default for Timeline<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Timeline<E> {
    pub fn new() -> Self {
        Timeline {
            now: Duration::ZERO,
            next_seq: 0,
            pending: BTreeMap::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, delay: Duration, event: E) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert((self.now + delay, seq), event);
        TimerHandle(seq)
    }

    pub fn cancel(&mut self, handle: TimerHandle) -> Option<E> {
        let key = self.pending.keys().find(|(_, seq)| *seq == handle.0).copied()?;
        self.pending.remove(&key)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Time remaining until the earliest pending timer.
    pub fn until_next(&self) -> Option<Duration> {
        self.pending
            .keys()
            .next()
            .map(|(deadline, _)| deadline.saturating_sub(self.now))
    }

    /// Removes the earliest timer due at or before `until`, moving the clock to its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerHandle, E)> {
        let (deadline, seq) = *self.pending.keys().next()?;
        if deadline > until {
            return None;
        }
        let event = self.pending.remove(&(deadline, seq))?;
        self.now = self.now.max(deadline);
        Some((TimerHandle(seq), event))
    }

    /// Moves the clock forward to `until` once every due timer has fired.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}
