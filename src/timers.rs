//! Pending-timer bookkeeping for the cooperative event loop.
//!
//! A [`TimerSet`] holds deadlines together with the event each one should deliver.
//! Nothing fires on its own: the owner calls [`TimerSet::pop_due`] with the current time
//! and handles whatever comes out. Cancelling is removing the entry, so a cancelled timer
//! can never deliver its event.

use std::time::Duration;

/// Handle for one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Timer<E> {
    id: TimerId,
    deadline: Duration,
    event: E,
}

/// Timer that came due, with the deadline it was scheduled for.
#[derive(Debug, PartialEq)]
pub struct Fired<E> {
    pub id: TimerId,
    pub deadline: Duration,
    pub event: E,
}

#[derive(Debug)]
pub struct TimerSet<E> {
    next_id: u64,
    pending: Vec<Timer<E>>,
}

impl<E> Default for TimerSet<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<E> TimerSet<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` to fire at the absolute time `deadline`.
    pub fn schedule(&mut self, deadline: Duration, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Timer {
            id,
            deadline,
            event,
        });
        id
    }

    /// Remove a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.id != id);
        self.pending.len() != before
    }

    /// Drop every pending timer and return how many there were.
    pub fn clear(&mut self) -> usize {
        let cleared = self.pending.len();
        self.pending.clear();
        cleared
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.pending.iter().any(|timer| timer.id == id)
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|timer| timer.deadline).min()
    }

    /// Take the earliest timer whose deadline is at or before `now`.
    ///
    /// Ties go to the timer scheduled first.
    pub fn pop_due(&mut self, now: Duration) -> Option<Fired<E>> {
        let position = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.deadline <= now)
            .min_by_key(|(_, timer)| (timer.deadline, timer.id))
            .map(|(position, _)| position)?;

        let timer = self.pending.remove(position);
        Some(Fired {
            id: timer.id,
            deadline: timer.deadline,
            event: timer.event,
        })
    }
}
