// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::BTreeMap;
use std::task::Waker;
use std::time::Instant;

/// Unique identifier for a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct TimerKey {
    deadline: Instant,

    /// Sequence number that keeps two timers with the same deadline distinct.
    seq: u32,
}

impl TimerKey {
    const fn new(deadline: Instant, seq: u32) -> Self {
        Self { deadline, seq }
    }

    /// Determines when the timer fires.
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }
}

/// Management of one-shot timers.
///
/// A timer fires at most once; after being triggered it is removed from the collection.
#[derive(Debug, Default)]
pub(crate) struct Timers {
    /// Registered timers, ordered by the instant at which they fire.
    ///
    /// The [`Waker`] belongs to the task awaiting the timer.
    wakers: BTreeMap<TimerKey, Waker>,
    next_seq: u32,
}

impl Timers {
    pub fn len(&self) -> usize {
        self.wakers.len()
    }

    #[cfg(test)]
    fn contains(&self, key: TimerKey) -> bool {
        self.wakers.contains_key(&key)
    }

    /// Registers a new timer that fires at the specified instant.
    ///
    /// Returns a unique [`TimerKey`] that can be used to unregister the timer.
    pub fn register(&mut self, deadline: Instant, waker: Waker) -> TimerKey {
        // The sequence number may wrap; it only disambiguates timers that share a
        // deadline, so reuse after 2^32 registrations is harmless.
        self.next_seq = self.next_seq.wrapping_add(1);
        let key = TimerKey::new(deadline, self.next_seq);

        self.wakers.insert(key, waker);

        key
    }

    /// Unregisters a timer with the given key.
    ///
    /// If the timer was not found, this operation is a no-op.
    pub fn unregister(&mut self, key: TimerKey) {
        self.wakers.remove(&key);
    }

    /// Returns the instant when the next timer fires, or `None` if no timers are registered.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.wakers.keys().next().map(TimerKey::deadline)
    }

    /// Wakes every timer whose deadline is at or before `now`.
    ///
    /// Returns the deadline of the next pending timer, or `None` if none remain.
    #[cfg_attr(test, mutants::skip)] // Causes test timeout.
    pub fn advance(&mut self, now: Instant) -> Option<Instant> {
        while let Some(entry) = self.wakers.first_entry() {
            if entry.key().deadline() > now {
                return Some(entry.key().deadline());
            }

            let (_, waker) = entry.remove_entry();
            waker.wake();
        }

        None
    }
}
