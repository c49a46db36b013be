// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::cmp::min;
use std::time::Duration;

use crate::constants::{DEFAULT_DELAY_CEILING, DEFAULT_INITIAL_DELAY};

/// A wait schedule that doubles from an initial delay up to a ceiling.
///
/// The first delay is the initial delay; each following delay is twice the
/// previous one; no delay ever exceeds the ceiling. Once the ceiling is
/// reached every further delay equals the ceiling, so the schedule is
/// infinite. Pair it with an attempt budget or a deadline to bound an
/// acquisition.
///
/// There is no jitter: two schedules built from the same values produce the
/// same delays, which keeps retry timing exactly predictable.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use grapnel::Backoff;
///
/// let backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(1));
/// let delays: Vec<_> = backoff.schedule().take(6).collect();
///
/// // 100ms, 200ms, 400ms, 800ms, then clamped at 1s
/// assert_eq!(delays[3], Duration::from_millis(800));
/// assert_eq!(delays[5], Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    initial: Duration,
    ceiling: Duration,
}

impl Backoff {
    /// Creates a schedule description that starts at `initial` and doubles up
    /// to `ceiling`.
    ///
    /// An `initial` above `ceiling` saturates immediately; every delay is then
    /// the ceiling. A zero `initial` produces a schedule of zero-length waits.
    #[must_use]
    pub fn new(initial: Duration, ceiling: Duration) -> Self {
        Self { initial, ceiling }
    }

    /// The first delay of the schedule, before clamping to the ceiling.
    #[must_use]
    pub fn initial(&self) -> Duration {
        self.initial
    }

    /// The delay the schedule never exceeds.
    #[must_use]
    pub fn ceiling(&self) -> Duration {
        self.ceiling
    }

    /// Produces the delays of the schedule, lazily.
    ///
    /// The returned iterator is infinite and never returns `None`.
    #[must_use]
    pub fn schedule(&self) -> Schedule {
        Schedule {
            next: self.initial,
            ceiling: self.ceiling,
        }
    }
}

impl Default for Backoff {
    /// The default schedule: 1 second doubling up to 16 seconds.
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_DELAY, DEFAULT_DELAY_CEILING)
    }
}

/// The delays of a [`Backoff`], produced one wait at a time.
#[derive(Debug, Clone)]
pub struct Schedule {
    next: Duration,
    ceiling: Duration,
}

impl Iterator for Schedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Self::Item> {
        let value = min(self.next, self.ceiling);
        self.next = value.saturating_mul(2);
        Some(value)
    }
}
