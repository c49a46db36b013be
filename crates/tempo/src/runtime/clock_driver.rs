// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Instant;

use crate::runtime::ClockGone;
use crate::state::ClockState;

/// Advances the timers of a [`Clock`][crate::Clock].
///
/// A driver is obtained from [`Clock::new_shared`][crate::Clock::new_shared] and belongs to
/// whatever drives the clock, typically a background task or thread. It is deliberately not
/// cloneable so there is a single place responsible for advancing timers.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, Instant};
///
/// use tempo::Clock;
///
/// let (clock, mut driver) = Clock::new_shared();
///
/// std::thread::spawn(move || {
///     loop {
///         std::thread::sleep(Duration::from_millis(10));
///
///         if driver.advance_timers(Instant::now()).is_err() {
///             // Every clock handle has been dropped; nothing left to drive.
///             break;
///         }
///     }
/// });
/// # drop(clock);
/// ```
#[derive(Debug)]
pub struct ClockDriver(ClockState);

impl ClockDriver {
    pub(crate) fn new(state: ClockState) -> Self {
        Self(state)
    }

    /// Fires every timer whose deadline is at or before `now` and reports the next deadline.
    ///
    /// Returns `Ok(None)` when no timers remain registered. Returns [`ClockGone`] once all
    /// clock handles sharing this driver's state have been dropped, at which point the caller
    /// should stop driving.
    ///
    /// For a clock controlled by a [`ManualClock`][crate::ManualClock], timers advance through
    /// the control rather than the driver; this method then only reports the next deadline.
    #[expect(
        clippy::needless_pass_by_ref_mut,
        reason = "the mut forces exclusive ownership of the driver"
    )]
    pub fn advance_timers(&mut self, now: Instant) -> Result<Option<Instant>, ClockGone> {
        if self.0.ownership_count() == 1 {
            // Only the driver itself still holds the state.
            return Err(ClockGone);
        }

        match &self.0 {
            #[cfg(any(feature = "test-util", test))]
            ClockState::Manual(control) => Ok(control.next_deadline()),
            ClockState::System(timers) => Ok(timers.try_advance(now)),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::task::Waker;
    use std::time::Duration;

    use super::*;
    use crate::{Clock, ManualClock};

    #[test]
    fn assert_types() {
        static_assertions::assert_impl_all!(ClockDriver: Send, Sync);
        static_assertions::assert_not_impl_all!(ClockDriver: Clone);
    }

    #[test]
    fn advance_timers_fires_due_timers() {
        let (clock, mut driver) = Clock::new_shared();
        let now = Instant::now();
        let _key = clock.register_timer(now, Waker::noop().clone());

        let next = driver.advance_timers(now).unwrap();

        assert_eq!(next, None);
        assert_eq!(clock.state().timers_len(), 0);
    }

    #[test]
    fn advance_timers_reports_next_deadline() {
        let (clock, mut driver) = Clock::new_shared();
        let now = Instant::now();
        let deadline = now + Duration::from_secs(5);
        let _key = clock.register_timer(deadline, Waker::noop().clone());

        assert_eq!(driver.advance_timers(now).unwrap(), Some(deadline));
        assert_eq!(clock.state().timers_len(), 1);
    }

    #[test]
    fn advance_timers_without_timers() {
        let (clock, mut driver) = Clock::new_shared();

        assert_eq!(driver.advance_timers(Instant::now()).unwrap(), None);

        drop(clock);
    }

    #[test]
    fn advance_timers_after_clock_dropped() {
        let (clock, mut driver) = Clock::new_shared();
        drop(clock);

        let result = driver.advance_timers(Instant::now());

        assert!(result.is_err());
    }

    #[test]
    fn advance_timers_alive_while_clone_exists() {
        let (clock, mut driver) = Clock::new_shared();
        let clone = clock.clone();
        drop(clock);

        assert!(driver.advance_timers(Instant::now()).is_ok());

        drop(clone);
        assert!(driver.advance_timers(Instant::now()).is_err());
    }

    #[test]
    fn manual_state_reports_without_advancing() {
        let control = ManualClock::new();
        let clock = control.to_clock();
        let deadline = clock.instant() + Duration::from_secs(3);
        let _key = clock.register_timer(deadline, Waker::noop().clone());
        let mut driver = ClockDriver::new(clock.state().clone());

        assert_eq!(driver.advance_timers(Instant::now()).unwrap(), Some(deadline));

        // The control decides when manual timers fire; the driver leaves them alone.
        assert_eq!(control.timers_len(), 1);
    }
}
