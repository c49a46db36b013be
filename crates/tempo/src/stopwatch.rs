// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;
#[cfg(any(feature = "test-util", test))]
use std::time::Instant;

use crate::Clock;

/// Measures the time elapsed since its creation.
///
/// The stopwatch observes the [`Clock`] it was created from, so tests can control
/// the measured time through a [`ManualClock`][crate::ManualClock].
///
/// # Examples
///
/// ```
/// use tempo::{Clock, Stopwatch};
///
/// # fn measure(clock: &Clock) {
/// let watch = Stopwatch::new(clock);
///
/// // Do some work.
///
/// println!("the work took {:?}", watch.elapsed());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Stopwatch(StopwatchRepr);

impl Stopwatch {
    /// Starts a new stopwatch reading the given clock.
    #[cfg_attr(
        not(any(feature = "test-util", test)),
        expect(unused_variables, reason = "without test-util, time comes straight from the operating system")
    )]
    #[must_use]
    pub fn new(clock: &Clock) -> Self {
        #[cfg(not(any(feature = "test-util", test)))]
        {
            Self(StopwatchRepr::System(std::time::Instant::now()))
        }

        #[cfg(any(feature = "test-util", test))]
        {
            Self(StopwatchRepr::Clock(clock.clone(), clock.instant()))
        }
    }

    /// Returns the time elapsed since the stopwatch was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        match &self.0 {
            #[cfg(not(any(feature = "test-util", test)))]
            StopwatchRepr::System(start) => start.elapsed(),
            #[cfg(any(feature = "test-util", test))]
            StopwatchRepr::Clock(clock, start) => clock.instant().saturating_duration_since(*start),
        }
    }
}

impl From<Stopwatch> for Duration {
    fn from(watch: Stopwatch) -> Self {
        watch.elapsed()
    }
}

#[derive(Debug, Clone)]
enum StopwatchRepr {
    #[cfg(not(any(feature = "test-util", test)))]
    System(std::time::Instant),
    #[cfg(any(feature = "test-util", test))]
    Clock(Clock, Instant),
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::ManualClock;

    #[test]
    fn assert_types() {
        static_assertions::assert_impl_all!(Stopwatch: Send, Sync, Clone);
    }

    #[test]
    fn elapsed_with_control() {
        let control = ManualClock::new();
        let watch = Stopwatch::new(&control.to_clock());

        () = control.advance(Duration::from_secs(5));

        assert_eq!(watch.elapsed(), Duration::from_secs(5));
    }

    #[test]
    fn elapsed_tracks_further_advances() {
        let control = ManualClock::new();
        let watch = Stopwatch::new(&control.to_clock());

        () = control.advance(Duration::from_secs(1));
        assert_eq!(watch.elapsed(), Duration::from_secs(1));

        () = control.advance(Duration::from_millis(500));
        assert_eq!(watch.elapsed(), Duration::from_millis(1500));
    }

    #[test]
    fn from_ok() {
        let control = ManualClock::new();
        let watch = Stopwatch::new(&control.to_clock());

        () = control.advance_millis(42);

        assert_eq!(Duration::from(watch), Duration::from_millis(42));
    }
}
