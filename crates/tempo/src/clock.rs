// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::task::Waker;
use std::time::{Duration, Instant, SystemTime};

use crate::state::ClockState;
use crate::timers::TimerKey;

/// Provides an abstraction for time-related operations.
///
/// Working with time is notoriously difficult to test and control. The clock enables time control
/// in tests while providing zero-cost overhead in production. When the `test-util` feature is
/// enabled, [`ManualClock`][crate::ManualClock] can manipulate the passage of time, which makes
/// tests faster and more reliable.
///
/// The clock is used for:
///
/// - Retrieving the current absolute time in UTC.
/// - Creating [`Stopwatch`][crate::Stopwatch] instances for elapsed-time measurement.
/// - Creating [`Sleep`][crate::Sleep] instances that suspend the current task.
///
/// # Relative and absolute time
///
/// - [`Stopwatch`][crate::Stopwatch]: relative, monotonic time. Prefer it for measuring elapsed
///   time that does not cross process boundaries.
/// - Absolute time via [`system_time()`][Self::system_time]: an absolute point in time in UTC as
///   [`SystemTime`]. Not monotonic; it can move backwards when the operating system adjusts the
///   system clock.
///
/// # Clock construction
///
/// The clock requires a runtime to drive registered timers. This crate provides built-in support
/// for Tokio via [`Clock::new_tokio`] (available with the `tokio` feature). For other async
/// runtimes, use the types in the [`runtime`][crate::runtime] module to drive the clock.
///
/// In tests, construct the clock through [`ManualClock`][crate::ManualClock] or via
/// [`Clock::new_frozen`] (available with the `test-util` feature); the passage of time is then
/// controlled manually and no runtime is needed.
///
/// # Cloning and shared state
///
/// Cloning a clock is inexpensive and every clone shares the same underlying state, including
/// registered timers and, with the `test-util` feature, the controlled passage of time.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use tempo::Clock;
///
/// # async fn sleep_example(clock: &Clock) {
/// let stopwatch = clock.stopwatch();
///
/// // Suspend the task for 10 milliseconds.
/// clock.sleep(Duration::from_millis(10)).await;
///
/// assert!(stopwatch.elapsed() >= Duration::from_millis(10));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Clock(pub(crate) ClockState);

impl Clock {
    /// Creates a new clock driven by the Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context.
    #[cfg(any(feature = "tokio", test))]
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Causes test timeout.
    pub fn new_tokio() -> Self {
        Self::new_tokio_core().0
    }

    #[cfg(any(feature = "tokio", test))]
    fn new_tokio_core() -> (Self, tokio::task::JoinHandle<()>) {
        /// How often the Tokio clock driver advances timers.
        ///
        /// A 10ms resolution balances precision with runtime overhead for the
        /// background task that drives timer advancement in Tokio.
        const TIMER_RESOLUTION: Duration = Duration::from_millis(10);

        let (clock, mut driver) = Self::new_shared();

        let join_handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(TIMER_RESOLUTION).await;

                if driver.advance_timers(Instant::now()).is_err() {
                    break;
                }
            }
        });

        (clock, join_handle)
    }

    /// Creates a new clock together with the [`ClockDriver`][crate::runtime::ClockDriver]
    /// that advances its timers.
    ///
    /// The clock may be cloned and shared across threads; the driver must be kept on a
    /// single thread or task and called periodically. See the [`runtime`][crate::runtime]
    /// module for the driver contract.
    #[cfg(any(feature = "rt-shared", test))]
    #[must_use]
    pub fn new_shared() -> (Self, crate::runtime::ClockDriver) {
        let state = ClockState::new_system();
        let driver = crate::runtime::ClockDriver::new(state.clone());

        (Self(state), driver)
    }

    /// Used for testing. For this clock, timers do not advance.
    #[cfg(test)]
    pub(crate) fn new_system_frozen() -> Self {
        Self(ClockState::new_system())
    }

    /// Creates a new frozen clock.
    ///
    /// This is a convenience method equivalent to calling `ManualClock::new().to_clock()`.
    ///
    /// > **Note**: The returned clock will not advance time; all time and timers are frozen.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::thread::sleep;
    /// use std::time::Duration;
    ///
    /// use tempo::Clock;
    ///
    /// let clock = Clock::new_frozen();
    ///
    /// // The clock always returns the same system time and instant.
    /// let system_time = clock.system_time();
    /// let instant = clock.instant();
    ///
    /// sleep(Duration::from_micros(1));
    ///
    /// assert_eq!(system_time, clock.system_time());
    /// assert_eq!(instant, clock.instant());
    /// ```
    #[cfg(any(feature = "test-util", test))]
    #[must_use]
    pub fn new_frozen() -> Self {
        crate::ManualClock::new().to_clock()
    }

    /// Creates a new frozen clock at the specified time.
    ///
    /// This is a convenience method equivalent to calling `ManualClock::new_at(time).to_clock()`.
    ///
    /// > **Note**: The returned clock will not advance time; all time and timers are frozen at
    /// > the specified time.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::{Duration, SystemTime};
    ///
    /// use tempo::Clock;
    ///
    /// let specific_time = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
    /// let clock = Clock::new_frozen_at(specific_time);
    ///
    /// assert_eq!(clock.system_time(), specific_time);
    /// ```
    #[cfg(any(feature = "test-util", test))]
    #[must_use]
    pub fn new_frozen_at(time: impl Into<SystemTime>) -> Self {
        crate::ManualClock::new_at(time).to_clock()
    }

    /// Retrieves the current system time as [`SystemTime`].
    ///
    /// > **Note**: The system time is not monotonic and can be affected by system clock changes.
    /// > When the system clock changes, the current time may be older than a previously retrieved
    /// > one. For relative time measurements, use [`Stopwatch`][crate::Stopwatch].
    ///
    /// # Examples
    ///
    /// ```
    /// use tempo::Clock;
    ///
    /// # fn retrieve_system_time(clock: &Clock) {
    /// let time1 = clock.system_time();
    /// let time2 = clock.system_time();
    ///
    /// assert!(time2 >= time1);
    /// # }
    /// ```
    #[must_use]
    pub fn system_time(&self) -> SystemTime {
        match self.state() {
            #[cfg(any(feature = "test-util", test))]
            ClockState::Manual(control) => control.system_time(),
            ClockState::System(_) => SystemTime::now(),
        }
    }

    /// Retrieves the current [`Instant`] time.
    ///
    /// An `Instant` represents a monotonic time point guaranteed to always increase. Unlike
    /// [`system_time`][Self::system_time], the instant is not affected by system clock changes
    /// and provides a stable reference point for measuring elapsed time.
    ///
    /// > **Important**: When measuring elapsed time with [`Instant`], use
    /// > [`Instant::duration_since`] rather than `Instant::elapsed`. The `elapsed` method
    /// > bypasses the clock and goes directly to system time, so it won't respect controlled
    /// > time in tests.
    ///
    /// # Examples
    ///
    /// ```
    /// use tempo::Clock;
    ///
    /// # fn retrieve_instant(clock: &Clock) {
    /// let instant1 = clock.instant();
    /// let instant2 = clock.instant();
    ///
    /// assert!(instant2 >= instant1);
    /// # }
    /// ```
    #[must_use]
    pub fn instant(&self) -> Instant {
        match self.state() {
            #[cfg(any(feature = "test-util", test))]
            ClockState::Manual(control) => control.instant(),
            ClockState::System(_) => Instant::now(),
        }
    }

    /// Creates a new [`Sleep`][crate::Sleep] that completes after the specified duration.
    ///
    /// This is a convenience method that calls [`Sleep::new`][crate::Sleep::new].
    ///
    /// If the duration is [`Duration::ZERO`], the sleep completes immediately.
    /// If the duration is [`Duration::MAX`], the sleep never completes.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use tempo::Clock;
    ///
    /// # async fn sleep_example(clock: &Clock) {
    /// let stopwatch = clock.stopwatch();
    ///
    /// clock.sleep(Duration::from_millis(10)).await;
    ///
    /// assert!(stopwatch.elapsed() >= Duration::from_millis(10));
    /// # }
    /// ```
    #[must_use]
    pub fn sleep(&self, duration: Duration) -> crate::Sleep {
        crate::Sleep::new(self, duration)
    }

    /// Creates a new [`Stopwatch`][crate::Stopwatch] that starts measuring elapsed time.
    ///
    /// This is a convenience method that calls [`Stopwatch::new`][crate::Stopwatch::new].
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use tempo::Clock;
    ///
    /// # fn measure(clock: &Clock) -> Duration {
    /// let stopwatch = clock.stopwatch();
    /// // Perform some operation...
    /// stopwatch.elapsed()
    /// # }
    /// ```
    #[must_use]
    pub fn stopwatch(&self) -> crate::Stopwatch {
        crate::Stopwatch::new(self)
    }

    pub(crate) fn register_timer(&self, deadline: Instant, waker: Waker) -> TimerKey {
        match self.state() {
            #[cfg(any(feature = "test-util", test))]
            ClockState::Manual(control) => control.register_timer(deadline, waker),
            ClockState::System(timers) => timers.with_timers(|t| t.register(deadline, waker)),
        }
    }

    pub(crate) fn unregister_timer(&self, key: TimerKey) {
        match self.state() {
            #[cfg(any(feature = "test-util", test))]
            ClockState::Manual(control) => control.unregister_timer(key),
            ClockState::System(timers) => timers.with_timers(|t| t.unregister(key)),
        }
    }

    pub(crate) fn state(&self) -> &ClockState {
        &self.0
    }
}

impl AsRef<Self> for Clock {
    fn as_ref(&self) -> &Self {
        self
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::fmt::Debug;
    use std::thread::sleep;

    use super::*;
    use crate::ManualClock;

    static_assertions::assert_impl_all!(Clock: Debug, Send, Sync, Clone, AsRef<Clock>);

    #[cfg(not(miri))] // Miri is not compatible with FFI calls this needs to make.
    #[test]
    fn system_time_ok() {
        let now = SystemTime::now();

        let clock = Clock::new_system_frozen();
        let absolute = clock.system_time();
        assert!(absolute >= now);
    }

    #[test]
    fn system_time_with_control() {
        let control = ManualClock::new();
        let clock = control.to_clock();

        let now = clock.system_time();
        assert_eq!(now, control.system_time());

        () = control.advance(Duration::from_secs(10));

        assert_eq!(clock.system_time(), now.checked_add(Duration::from_secs(10)).unwrap());
    }

    #[test]
    fn instant_close_to_system() {
        let clock = Clock::new_system_frozen();
        let clock_instant = clock.instant();
        let system_instant = Instant::now();

        assert!(
            (system_instant.duration_since(clock_instant)) < Duration::from_secs(10),
            "the `Instant` retrieved from the clock is not the same as the system one"
        );
    }

    #[test]
    fn instant_with_control() {
        let control = ManualClock::new();
        let clock = control.to_clock();

        let before = clock.instant();

        () = control.advance(Duration::from_secs(10));

        assert_eq!(clock.instant().duration_since(before), Duration::from_secs(10));
    }

    #[cfg(not(miri))] // The logic we call talks to the real OS, which Miri cannot do.
    #[tokio::test]
    async fn tokio_ensure_timers_advancing() {
        let clock = Clock::new_tokio();
        clock.sleep(Duration::from_millis(15)).await;
    }

    #[cfg(not(miri))] // The logic we call talks to the real OS, which Miri cannot do.
    #[tokio::test]
    async fn tokio_ensure_driver_task_finished_when_clock_dropped() {
        let (clock, handle) = Clock::new_tokio_core();

        clock.sleep(Duration::from_millis(15)).await;

        drop(clock);

        handle.await.unwrap();
    }

    #[test]
    fn new_frozen_ok() {
        let clock = Clock::new_frozen();

        let now = clock.system_time();
        let instant = clock.instant();

        sleep(Duration::from_micros(1));

        // The frozen clock should return the same system time and instant on every call.
        assert_eq!(now, clock.system_time());
        assert_eq!(instant, clock.instant());
    }

    #[test]
    fn new_frozen_at_ok() {
        let specific_time = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        let clock = Clock::new_frozen_at(specific_time);

        sleep(Duration::from_micros(1));

        assert_eq!(clock.system_time(), specific_time);
        assert_eq!(clock.system_time(), specific_time);
    }

    #[test]
    fn as_ref_ok() {
        let clock = Clock::new_frozen();
        let _: &Clock = clock.as_ref();
    }
}
