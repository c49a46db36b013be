// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::{Arc, Mutex};
use std::task::Waker;
use std::time::{Duration, Instant, SystemTime};

use crate::Clock;
use crate::timers::{TimerKey, Timers};

/// Controls the flow of time in tests.
///
/// This is useful for testing time-sensitive code without having to wait for real time to pass.
/// `ManualClock` is available when the `test-util` feature is enabled.
///
/// To create a [`Clock`] from a `ManualClock`, use the [`ManualClock::to_clock`] method.
///
/// Time only moves forward: the clock starts at the UNIX epoch (or at the time given to
/// [`ManualClock::new_at`]) and advances through [`advance`][Self::advance] or the
/// auto-advance settings.
///
/// # Examples
///
/// ## Advancing time manually
///
/// ```
/// # use std::time::Duration;
/// # use tempo::{Clock, ManualClock};
/// let control = ManualClock::new();
/// let clock = control.to_clock();
///
/// let now = clock.system_time();
///
/// // Advance the time by one second.
/// control.advance(Duration::from_secs(1));
///
/// assert_eq!(clock.system_time().duration_since(now)?, Duration::from_secs(1));
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// ## Advancing time automatically
///
/// ```
/// # use std::time::Duration;
/// # use tempo::{Clock, ManualClock};
/// let clock = ManualClock::new()
///     .auto_advance(Duration::from_secs(1))
///     .to_clock();
///
/// let now = clock.system_time();
///
/// assert_eq!(clock.system_time().duration_since(now)?, Duration::from_secs(1));
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Production code and `ManualClock`
///
/// You should never enable the `test-util` feature or use `ManualClock` in production code.
/// When the `test-util` feature is enabled, extra code is compiled into the binary to support
/// testing scenarios. This extra code hampers performance when running in production.
///
/// Always ensure that the `test-util` feature is only enabled for `dev-dependencies`.
///
/// ```toml
/// tempo = { version = "*", features = ["test-util"] }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    /// Manual time control crosses threads, so the state lives behind a mutex
    /// to stay consistent across all clones.
    state: Arc<Mutex<State>>,
}

impl ManualClock {
    /// Creates a new `ManualClock` instance.
    ///
    /// By default, the clock has no auto-advance set and the initial time is the UNIX epoch.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::new())),
        }
    }

    /// Creates a new `ManualClock` instance at the specified time.
    ///
    /// # Panics
    ///
    /// Panics if `time` is before the UNIX epoch; the clock cannot represent earlier times.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::{Duration, SystemTime};
    ///
    /// use tempo::ManualClock;
    ///
    /// let system_time = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
    /// let control = ManualClock::new_at(system_time);
    /// let clock = control.to_clock();
    ///
    /// assert_eq!(clock.system_time(), system_time);
    /// ```
    #[must_use]
    pub fn new_at(time: impl Into<SystemTime>) -> Self {
        let this = Self::new();
        let offset = time
            .into()
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect(OUTSIDE_RANGE_MESSAGE);
        this.advance(offset);
        this
    }

    /// Converts the `ManualClock` to a [`Clock`] instance.
    #[must_use]
    pub fn to_clock(&self) -> Clock {
        Clock(crate::state::ClockState::Manual(self.clone()))
    }

    /// Sets the duration by which the clock auto-advances when the current time is read.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use tempo::ManualClock;
    ///
    /// let clock = ManualClock::new()
    ///     .auto_advance(Duration::from_secs(1))
    ///     .to_clock();
    ///
    /// let now = clock.system_time();
    /// let later = clock.system_time(); // Automatically advances by 1 second.
    ///
    /// assert_eq!(later.duration_since(now)?, Duration::from_secs(1));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn auto_advance(self, duration: Duration) -> Self {
        self.with_state(|v| v.auto_advance = duration);
        self
    }

    /// Sets a limit on the total auto-advance duration.
    ///
    /// This method limits the total amount of time that can be auto-advanced, whether by
    /// [`Self::auto_advance`] reads or by [`Self::auto_advance_timers`] jumps. Once the limit
    /// is reached, the clock no longer advances on its own; timers past the limit never fire.
    #[must_use]
    pub fn auto_advance_limit(self, limit: Duration) -> Self {
        self.with_state(|v| {
            v.auto_advance_limit = Some(limit);
        });

        self
    }

    /// Determines whether the clock should automatically advance to fire upcoming timers.
    ///
    /// With this enabled, awaiting a [`Sleep`][crate::Sleep] completes immediately while the
    /// clock jumps forward by exactly the slept duration. Note that when
    /// [`Self::auto_advance_limit`] is used, the limit is respected: timers beyond the limit
    /// are not fired.
    #[must_use]
    pub fn auto_advance_timers(self, enabled: bool) -> Self {
        self.with_state(|v| v.auto_advance_timers = enabled);
        self
    }

    /// Manually advances the clock by the specified number of milliseconds.
    ///
    /// In addition to advancing the current time, this method fires the registered timers
    /// whose deadline has been reached.
    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Manually advances the clock by the specified duration.
    ///
    /// In addition to advancing the current time, this method fires the registered timers
    /// whose deadline has been reached.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use tempo::ManualClock;
    ///
    /// let control = ManualClock::new();
    /// let clock = control.to_clock();
    ///
    /// let now = clock.system_time();
    /// control.advance(Duration::from_secs(1));
    ///
    /// assert_eq!(clock.system_time().duration_since(now)?, Duration::from_secs(1));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn advance(&self, duration: Duration) {
        self.with_state(|v| v.advance(duration));
    }

    pub(crate) fn system_time(&self) -> SystemTime {
        self.with_state(State::read_system_time)
    }

    pub(crate) fn instant(&self) -> Instant {
        self.with_state(State::read_instant)
    }

    pub(crate) fn register_timer(&self, deadline: Instant, waker: Waker) -> TimerKey {
        let key = self.with_state(|s| s.timers.register(deadline, waker));
        self.with_state(State::evaluate_timers);
        key
    }

    pub(crate) fn unregister_timer(&self, key: TimerKey) {
        self.with_state(|s| s.timers.unregister(key));
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.with_state(|s| s.timers.next_deadline())
    }

    pub(crate) fn ownership_count(&self) -> usize {
        Arc::strong_count(&self.state)
    }

    #[cfg(test)]
    pub(crate) fn timers_len(&self) -> usize {
        self.with_state(|s| s.timers.len())
    }

    fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut State) -> R,
    {
        f(&mut self.state.lock().expect("acquiring lock must always succeed"))
    }
}

impl From<ManualClock> for Clock {
    fn from(control: ManualClock) -> Self {
        control.to_clock()
    }
}

impl From<&ManualClock> for Clock {
    fn from(control: &ManualClock) -> Self {
        control.to_clock()
    }
}

#[derive(Debug)]
struct State {
    instant: Instant,
    system_time: SystemTime,
    timers: Timers,
    auto_advance: Duration,
    auto_advance_total: Duration,
    auto_advance_timers: bool,
    auto_advance_limit: Option<Duration>,
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    fn new() -> Self {
        Self {
            instant: Instant::now(),
            system_time: SystemTime::UNIX_EPOCH,
            timers: Timers::default(),
            auto_advance: Duration::ZERO,
            auto_advance_total: Duration::ZERO,
            auto_advance_timers: false,
            auto_advance_limit: None,
        }
    }

    fn read_system_time(&mut self) -> SystemTime {
        let time = self.system_time;
        self.auto_advance_step();
        time
    }

    fn read_instant(&mut self) -> Instant {
        let instant = self.instant;
        self.auto_advance_step();
        instant
    }

    fn auto_advance_step(&mut self) {
        let step = self.clamp_auto_advance(self.auto_advance);
        self.auto_advance_total = self.auto_advance_total.saturating_add(step);
        self.advance(step);
    }

    fn clamp_auto_advance(&self, hint: Duration) -> Duration {
        if let Some(limit) = self.auto_advance_limit {
            let remaining = limit.saturating_sub(self.auto_advance_total);
            hint.min(remaining)
        } else {
            hint
        }
    }

    #[cfg_attr(test, mutants::skip)] // causes test timeout
    fn advance(&mut self, duration: Duration) {
        self.advance_time(duration);
        self.evaluate_timers();
    }

    fn advance_time(&mut self, duration: Duration) {
        if duration == Duration::ZERO {
            return;
        }

        self.instant = self.instant.checked_add(duration).expect(OUTSIDE_RANGE_MESSAGE);
        self.system_time = self.system_time.checked_add(duration).expect(OUTSIDE_RANGE_MESSAGE);
        self.timers.advance(self.instant);
    }

    fn evaluate_timers(&mut self) {
        self.timers.advance(self.instant);

        if !self.auto_advance_timers {
            return;
        }

        // Jump to upcoming timers one by one while the auto-advance limit allows it.
        while let Some(deadline) = self.timers.next_deadline() {
            let gap = deadline.saturating_duration_since(self.instant);
            let step = self.clamp_auto_advance(gap);

            if step == Duration::ZERO {
                break;
            }

            self.auto_advance_total = self.auto_advance_total.saturating_add(step);
            self.advance_time(step);

            if step < gap {
                // The limit was reached before the next deadline; that timer will not fire.
                break;
            }
        }
    }
}

static OUTSIDE_RANGE_MESSAGE: &str = "moving the clock outside of the supported time range is not possible";
