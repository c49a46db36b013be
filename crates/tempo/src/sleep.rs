// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::pin::Pin;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use crate::Clock;
use crate::timers::TimerKey;

/// Asynchronously suspends the current task for the specified duration.
///
/// # Precision
///
/// The sleep relies on its clock's driver to schedule wakeups. The precision is therefore
/// affected by the driver's resolution and the load on the driving thread. There are no
/// guarantees about precision other than that the sleep will not complete early and will
/// eventually complete.
///
/// Note: `Sleep` is not affected by changes in the system clock.
///
/// # Cancellation
///
/// Dropping a `Sleep` unregisters its timer; a dropped sleep never wakes anything.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use tempo::{Clock, Sleep};
///
/// # async fn sleep_example(clock: &Clock) {
/// let stopwatch = clock.stopwatch();
///
/// // Sleep for 10 milliseconds.
/// clock.sleep(Duration::from_millis(10)).await;
///
/// assert!(stopwatch.elapsed() >= Duration::from_millis(10));
/// # }
/// ```
#[derive(Debug)]
pub struct Sleep {
    // The currently scheduled timer. Not initialized before the first
    // `Future::poll` call.
    timer: Option<TimerKey>,
    clock: Clock,
    duration: Duration,
}

impl Sleep {
    /// Creates a new sleep that completes after the specified duration.
    ///
    /// If the duration is [`Duration::ZERO`], the sleep completes immediately.
    /// If the duration is [`Duration::MAX`], the sleep never completes.
    ///
    /// > **Note**: Consider using [`Clock::sleep()`] as a shortcut for creating sleeps.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use tempo::{Clock, Sleep};
    ///
    /// # async fn sleep_example(clock: &Clock) {
    /// Sleep::new(clock, Duration::from_millis(10)).await;
    /// # }
    /// ```
    #[must_use]
    pub fn new(clock: &Clock, duration: Duration) -> Self {
        Self {
            duration,
            timer: None,
            clock: clock.clone(),
        }
    }

    fn register_timer(&mut self, waker: &Waker) -> Poll<()> {
        let deadline = self.clock.instant().checked_add(self.duration);

        if let Some(deadline) = deadline {
            self.timer = Some(self.clock.register_timer(deadline, waker.clone()));
        } else {
            // We have moved past the maximum instant value; this sleep never completes.
            self.duration = Duration::MAX;
            self.timer = None;
        }

        Poll::Pending
    }
}

impl Future for Sleep {
    type Output = ();

    #[cfg_attr(test, mutants::skip)] // some mutations never finish and cause timeouts
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        match this.timer {
            None if this.duration == Duration::MAX => Poll::Pending,
            None if this.duration == Duration::ZERO => Poll::Ready(()),
            None => this.register_timer(cx.waker()),
            Some(key) if key.deadline() <= this.clock.instant() => {
                this.timer = None;

                // Unregister the timer, just in case this poll was explicit
                // and not due to timers advancing.
                this.clock.unregister_timer(key);

                Poll::Ready(())
            }
            Some(_) => Poll::Pending,
        }
    }
}

impl Drop for Sleep {
    fn drop(&mut self) {
        if let Some(key) = self.timer {
            self.clock.unregister_timer(key);
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::ManualClock;

    #[test]
    fn assert_types() {
        static_assertions::assert_impl_all!(Sleep: Send, Sync);
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn sleep_ok() {
        let clock = Clock::new_tokio();
        let now = std::time::Instant::now();
        Sleep::new(&clock, Duration::from_millis(5)).await;
        assert!(now.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn sleep_with_control() {
        let control = ManualClock::new();
        let clock = control.to_clock();
        let mut sleep = Sleep::new(&clock, Duration::from_millis(1));

        assert_eq!(poll_sleep(&mut sleep), Poll::Pending);
        thread::sleep(Duration::from_millis(1));
        assert_eq!(poll_sleep(&mut sleep), Poll::Pending);

        let len = control.timers_len();
        () = control.advance(Duration::from_millis(2));
        assert_eq!(control.timers_len(), len - 1);
        assert_eq!(poll_sleep(&mut sleep), Poll::Ready(()));
    }

    #[test]
    fn sleep_zero() {
        let clock = Clock::new_system_frozen();
        let mut sleep = Sleep::new(&clock, Duration::ZERO);
        assert_eq!(poll_sleep(&mut sleep), Poll::Ready(()));
    }

    #[test]
    fn sleep_max() {
        let clock = Clock::new_system_frozen();

        let result = poll_sleep(&mut Sleep::new(&clock, Duration::MAX));

        assert_eq!(result, Poll::Pending);
    }

    #[test]
    fn sleep_zero_ensure_timer_not_registered() {
        let clock = Clock::new_system_frozen();
        assert!(Sleep::new(&clock, Duration::ZERO).timer.is_none());
    }

    #[test]
    fn sleep_max_ensure_timer_not_registered() {
        let clock = Clock::new_system_frozen();
        assert!(Sleep::new(&clock, Duration::MAX).timer.is_none());
    }

    #[test]
    fn sleep_close_to_max_ensure_timer_not_registered() {
        let clock = Clock::new_system_frozen();
        let mut sleep = Sleep::new(&clock, Duration::MAX.saturating_sub(Duration::from_millis(1)));

        assert_eq!(poll_sleep(&mut sleep), Poll::Pending);
        assert_eq!(sleep.duration, Duration::MAX);
        assert!(sleep.timer.is_none());
    }

    #[test]
    fn ready_without_advancing_timers_ensure_timer_unregistered() {
        let clock = Clock::new_system_frozen();
        let period = Duration::from_millis(1);
        let mut sleep = Sleep::new(&clock, period);

        assert_eq!(poll_sleep(&mut sleep), Poll::Pending);
        assert_eq!(clock.state().timers_len(), 1);
        thread::sleep(period);
        assert_eq!(poll_sleep(&mut sleep), Poll::Ready(()));
        assert_eq!(sleep.timer, None);
        assert_eq!(clock.state().timers_len(), 0);
    }

    #[test]
    fn drop_sleep_unregisters_timer() {
        let clock = Clock::new_system_frozen();
        let period = Duration::from_millis(1);

        // Create and poll the sleep to register a timer.
        {
            let mut sleep = Sleep::new(&clock, period);
            assert_eq!(poll_sleep(&mut sleep), Poll::Pending);
            assert_eq!(clock.state().timers_len(), 1);
            // Sleep is dropped here, unregistering the timer.
        }

        // The timer is unregistered after dropping the sleep.
        assert_eq!(clock.state().timers_len(), 0);
    }

    fn poll_sleep(sleep: &mut Sleep) -> Poll<()> {
        let mut cx = Context::from_waker(Waker::noop());
        let sleep = std::pin::pin!(sleep);

        sleep.poll(&mut cx)
    }
}
