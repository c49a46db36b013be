// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::timers::Timers;

/// The shared state behind every [`Clock`][crate::Clock] handle.
///
/// Cloning the state is cheap and preserves sharing: both variants hold their
/// mutable data behind an `Arc`.
#[derive(Debug, Clone)]
pub(crate) enum ClockState {
    #[cfg(any(feature = "test-util", test))]
    Manual(crate::ManualClock),
    System(SharedTimers),
}

impl ClockState {
    pub(crate) fn new_system() -> Self {
        Self::System(SharedTimers::default())
    }

    /// Number of live handles sharing this state, the driver's included.
    pub(crate) fn ownership_count(&self) -> usize {
        match self {
            #[cfg(any(feature = "test-util", test))]
            Self::Manual(control) => control.ownership_count(),
            Self::System(timers) => Arc::strong_count(&timers.timers),
        }
    }

    #[cfg(test)]
    pub(crate) fn timers_len(&self) -> usize {
        match self {
            Self::Manual(control) => control.timers_len(),
            Self::System(timers) => timers.with_timers(|t| t.len()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SharedTimers {
    // The mutex here is not on a hot path. Timers are accessed only when:
    //
    // 1. A new timer is registered.
    // 2. A timer is unregistered.
    // 3. Timers are advanced. Advancement is very fast when no timers are due; when
    //    timers are due, the time to wake them is proportional to their number and
    //    taking the lock is not the bottleneck.
    timers: Arc<Mutex<Timers>>,
}

impl SharedTimers {
    pub(crate) fn with_timers<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Timers) -> R,
    {
        let mut timers = self.timers.lock().expect("timers lock poisoned");
        f(&mut timers)
    }

    #[cfg_attr(test, mutants::skip)] // Causes test timeout.
    pub(crate) fn try_advance(&self, now: Instant) -> Option<Instant> {
        self.with_timers(|timers| timers.advance(now))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn clock_state_send_and_sync() {
        static_assertions::assert_impl_all!(ClockState: Send, Sync);
    }
}
