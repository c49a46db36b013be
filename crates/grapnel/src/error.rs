// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display};
use std::time::Duration;

/// Why an acquisition gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AcquireErrorKind {
    /// The attempt budget was spent without a successful acquisition.
    BudgetExhausted,

    /// The delay schedule ran out of delays.
    ///
    /// Only finite schedules passed to [`crate::Acquirer::acquire_with`] can
    /// run out; the built-in [`crate::Backoff`] schedule is infinite.
    ScheduleExhausted,

    /// The next wait would have ended past the configured deadline.
    DeadlineExceeded,
}

impl Display for AcquireErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BudgetExhausted => f.write_str("attempt budget exhausted"),
            Self::ScheduleExhausted => f.write_str("delay schedule exhausted"),
            Self::DeadlineExceeded => f.write_str("deadline exceeded"),
        }
    }
}

/// An acquisition that gave up, carrying the error of the last attempt.
///
/// Produced by [`crate::Acquirer::acquire`] once no further attempt is
/// allowed. Besides the last factory error it records why the acquisition
/// stopped, how many attempts ran, and how much time passed, so a single
/// startup failure log line can tell the whole story.
#[derive(Debug)]
pub struct AcquireError<E> {
    kind: AcquireErrorKind,
    attempts: u32,
    elapsed: Duration,
    last_error: E,
}

impl<E> AcquireError<E> {
    pub(crate) fn new(kind: AcquireErrorKind, attempts: u32, elapsed: Duration, last_error: E) -> Self {
        Self {
            kind,
            attempts,
            elapsed,
            last_error,
        }
    }

    /// Why the acquisition gave up.
    #[must_use]
    pub fn kind(&self) -> AcquireErrorKind {
        self.kind
    }

    /// How many attempts ran, counting the first one.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// How much time passed between the start of the first attempt and giving
    /// up, measured on the acquirer's clock.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// The error returned by the last attempt.
    #[must_use]
    pub fn last_error(&self) -> &E {
        &self.last_error
    }

    /// Consumes the error, returning the error of the last attempt.
    #[must_use]
    pub fn into_last_error(self) -> E {
        self.last_error
    }
}

impl<E: Display> Display for AcquireError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "acquisition failed ({}) after {} attempts in {:?}: {}",
            self.kind, self.attempts, self.elapsed, self.last_error
        )
    }
}

impl<E> std::error::Error for AcquireError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.last_error)
    }
}
