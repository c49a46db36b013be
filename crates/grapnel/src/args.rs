// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use crate::Attempt;

/// Arguments passed to the attempt-failed hook.
///
/// The failed attempt's error is passed to the hook separately, as
/// `&dyn Display`.
#[derive(Debug, Clone, Copy)]
pub struct AttemptFailedArgs<'a> {
    pub(crate) name: &'a str,
    pub(crate) attempt: Attempt,
    pub(crate) elapsed: Duration,
}

impl<'a> AttemptFailedArgs<'a> {
    /// The name of the acquirer the attempt belongs to.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The attempt that failed.
    #[must_use]
    pub fn attempt(&self) -> Attempt {
        self.attempt
    }

    /// Time since the start of the first attempt, on the acquirer's clock.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Arguments passed to the retry-scheduled hook.
#[derive(Debug, Clone, Copy)]
pub struct RetryScheduledArgs<'a> {
    pub(crate) name: &'a str,
    pub(crate) attempt: Attempt,
    pub(crate) delay: Duration,
    pub(crate) elapsed: Duration,
}

impl<'a> RetryScheduledArgs<'a> {
    /// The name of the acquirer the attempt belongs to.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The attempt that failed and will be followed by another one.
    #[must_use]
    pub fn attempt(&self) -> Attempt {
        self.attempt
    }

    /// How long the acquirer waits before the next attempt.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Time since the start of the first attempt, on the acquirer's clock.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
