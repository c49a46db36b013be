// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// The clock of a [`ClockDriver`][super::ClockDriver] is no longer in use.
///
/// Returned by [`ClockDriver::advance_timers`][super::ClockDriver::advance_timers] once
/// every clock sharing the driver's state has been dropped. Driving the clock further
/// would have no observable effect, so callers should stop their drive loop.
#[derive(Debug)]
#[non_exhaustive]
pub struct ClockGone;

impl Display for ClockGone {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "all clock owners have been dropped")
    }
}

impl Error for ClockGone {}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn assert_types() {
        static_assertions::assert_impl_all!(ClockGone: Error, Send, Sync);
    }

    #[test]
    fn display_ok() {
        assert_eq!(ClockGone.to_string(), "all clock owners have been dropped");
    }
}
