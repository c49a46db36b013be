// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration of clocks with asynchronous runtimes.
//!
//! A [`Clock`][crate::Clock] does not advance its timers by itself. Something must
//! periodically call [`ClockDriver::advance_timers`] so that pending sleeps are woken
//! once their deadline has passed. [`Clock::new_tokio`][crate::Clock::new_tokio] takes
//! care of this by spawning a task on the Tokio runtime. Other runtimes obtain a driver
//! through [`Clock::new_shared`][crate::Clock::new_shared] and arrange for the periodic
//! calls themselves, for example from a dedicated thread or an existing maintenance loop.
//!
//! The driver reports the next upcoming deadline after each call, which callers may use
//! to pick how long to wait before driving the clock again.

mod clock_driver;
mod clock_gone;

pub use clock_driver::ClockDriver;
pub use clock_gone::ClockGone;
