// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(
    test,
    allow(
        clippy::arithmetic_side_effects,
        clippy::unchecked_time_subtraction,
        reason = "allow these lints in tests to improve the readability of the tests"
    )
)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Virtualized clocks, sleeps, and stopwatches for deterministic control of time.
//!
//! Code that sleeps, measures elapsed time, or acts on deadlines is slow and flaky to test
//! against the operating system clock. This crate routes every time operation through a
//! [`Clock`] handle: production code runs on real time, while tests substitute a clock whose
//! time advances exactly when they say so.
//!
//! # Quick Start
//!
//! Take a [`Clock`] wherever time is needed, instead of calling [`std::time`] directly:
//!
//! ```
//! use std::time::Duration;
//!
//! use tempo::Clock;
//!
//! async fn produce_value(clock: &Clock) -> u32 {
//!     clock.sleep(Duration::from_millis(10)).await;
//!     42
//! }
//! ```
//!
//! In production, construct the clock once near the program entry point, for example with
//! `Clock::new_tokio()` when running on Tokio (`tokio` feature), and pass it down. Clones
//! are cheap and share the same underlying time source.
//!
//! # Testing
//!
//! With the `test-util` feature, `ManualClock` controls the passage of time. Tests advance
//! the clock explicitly, or enable auto-advance so that every sleep completes immediately
//! while the observed time still moves by the slept amount. A ten-minute backoff sequence
//! then verifies in microseconds, with exact elapsed times instead of tolerance windows.
//!
//! # Time Operations
//!
//! - [`Clock::system_time`] reads absolute wall-clock time as [`std::time::SystemTime`].
//! - [`Clock::instant`] reads monotonic time as [`std::time::Instant`].
//! - [`Clock::sleep`] returns a [`Sleep`] future that suspends the current task.
//! - [`Clock::stopwatch`] returns a [`Stopwatch`] measuring elapsed time.
//!
//! # Features
//!
//! This crate provides several optional features that can be enabled in your `Cargo.toml`:
//!
//! - **`tokio`** - Integration with the [Tokio](https://tokio.rs/) runtime. Enables
//!   `Clock::new_tokio` for creating clocks whose timers are driven by a Tokio task.
//! - **`rt-shared`** - Enables `Clock::new_shared` and the [`runtime`] module for driving
//!   the clock from other runtimes or dedicated threads.
//! - **`test-util`** - Enables the `ManualClock` type for controlling the passage of time
//!   in tests. This allows you to freeze time, advance it manually, or automatically advance
//!   timers for fast, deterministic testing. **Only enable this in `dev-dependencies`.**

mod clock;
#[cfg(any(feature = "test-util", test))]
mod manual;
mod sleep;
mod state;
mod stopwatch;
mod timers;

#[cfg(any(feature = "rt-shared", test))]
#[cfg_attr(docsrs, doc(cfg(feature = "rt-shared")))]
pub mod runtime;

pub use clock::Clock;
#[cfg(any(feature = "test-util", test))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
pub use manual::ManualClock;
pub use sleep::Sleep;
pub use stopwatch::Stopwatch;
