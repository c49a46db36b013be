// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(
    test,
    allow(
        clippy::arithmetic_side_effects,
        reason = "allow these lints in tests to improve the readability of the tests"
    )
)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Resilient acquisition of scarce resources from fallible factories.
//!
//! Programs that depend on databases, message brokers, or remote services must cope with
//! those resources being briefly unavailable, most visibly at startup when everything is
//! racing to come up at once. This crate provides [`Acquirer`], which turns a fallible
//! async factory into a resource by retrying it with exponential backoff until it
//! succeeds or a configured limit is hit.
//!
//! # Quick Start
//!
//! ```
//! use grapnel::Acquirer;
//! use tempo::Clock;
//!
//! # async fn connect() -> Result<String, std::io::Error> { Ok("pool".into()) }
//! # async fn example(clock: &Clock) -> Result<(), Box<dyn std::error::Error>> {
//! let acquirer = Acquirer::new(clock);
//! let pool = acquirer.acquire(connect).await?;
//! # Ok(())
//! # }
//! ```
//!
//! By default the first retry waits one second and each further retry doubles the wait,
//! up to a ceiling of sixteen seconds. [`Backoff`] changes those bounds, and
//! [`Acquirer::acquire_with`] accepts any delay sequence outright.
//!
//! # Waiting and Clocks
//!
//! All waits run on a [`Clock`][tempo::Clock] from the [`tempo`] crate. Production code
//! passes a real clock; tests pass a manual clock, so acquisitions involving minutes of
//! backoff complete instantly and deterministically.
//!
//! # Giving Up
//!
//! Acquisition stops and surfaces the last error as an [`AcquireError`] when any of the
//! configured limits is reached:
//!
//! - the attempt budget is spent ([`Acquirer::max_attempts`], ten by default),
//! - the delay schedule runs out (only finite schedules given to
//!   [`Acquirer::acquire_with`] do),
//! - the next wait would end past the deadline ([`Acquirer::deadline`]).
//!
//! Dropping the future returned by [`Acquirer::acquire`] cancels the acquisition at the
//! next await point, including mid-wait.
//!
//! # Features
//!
//! This crate provides optional features that can be enabled in your `Cargo.toml`:
//!
//! - **`logs`** - Structured logging of failed attempts and scheduled retries through
//!   the [`tracing`](https://docs.rs/tracing) crate, switched on per acquirer with
//!   `Acquirer::enable_logs`.
//! - **`metrics`** - Counting of acquisition events through the
//!   [`opentelemetry`](https://docs.rs/opentelemetry) metrics API, switched on per
//!   acquirer with `Acquirer::enable_metrics`.

mod acquirer;
mod args;
mod attempt;
mod backoff;
mod callbacks;
mod constants;
mod define_fn_wrapper;
mod error;
#[cfg(any(feature = "logs", feature = "metrics", test))]
mod telemetry;

pub use acquirer::Acquirer;
pub use args::{AttemptFailedArgs, RetryScheduledArgs};
pub use attempt::Attempt;
pub use backoff::{Backoff, Schedule};
pub use error::{AcquireError, AcquireErrorKind};

pub(crate) use define_fn_wrapper::define_fn_wrapper;
