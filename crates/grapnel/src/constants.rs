// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

/// First delay of the default backoff schedule; a conservative 1 second.
///
/// A 1s starting delay avoids hammering a resource that is still coming up
/// (the motivating case is a database inside a container that has not finished
/// starting) while keeping recovery fast for short-lived failures. Workloads
/// with different needs can override this with [`crate::Backoff::new`].
pub(crate) const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);

/// Ceiling of the default backoff schedule: 16 seconds.
///
/// Doubling delays grow past the point of usefulness quickly; capping them at
/// 16s bounds the worst-case gap between attempts once the resource recovers,
/// so a long outage does not push the next attempt minutes into the future.
pub(crate) const DEFAULT_DELAY_CEILING: Duration = Duration::from_secs(16);

/// Default attempt budget: 10 factory invocations.
///
/// With the default schedule this allows nine waits totaling 95 seconds, which
/// rides out typical container startup delays without blocking indefinitely.
/// Waiting forever is an explicit opt-in via
/// [`crate::Acquirer::unlimited_attempts`].
pub(crate) const DEFAULT_ATTEMPT_BUDGET: u32 = 10;
