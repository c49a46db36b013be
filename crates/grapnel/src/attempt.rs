// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// One factory invocation within an acquisition.
///
/// Identifies where in the attempt sequence an acquisition currently is. The
/// first attempt has index zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    index: u32,
    is_last: bool,
}

impl Attempt {
    pub(crate) fn new(index: u32, is_last: bool) -> Self {
        Self { index, is_last }
    }

    /// Whether this is the first attempt of the acquisition.
    #[must_use]
    pub fn is_first(self) -> bool {
        self.index == 0
    }

    /// Whether the attempt budget allows no further attempt after this one.
    ///
    /// Always `false` with an unlimited budget.
    #[must_use]
    pub fn is_last(self) -> bool {
        self.is_last
    }

    /// The zero-based index of this attempt.
    #[must_use]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Advances to the next attempt, or `None` once `budget` is spent.
    #[cfg_attr(test, mutants::skip)] // mutants that never exhaust the budget hang the retry tests
    pub(crate) fn increment(self, budget: AttemptBudget) -> Option<Self> {
        let next = self.index.saturating_add(1);
        match budget {
            AttemptBudget::Limited(limit) if next >= limit => None,
            AttemptBudget::Limited(limit) => Some(Self::new(next, next == limit.saturating_sub(1))),
            AttemptBudget::Unlimited => Some(Self::new(next, false)),
        }
    }
}

impl Default for Attempt {
    /// The first attempt of an acquisition that allows no further attempts.
    fn default() -> Self {
        Self::new(0, true)
    }
}

impl std::fmt::Display for Attempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.index, f)
    }
}

/// How many factory invocations one acquisition may make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttemptBudget {
    /// At most this many invocations, counting the first one.
    Limited(u32),
    /// Keep attempting for as long as the schedule and the deadline allow.
    Unlimited,
}

impl AttemptBudget {
    /// The attempt every acquisition starts with.
    ///
    /// A budget of zero still yields a first attempt; the factory always runs
    /// at least once.
    pub(crate) fn first_attempt(self) -> Attempt {
        Attempt::new(0, matches!(self, Self::Limited(0 | 1)))
    }
}
