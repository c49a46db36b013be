// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::fmt::Display;
use std::time::Duration;

use tempo::Clock;

use crate::args::{AttemptFailedArgs, RetryScheduledArgs};
use crate::attempt::{Attempt, AttemptBudget};
use crate::backoff::Backoff;
use crate::callbacks::{OnAttemptFailed, OnRetryScheduled};
use crate::constants::DEFAULT_ATTEMPT_BUDGET;
use crate::error::{AcquireError, AcquireErrorKind};
#[cfg(any(feature = "metrics", test))]
use crate::telemetry;
#[cfg(any(feature = "logs", feature = "metrics", test))]
use crate::telemetry::Telemetry;

pub(crate) const DEFAULT_ACQUIRER_NAME: &str = "default";

/// Acquires a resource by invoking a fallible factory until it succeeds.
///
/// The factory is invoked once per attempt. When the returned future resolves
/// to an error, the acquirer waits out the next delay of its backoff schedule
/// and invokes the factory again; when it resolves to a resource, the
/// resource is handed to the caller. The last error is surfaced as an
/// [`AcquireError`] once the attempt budget, the delay schedule, or the
/// deadline runs out.
///
/// All waits run on the configured [`Clock`], so acquisitions driven by a
/// manual clock finish instantly in tests. Dropping the future returned by
/// [`acquire`](Self::acquire) cancels the acquisition, including any wait in
/// progress.
///
/// # Examples
///
/// ```
/// use grapnel::Acquirer;
/// use tempo::Clock;
///
/// # async fn connect() -> Result<String, std::io::Error> { Ok("pool".into()) }
/// # async fn example(clock: &Clock) -> Result<(), Box<dyn std::error::Error>> {
/// let acquirer = Acquirer::new(clock);
/// let pool = acquirer.acquire(connect).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Acquirer {
    clock: Clock,
    name: Cow<'static, str>,
    backoff: Backoff,
    budget: AttemptBudget,
    deadline: Option<Duration>,
    on_attempt_failed: Option<OnAttemptFailed>,
    on_retry_scheduled: Option<OnRetryScheduled>,
    #[cfg(any(feature = "logs", feature = "metrics", test))]
    telemetry: Telemetry,
}

impl Acquirer {
    /// Creates an acquirer with the default backoff schedule and attempt
    /// budget. Initializes with `name = "default"`.
    pub fn new(clock: impl AsRef<Clock>) -> Self {
        Self {
            clock: clock.as_ref().clone(),
            name: Cow::Borrowed(DEFAULT_ACQUIRER_NAME),
            backoff: Backoff::default(),
            budget: AttemptBudget::Limited(DEFAULT_ATTEMPT_BUDGET),
            deadline: None,
            on_attempt_failed: None,
            on_retry_scheduled: None,
            #[cfg(any(feature = "logs", feature = "metrics", test))]
            telemetry: Telemetry::default(),
        }
    }

    /// Sets the acquirer name for hook and telemetry correlation. Prefer
    /// `snake_case`.
    #[must_use]
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the delay schedule used between attempts.
    #[must_use]
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Allows at most `attempts` factory invocations per acquisition,
    /// counting the first one.
    ///
    /// The factory always runs at least once, even with a budget of zero.
    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.budget = AttemptBudget::Limited(attempts);
        self
    }

    /// Removes the attempt budget.
    ///
    /// With the default infinite schedule and no deadline, acquisition then
    /// suspends until the factory succeeds. This is the "wait for the
    /// database to come up" startup mode; dropping the future is the only
    /// way to stop it.
    #[must_use]
    pub fn unlimited_attempts(mut self) -> Self {
        self.budget = AttemptBudget::Unlimited;
        self
    }

    /// Gives up before any wait that would end past `deadline`, measured
    /// from the start of the acquisition on the acquirer's clock.
    ///
    /// The first attempt always runs; the deadline bounds waiting, not the
    /// factory. Per-attempt timeouts belong to the factory itself.
    #[must_use]
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Runs `hook` every time an attempt fails.
    ///
    /// The hook receives the attempt's error and [`AttemptFailedArgs`]. Its
    /// behavior never affects the outcome of the acquisition.
    #[must_use]
    pub fn on_attempt_failed(mut self, hook: impl Fn(&dyn Display, AttemptFailedArgs) + Send + Sync + 'static) -> Self {
        self.on_attempt_failed = Some(OnAttemptFailed::new(hook));
        self
    }

    /// Runs `hook` every time a failed attempt gets a retry scheduled.
    ///
    /// The hook receives [`RetryScheduledArgs`], including the delay that
    /// will be waited out. Its behavior never affects the outcome of the
    /// acquisition.
    #[must_use]
    pub fn on_retry_scheduled(mut self, hook: impl Fn(RetryScheduledArgs) + Send + Sync + 'static) -> Self {
        self.on_retry_scheduled = Some(OnRetryScheduled::new(hook));
        self
    }

    /// Enables structured logging of acquisition events.
    #[must_use]
    #[cfg(any(feature = "logs", test))]
    #[cfg_attr(docsrs, doc(cfg(feature = "logs")))]
    pub fn enable_logs(mut self) -> Self {
        self.telemetry.logs_enabled = true;
        self
    }

    /// Enables metrics reporting with the given OpenTelemetry meter provider.
    #[must_use]
    #[cfg(any(feature = "metrics", test))]
    #[cfg_attr(docsrs, doc(cfg(feature = "metrics")))]
    pub fn enable_metrics(mut self, meter_provider: &dyn opentelemetry::metrics::MeterProvider) -> Self {
        self.telemetry.event_reporter = Some(telemetry::create_event_counter(meter_provider));
        self
    }

    /// Acquires a resource from `factory`, retrying per the configured
    /// backoff schedule.
    ///
    /// Equivalent to [`acquire_with`](Self::acquire_with) called with a fresh
    /// schedule from the configured [`Backoff`], which never runs out.
    ///
    /// # Errors
    ///
    /// Returns an [`AcquireError`] carrying the last attempt's error once the
    /// attempt budget is spent or the deadline would pass.
    pub async fn acquire<F, Fut, T, E>(&self, factory: F) -> Result<T, AcquireError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.acquire_with(self.backoff.schedule(), factory).await
    }

    /// Acquires a resource from `factory`, waiting out the delays of
    /// `schedule` between attempts.
    ///
    /// Takes any delay sequence in place of the configured backoff. A finite
    /// schedule bounds the acquisition on its own: the failure following the
    /// last delay is surfaced.
    ///
    /// # Errors
    ///
    /// Returns an [`AcquireError`] carrying the last attempt's error once the
    /// attempt budget is spent, the schedule runs out, or the deadline would
    /// pass.
    pub async fn acquire_with<S, F, Fut, T, E>(&self, schedule: S, mut factory: F) -> Result<T, AcquireError<E>>
    where
        S: IntoIterator<Item = Duration>,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut schedule = schedule.into_iter();
        let mut attempt = self.budget.first_attempt();
        let watch = self.clock.stopwatch();

        loop {
            let error = match factory().await {
                Ok(resource) => return Ok(resource),
                Err(error) => error,
            };

            let elapsed = watch.elapsed();
            self.report_failure(attempt, &error, elapsed);

            let Some(next_attempt) = attempt.increment(self.budget) else {
                return Err(give_up(AcquireErrorKind::BudgetExhausted, attempt, elapsed, error));
            };

            let Some(delay) = schedule.next() else {
                return Err(give_up(AcquireErrorKind::ScheduleExhausted, attempt, elapsed, error));
            };

            if self.exceeds_deadline(elapsed, delay) {
                return Err(give_up(AcquireErrorKind::DeadlineExceeded, attempt, elapsed, error));
            }

            self.report_retry(attempt, delay, elapsed);
            self.clock.sleep(delay).await;
            attempt = next_attempt;
        }
    }

    fn exceeds_deadline(&self, elapsed: Duration, delay: Duration) -> bool {
        self.deadline.is_some_and(|deadline| elapsed.saturating_add(delay) > deadline)
    }

    fn report_failure(&self, attempt: Attempt, error: &dyn Display, elapsed: Duration) {
        #[cfg(any(feature = "logs", test))]
        self.log_failure(attempt, error, elapsed);

        #[cfg(any(feature = "metrics", test))]
        self.count_event(telemetry::ATTEMPT_FAILED_EVENT, attempt);

        if let Some(hook) = &self.on_attempt_failed {
            hook.call(
                error,
                AttemptFailedArgs {
                    name: self.name.as_ref(),
                    attempt,
                    elapsed,
                },
            );
        }
    }

    fn report_retry(&self, attempt: Attempt, delay: Duration, elapsed: Duration) {
        #[cfg(any(feature = "logs", test))]
        self.log_retry(attempt, delay, elapsed);

        #[cfg(any(feature = "metrics", test))]
        self.count_event(telemetry::RETRY_SCHEDULED_EVENT, attempt);

        if let Some(hook) = &self.on_retry_scheduled {
            hook.call(RetryScheduledArgs {
                name: self.name.as_ref(),
                attempt,
                delay,
                elapsed,
            });
        }
    }

    #[cfg(any(feature = "logs", test))]
    fn log_failure(&self, attempt: Attempt, error: &dyn Display, elapsed: Duration) {
        if self.telemetry.logs_enabled {
            tracing::event!(
                name: "grapnel.acquire",
                tracing::Level::WARN,
                acquirer.name = %self.name,
                acquisition.attempt.index = attempt.index(),
                acquisition.attempt.is_last = attempt.is_last(),
                acquisition.elapsed = elapsed.as_secs_f32(),
                acquisition.error = %error,
            );
        }
    }

    #[cfg(any(feature = "logs", test))]
    fn log_retry(&self, attempt: Attempt, delay: Duration, elapsed: Duration) {
        if self.telemetry.logs_enabled {
            tracing::event!(
                name: "grapnel.acquire",
                tracing::Level::INFO,
                acquirer.name = %self.name,
                acquisition.attempt.index = attempt.index(),
                acquisition.attempt.is_last = attempt.is_last(),
                acquisition.retry.delay = delay.as_secs_f32(),
                acquisition.elapsed = elapsed.as_secs_f32(),
            );
        }
    }

    #[cfg(any(feature = "metrics", test))]
    fn count_event(&self, event: &'static str, attempt: Attempt) {
        if let Some(reporter) = &self.telemetry.event_reporter {
            reporter.add(
                1,
                &[
                    opentelemetry::KeyValue::new(telemetry::ACQUIRER_NAME, self.name.to_string()),
                    opentelemetry::KeyValue::new(telemetry::EVENT_NAME, event),
                    opentelemetry::KeyValue::new(telemetry::ATTEMPT_INDEX, i64::from(attempt.index())),
                    opentelemetry::KeyValue::new(telemetry::ATTEMPT_IS_LAST, attempt.is_last()),
                ],
            );
        }
    }
}

fn give_up<E>(kind: AcquireErrorKind, attempt: Attempt, elapsed: Duration, last_error: E) -> AcquireError<E> {
    AcquireError::new(kind, attempt.index().saturating_add(1), elapsed, last_error)
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use static_assertions::assert_impl_all;

    use super::*;

    #[test]
    fn assert_types() {
        assert_impl_all!(Acquirer: Clone, Send, Sync, std::fmt::Debug);
    }

    #[test]
    fn immediate_success_ok() {
        let acquirer = Acquirer::new(Clock::new_frozen());

        let resource = block_on(acquirer.acquire(|| async { Ok::<_, String>(42) })).unwrap();

        assert_eq!(resource, 42);
    }

    #[test]
    fn exceeds_deadline_allows_waits_ending_at_the_deadline() {
        let acquirer = Acquirer::new(Clock::new_frozen()).deadline(Duration::from_secs(5));

        assert!(!acquirer.exceeds_deadline(Duration::ZERO, Duration::from_secs(5)));
        assert!(!acquirer.exceeds_deadline(Duration::ZERO, Duration::from_secs(4)));
        assert!(acquirer.exceeds_deadline(Duration::from_millis(1), Duration::from_secs(5)));
        assert!(acquirer.exceeds_deadline(Duration::from_secs(6), Duration::ZERO));
    }

    #[test]
    fn exceeds_deadline_without_deadline_never_blocks() {
        let acquirer = Acquirer::new(Clock::new_frozen());

        assert!(!acquirer.exceeds_deadline(Duration::MAX, Duration::MAX));
    }

    #[test]
    fn give_up_counts_attempts_from_one() {
        let error = give_up(
            AcquireErrorKind::BudgetExhausted,
            AttemptBudget::Limited(3).first_attempt(),
            Duration::ZERO,
            "boom",
        );

        assert_eq!(error.attempts(), 1);
    }

    #[test]
    fn logs_leave_the_outcome_alone() {
        let acquirer = Acquirer::new(Clock::new_frozen())
            .backoff(Backoff::new(Duration::ZERO, Duration::ZERO))
            .max_attempts(3)
            .enable_logs();

        let error = block_on(acquirer.acquire(|| async { Err::<(), _>("still down") })).unwrap_err();

        assert_eq!(error.kind(), AcquireErrorKind::BudgetExhausted);
        assert_eq!(error.attempts(), 3);
        assert_eq!(*error.last_error(), "still down");
    }

    #[cfg(not(miri))]
    #[test]
    fn metrics_report_failures_and_retries() {
        let exporter = opentelemetry_sdk::metrics::InMemoryMetricExporter::default();
        let provider = opentelemetry_sdk::metrics::SdkMeterProvider::builder()
            .with_periodic_exporter(exporter.clone())
            .build();

        let acquirer = Acquirer::new(Clock::new_frozen())
            .name("under_test")
            .backoff(Backoff::new(Duration::ZERO, Duration::ZERO))
            .max_attempts(2)
            .enable_metrics(&provider);

        let error = block_on(acquirer.acquire(|| async { Err::<(), _>("down") })).unwrap_err();
        assert_eq!(error.kind(), AcquireErrorKind::BudgetExhausted);

        provider.force_flush().unwrap();

        let metrics = exporter.get_finished_metrics().unwrap();
        let dump = format!("{metrics:?}");

        assert!(dump.contains("acquisition.event"));
        assert!(dump.contains("attempt_failed"));
        assert!(dump.contains("retry_scheduled"));
        assert!(dump.contains("under_test"));
    }
}
