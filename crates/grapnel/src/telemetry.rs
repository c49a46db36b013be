// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#[cfg(any(feature = "metrics", test))]
use opentelemetry::InstrumentationScope;
#[cfg(any(feature = "metrics", test))]
use opentelemetry::metrics::{Counter, MeterProvider};

#[cfg(any(feature = "metrics", test))]
const METER_NAME: &str = "grapnel";
#[cfg(any(feature = "metrics", test))]
const VERSION: &str = "v0.1.0";
#[cfg(any(feature = "metrics", test))]
const SCHEMA_URL: &str = "https://opentelemetry.io/schemas/1.47.0";

/// Key used to annotate the name of the acquirer an event belongs to.
///
/// Values reported under this dimension should be short and concise,
/// preferably in `snake_case`. Examples: `primary_db`, `blob_store`.
#[cfg(any(feature = "metrics", test))]
pub(crate) const ACQUIRER_NAME: &str = "acquisition.acquirer.name";

/// Key used to annotate the specific acquisition event being emitted.
#[cfg(any(feature = "metrics", test))]
pub(crate) const EVENT_NAME: &str = "acquisition.event.name";

/// Key used to annotate the zero-based index of the attempt an event belongs to.
#[cfg(any(feature = "metrics", test))]
pub(crate) const ATTEMPT_INDEX: &str = "acquisition.attempt.index";

/// Key used to annotate whether the attempt budget allows a further attempt.
#[cfg(any(feature = "metrics", test))]
pub(crate) const ATTEMPT_IS_LAST: &str = "acquisition.attempt.is_last";

/// Event reported when an acquisition attempt fails.
#[cfg(any(feature = "metrics", test))]
pub(crate) const ATTEMPT_FAILED_EVENT: &str = "attempt_failed";

/// Event reported when a failed attempt gets a retry scheduled.
#[cfg(any(feature = "metrics", test))]
pub(crate) const RETRY_SCHEDULED_EVENT: &str = "retry_scheduled";

/// Per-acquirer telemetry state, populated by `enable_logs`/`enable_metrics`.
#[derive(Debug, Clone, Default)]
pub(crate) struct Telemetry {
    #[cfg(any(feature = "metrics", test))]
    pub(crate) event_reporter: Option<Counter<u64>>,
    #[cfg(any(feature = "logs", test))]
    pub(crate) logs_enabled: bool,
}

#[cfg(any(feature = "metrics", test))]
pub(crate) fn create_event_counter(meter_provider: &dyn MeterProvider) -> Counter<u64> {
    let meter = meter_provider.meter_with_scope(
        InstrumentationScope::builder(METER_NAME)
            .with_version(VERSION)
            .with_schema_url(SCHEMA_URL)
            .build(),
    );
    meter
        .u64_counter("acquisition.event")
        .with_description("Emitted upon the occurrence of an acquisition event.")
        .with_unit("u64")
        .build()
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
#[cfg(not(miri))]
mod tests {
    use opentelemetry_sdk::metrics::{InMemoryMetricExporter, SdkMeterProvider};

    use super::*;

    #[test]
    fn assert_definitions() {
        let exporter = InMemoryMetricExporter::default();
        let meter_provider = SdkMeterProvider::builder().with_periodic_exporter(exporter.clone()).build();

        let counter = create_event_counter(&meter_provider);
        counter.add(1, &[]);

        meter_provider.force_flush().unwrap();

        let metrics = exporter.get_finished_metrics().unwrap();
        let str = format!("{metrics:?}");

        assert!(str.contains("acquisition.event"));
        assert!(str.contains("u64"));
        assert!(str.contains("grapnel"));
        assert!(str.contains("v0.1.0"));
        assert!(str.contains("https://opentelemetry.io/schemas/1.47"));
    }
}
