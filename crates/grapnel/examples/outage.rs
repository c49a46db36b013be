// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Demonstrates observing an acquisition that rides out a simulated outage.
//!
//! This example showcases:
//! - Hooks reporting each failed attempt and each scheduled retry
//! - Structured logs emitted through `tracing`
//! - Acquisition event counts flushed to stdout through OpenTelemetry

use std::fmt::Display;
use std::io::Error;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use grapnel::{Acquirer, AttemptFailedArgs, Backoff, RetryScheduledArgs};
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_stdout::MetricExporter;
use tempo::Clock;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const OUTAGE_FAILURES: u32 = 3;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let meter_provider = configure_telemetry();

    let clock = Clock::new_tokio();
    let acquirer = Acquirer::new(&clock)
        .name("primary_db")
        .backoff(Backoff::new(Duration::from_millis(50), Duration::from_millis(400)))
        .enable_logs()
        .enable_metrics(&meter_provider)
        .on_attempt_failed(|error: &dyn Display, args: AttemptFailedArgs| {
            println!("attempt {} failed after {:?}: {error}", args.attempt(), args.elapsed());
        })
        .on_retry_scheduled(|args: RetryScheduledArgs| {
            println!("retrying {} in {:?}", args.name(), args.delay());
        });

    // The first few connection attempts fail while the simulated outage lasts.
    let failures = AtomicU32::new(0);
    let connection = acquirer
        .acquire(move || {
            let failure = failures.fetch_add(1, Ordering::SeqCst);
            async move {
                if failure < OUTAGE_FAILURES {
                    Err(Error::other("connection refused"))
                } else {
                    Ok("connection".to_string())
                }
            }
        })
        .await?;

    println!("acquired: {connection}");

    // Flush metrics to stdout before exiting
    meter_provider.force_flush()?;

    Ok(())
}

fn configure_telemetry() -> SdkMeterProvider {
    // Set up tracing subscriber for logs to console
    tracing_subscriber::registry().with(tracing_subscriber::fmt::layer()).init();

    SdkMeterProvider::builder()
        .with_periodic_exporter(MetricExporter::default())
        .build()
}
