// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![expect(missing_docs, reason = "Benchmark code")]

use std::task::{Context, Waker};
use std::time::{Duration, Instant};

use criterion::{Criterion, criterion_group, criterion_main};
use tempo::{Clock, ManualClock};

fn driver_advance(c: &mut Criterion) {
    c.bench_function("driver_advance_five_sleeps", |b| {
        b.iter(|| {
            let (clock, mut driver) = Clock::new_shared();
            let mut cx = Context::from_waker(Waker::noop());

            let mut sleeps: Vec<_> = (1..=5)
                .map(|n| Box::pin(clock.sleep(Duration::from_millis(n))))
                .collect();

            for sleep in &mut sleeps {
                assert!(sleep.as_mut().poll(&mut cx).is_pending());
            }

            let now = Instant::now() + Duration::from_millis(10);
            assert!(driver.advance_timers(now).is_ok());
        });
    });
}

fn manual_advance(c: &mut Criterion) {
    c.bench_function("manual_advance", |b| {
        b.iter(|| {
            let control = ManualClock::new();
            control.advance(Duration::from_millis(10));
        });
    });
}

criterion_group!(benches, driver_advance, manual_advance);
criterion_main!(benches);
