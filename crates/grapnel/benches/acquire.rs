// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![expect(missing_docs, reason = "benchmark code")]

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use futures::executor::block_on;
use grapnel::{Acquirer, Backoff};
use tempo::Clock;

fn entry(c: &mut Criterion) {
    let mut group = c.benchmark_group("acquire");

    // First attempt succeeds
    let acquirer = Acquirer::new(Clock::new_frozen());
    group.bench_function("first-try", |b| {
        b.iter(|| {
            _ = block_on(acquirer.acquire(|| async { Ok::<_, &str>(42) }));
        });
    });

    // Three failures before success, with zero delays
    let acquirer = Acquirer::new(Clock::new_frozen()).backoff(Backoff::new(Duration::ZERO, Duration::ZERO));
    group.bench_function("with-retries", |b| {
        b.iter(|| {
            let calls = AtomicU32::new(0);
            _ = block_on(acquirer.acquire(|| {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                async move { if call < 3 { Err("down") } else { Ok(42) } }
            }));
        });
    });

    group.finish();
}

criterion_group!(benches, entry);
criterion_main!(benches);
