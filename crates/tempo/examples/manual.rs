// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Demonstrates controlling the passage of time with `ManualClock`.

use std::time::Duration;

use futures::executor::block_on;
use tempo::ManualClock;

fn main() {
    let control = ManualClock::new().auto_advance_timers(true);
    let clock = control.to_clock();

    let watch = clock.stopwatch();

    // Completes immediately; the clock jumps forward instead of waiting.
    block_on(clock.sleep(Duration::from_secs(600)));

    println!("a ten-minute sleep took {:?} of clock time", watch.elapsed());
    println!("and finished instantly in real time");
}
