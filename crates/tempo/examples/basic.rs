// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Demonstrates sleeping and measuring elapsed time with a Tokio-driven clock.

use std::time::Duration;

use tempo::Clock;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let clock = Clock::new_tokio();

    let watch = clock.stopwatch();
    clock.sleep(Duration::from_millis(250)).await;

    println!("slept for {:?}", watch.elapsed());
    println!("the current system time is {:?}", clock.system_time());

    Ok(())
}
