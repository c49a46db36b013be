// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Basic acquisition example with a flaky factory and the default backoff.

use std::io::Error;

use grapnel::Acquirer;
use tempo::Clock;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let clock = Clock::new_tokio();
    let acquirer = Acquirer::new(&clock);

    match acquirer.acquire(open_connection).await {
        Ok(connection) => println!("acquisition succeeded, resource: {connection}"),
        Err(e) => println!("acquisition failed, error: {e}"),
    }

    Ok(())
}

// 20% chance of failing with a transient error
async fn open_connection() -> Result<String, Error> {
    if fastrand::i16(0..10) > 8 {
        Err(Error::other("transient connection error"))
    } else {
        Ok("connection".to_string())
    }
}
