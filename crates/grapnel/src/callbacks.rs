// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Display;

use crate::args::{AttemptFailedArgs, RetryScheduledArgs};

crate::define_fn_wrapper!(OnAttemptFailed(Fn(error: &dyn Display, args: AttemptFailedArgs)));

crate::define_fn_wrapper!(OnRetryScheduled(Fn(args: RetryScheduledArgs)));
