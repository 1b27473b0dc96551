// Lilt - A non-blocking Statsd client for Rust!
//
// Copyright 2026 The Lilt Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Advanced extension points for Lilt.
//!
//! The types and traits in this module are exposed for documentation
//! purposes and for building custom metric types or sinks. Typical use of
//! Lilt shouldn't require any of them.

pub use crate::builder::MetricValue;
pub use crate::client::{ToCounterValue, ToGaugeValue, ToHistogramValue, ToTimerValue};
pub use crate::io::SendBuffer;
