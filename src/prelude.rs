// Lilt - A non-blocking Statsd client for Rust!
//
// Copyright 2026 The Lilt Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Export commonly used parts of Lilt for easy glob imports
//!
//! # Example
//!
//! ```
//! use lilt::prelude::*;
//! use lilt::{StatsdClient, NopMetricSink};
//!
//! let client = StatsdClient::from_sink("some.prefix", NopMetricSink);
//!
//! client.count("some.counter", 1).unwrap();
//! client.incr("some.counter").unwrap();
//! client.time("some.timer", 23).unwrap();
//! client.gauge("some.gauge", 45).unwrap();
//! client.histogram("some.histogram", 67).unwrap();
//! ```

pub use crate::client::{Counted, CountedExt, Gauged, Histogrammed, MetricClient, Timed};
pub use crate::handler::ErrorHandler;
pub use crate::resolve::AddressResolver;
pub use crate::sinks::MetricSink;
