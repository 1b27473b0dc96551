// Lilt - A non-blocking Statsd client for Rust!
//
// Copyright 2026 The Lilt Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

pub(crate) mod core;
mod queuing;
mod spy;

pub use crate::sinks::core::{MetricSink, NopMetricSink, SinkStats};
pub use crate::sinks::queuing::{QueuingUdpSink, QueuingUdpSinkBuilder};
pub use crate::sinks::spy::SpyMetricSink;
