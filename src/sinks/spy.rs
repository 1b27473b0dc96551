// Lilt - A non-blocking Statsd client for Rust!
//
// Copyright 2026 The Lilt Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::payload::Payload;
use crate::sinks::core::MetricSink;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

/// `MetricSink` that forwards every payload to a channel, for checking what a
/// client emits in tests.
///
/// The caller keeps the `Receiver`. The channel is unbounded unless created
/// with `with_capacity`, in which case payloads are dropped once it's full.
#[derive(Debug, Clone)]
pub struct SpyMetricSink {
    sender: Sender<Payload>,
}

impl SpyMetricSink {
    pub fn new() -> (Receiver<Payload>, Self) {
        let (tx, rx) = unbounded();
        (rx, SpyMetricSink { sender: tx })
    }

    pub fn with_capacity(queue: usize) -> (Receiver<Payload>, Self) {
        let (tx, rx) = bounded(queue);
        (rx, SpyMetricSink { sender: tx })
    }
}

impl MetricSink for SpyMetricSink {
    fn emit(&self, payload: Payload) -> bool {
        self.sender.try_send(payload).is_ok()
    }
}
