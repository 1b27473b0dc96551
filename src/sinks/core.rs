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
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Point-in-time copy of the counters kept by a sink.
///
/// Socket counters (`bytes_*`, `packets_*`) count datagrams handed to the
/// network. Queue counters (`metrics_*`) count individual payloads.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SinkStats {
    pub bytes_sent: u64,
    pub packets_sent: u64,
    pub bytes_dropped: u64,
    pub packets_dropped: u64,
    pub metrics_submitted: u64,
    pub metrics_dropped: u64,
    pub metrics_drained: u64,
    pub panics: u64,
}

/// Shared counters for datagrams written to a socket.
#[derive(Debug, Clone, Default)]
pub struct SocketStats {
    bytes_sent: Arc<AtomicU64>,
    packets_sent: Arc<AtomicU64>,
    bytes_dropped: Arc<AtomicU64>,
    packets_dropped: Arc<AtomicU64>,
}

impl SocketStats {
    pub fn incr_bytes_sent(&self, n: u64) {
        self.bytes_sent.fetch_add(n, Ordering::Relaxed);
    }

    pub fn incr_packets_sent(&self) {
        self.packets_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_bytes_dropped(&self, n: u64) {
        self.bytes_dropped.fetch_add(n, Ordering::Relaxed);
    }

    pub fn incr_packets_dropped(&self) {
        self.packets_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the result of sending a datagram of `len` bytes, passing the
    /// result through unchanged.
    ///
    /// A short write counts the bytes written as sent and the rest as dropped.
    pub fn update(&self, res: io::Result<usize>, len: usize) -> io::Result<usize> {
        match res {
            Ok(written) => {
                self.incr_bytes_sent(written as u64);
                self.incr_packets_sent();
                if written < len {
                    self.incr_bytes_dropped((len - written) as u64);
                }
                Ok(written)
            }
            Err(e) => {
                self.incr_bytes_dropped(len as u64);
                self.incr_packets_dropped();
                Err(e)
            }
        }
    }
}

impl From<&SocketStats> for SinkStats {
    fn from(stats: &SocketStats) -> Self {
        SinkStats {
            bytes_sent: stats.bytes_sent.load(Ordering::Relaxed),
            packets_sent: stats.packets_sent.load(Ordering::Relaxed),
            bytes_dropped: stats.bytes_dropped.load(Ordering::Relaxed),
            packets_dropped: stats.packets_dropped.load(Ordering::Relaxed),
            ..SinkStats::default()
        }
    }
}

/// Trait for various backends that send Statsd metrics somewhere.
///
/// Each payload is a single metric line in the canonical format to be sent
/// to a Statsd server, without a trailing newline. Examples of each supported
/// metric type are given below.
///
/// ## Counter
///
/// ``` text
/// some.counter:123|c
/// ```
///
/// ## Timer
///
/// ``` text
/// some.timer:456|ms
/// ```
///
/// ## Gauge
///
/// ``` text
/// some.gauge:5|g
/// ```
///
/// ## Histogram
///
/// ``` text
/// some.histogram:4|h
/// ```
///
/// See the [Statsd spec](https://github.com/b/statsd_spec) for more
/// information.
pub trait MetricSink {
    /// Hand a metric to this sink, returning `true` if it was accepted.
    ///
    /// Sinks never block the caller and never report failures to it: a
    /// payload that can't be accepted (a full queue, a stopped sink) is
    /// dropped and `false` is returned. Callers should *NOT* treat that as
    /// an error.
    fn emit(&self, payload: Payload) -> bool;

    /// Return I/O and queue telemetry for this sink, if supported.
    fn stats(&self) -> SinkStats {
        SinkStats::default()
    }
}

impl<T> MetricSink for Arc<T>
where
    T: MetricSink + ?Sized,
{
    fn emit(&self, payload: Payload) -> bool {
        self.as_ref().emit(payload)
    }

    fn stats(&self) -> SinkStats {
        self.as_ref().stats()
    }
}

/// Implementation of a `MetricSink` that discards all metrics.
///
/// Useful for disabling metric collection or unit tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopMetricSink;

impl MetricSink for NopMetricSink {
    fn emit(&self, _payload: Payload) -> bool {
        true
    }
}
