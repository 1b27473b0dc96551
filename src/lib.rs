// Lilt - A non-blocking Statsd client for Rust!
//
// Copyright 2026 The Lilt Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A non-blocking, batching Statsd client for Rust!
//!
//! Recording a metric with Lilt never blocks on the network and never fails
//! because of it. Metrics are placed in a bounded queue and sent by a single
//! background thread, which packs as many metrics as fit into each UDP
//! datagram.
//!
//! ## Features
//!
//! * Support for emitting counters, timers, histograms, and gauges to a
//!   Statsd server over UDP.
//! * Support for Datadog style tags, per metric and per client.
//! * A bounded queue between your application and the network: when the
//!   server can't keep up, metrics are dropped instead of piling up.
//! * Batching of metrics into datagrams of a configurable size (1400 bytes
//!   by default), sent as soon as they're full or nothing else is queued.
//! * Resolution of the server address once at startup, or for every metric
//!   when the server may move.
//! * Errors from the background thread reported to a pluggable handler.
//!
//! ## Install
//!
//! To make use of Lilt in your project, add it as a dependency in your
//! `Cargo.toml` file.
//!
//! ```toml
//! [dependencies]
//! lilt = "x.y.z"
//! ```
//!
//! ## Usage
//!
//! Typical use of Lilt is shown below. A `QueuingUdpSink` is created for
//! the Statsd server and handed to a `StatsdClient` which formats metrics.
//!
//! ```rust,no_run
//! use lilt::prelude::*;
//! use lilt::{LoggingErrorHandler, QueuingUdpSink, StatsdClient, DEFAULT_PORT};
//!
//! let sink = QueuingUdpSink::builder("metrics.example.com", DEFAULT_PORT)
//!     .queue_capacity(4096)
//!     .error_handler(LoggingErrorHandler::new())
//!     .build()
//!     .unwrap();
//! let sink = std::sync::Arc::new(sink);
//!
//! let client = StatsdClient::builder("my.prefix", sink.clone())
//!     .with_tag("env", "prod")
//!     .build();
//!
//! client.incr("some.counter").unwrap();
//! client.time("some.methodCall", 42).unwrap();
//! client.gauge_with_tags("some.thing", 7, &["region:us-west-1"]).unwrap();
//! client.histogram("some.value", 5.5).unwrap();
//!
//! // Send what's buffered and close the socket before exiting
//! sink.stop();
//! ```
//!
//! ### Custom Error Handling
//!
//! Since sending happens in another thread, errors (failing to resolve the
//! server, failing to write to the socket) can't be returned to the code
//! recording metrics. They are given to an `ErrorHandler` instead. By
//! default they are discarded. `LoggingErrorHandler` writes them to the
//! [`log`](https://docs.rs/log) facade, and any closure taking a
//! `MetricError` can be used as well.
//!
//! ```rust,no_run
//! use lilt::{MetricError, QueuingUdpSink, DEFAULT_PORT};
//!
//! fn my_error_handler(err: MetricError) {
//!     eprintln!("Error sending metrics: {}", err);
//! }
//!
//! let sink = QueuingUdpSink::builder("metrics.example.com", DEFAULT_PORT)
//!     .error_handler(my_error_handler)
//!     .build();
//! ```
//!
//! ### Address Resolution
//!
//! By default the host of the Statsd server is resolved once, when the sink
//! is built, and that address is used until the sink is stopped. Failing to
//! resolve it is an error returned by `.build()`. If the server may move
//! (such as when it's behind a DNS entry that changes) the host can be
//! resolved for every metric instead, with `.volatile_resolution(true)`.
//! For anything else, an `AddressResolver` implementation (or a closure
//! returning a `MetricResult<SocketAddr>`) can be used.
//!
//! ```rust,no_run
//! use lilt::{QueuingUdpSink, VolatileResolver, DEFAULT_PORT};
//!
//! let sink = QueuingUdpSink::builder_with_resolver(VolatileResolver::new(("statsd.internal", DEFAULT_PORT)))
//!     .build()
//!     .unwrap();
//! ```
//!
//! ### Shutting Down
//!
//! `QueuingUdpSink::stop()` rejects new metrics, waits (up to 30 seconds by
//! default) for the background thread to send whatever it has buffered, and
//! then closes the socket. Metrics still in the queue at that point are
//! discarded. Stopping more than once is harmless, and metrics sent after
//! stopping are silently dropped. Dropping the sink without calling `.stop()`
//! signals the thread to stop but doesn't wait for it.

#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

use std::time::Duration;

/// Default port of a Statsd server.
pub const DEFAULT_PORT: u16 = 8125;

/// Default maximum size of a datagram, in bytes.
pub const DEFAULT_PACKET_SIZE: usize = 1400;

/// Default maximum number of metrics waiting to be sent.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Default time the sender thread waits for a metric before checking if
/// it has been asked to stop.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default time `QueuingUdpSink::stop()` waits for the sender thread.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(30);

pub use self::client::{
    Counted, CountedExt, Gauged, Histogrammed, MetricClient, StatsdClient, StatsdClientBuilder, Timed,
};

pub use self::handler::{ErrorHandler, LoggingErrorHandler, NopErrorHandler};

pub use self::payload::Payload;

pub use self::queue::MessageQueue;

pub use self::resolve::{AddressResolver, StaticResolver, VolatileResolver};

pub use self::sinks::{
    MetricSink, NopMetricSink, QueuingUdpSink, QueuingUdpSinkBuilder, SinkStats, SpyMetricSink,
};

pub use self::tags::tag_string;

pub use self::transport::{Transport, UdpTransport};

pub use self::types::{Counter, ErrorKind, Gauge, Histogram, Metric, MetricError, MetricResult, Timer};

mod builder;
mod client;
pub mod ext;
mod handler;
mod io;
mod payload;
pub mod prelude;
mod queue;
mod resolve;
mod sender;
mod sinks;
mod tags;
mod transport;
mod types;
