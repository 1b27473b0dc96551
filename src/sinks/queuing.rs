// Lilt - A non-blocking Statsd client for Rust!
//
// Copyright 2026 The Lilt Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::handler::{self, ErrorHandler, NopErrorHandler};
use crate::payload::Payload;
use crate::queue::MessageQueue;
use crate::resolve::{AddressResolver, StaticResolver, VolatileResolver};
use crate::sender::{BatchingSender, SharedHandler, SharedResolver, SharedTransport, WorkerHandle};
use crate::sinks::core::{MetricSink, SinkStats, SocketStats};
use crate::transport::{Transport, UdpTransport};
use crate::types::{ErrorKind, MetricError, MetricResult};
use crate::{DEFAULT_PACKET_SIZE, DEFAULT_POLL_INTERVAL, DEFAULT_QUEUE_CAPACITY, DEFAULT_STOP_TIMEOUT};
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::panic::RefUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Implementation of a `MetricSink` that sends metrics to a Statsd server
/// over UDP from a background thread, never blocking the caller.
///
/// Metrics submitted to this sink are placed in a bounded queue. A single
/// thread (named `lilt-sender`) takes them off the queue, joins them with
/// newlines into datagrams of at most 1400 bytes (by default) and sends each
/// datagram to the Statsd server. A datagram is sent as soon as the next
/// metric wouldn't fit, or when the queue is empty, so metrics are batched
/// under load without delaying lone metrics.
///
/// When the queue is full, metrics are dropped. Nothing is ever returned to
/// the caller: failures to resolve the server, send datagrams, or shut down
/// are passed to the configured `ErrorHandler` (by default, discarded).
///
/// Call `.stop()` to shut the sink down: it waits (up to 30 seconds by
/// default) for the sender thread to send what it has buffered and then
/// closes the socket. Metrics still queued at that point are discarded.
/// Dropping the sink only signals the thread to stop, without waiting.
///
/// # Example
///
/// ```no_run
/// use lilt::{QueuingUdpSink, DEFAULT_PORT};
///
/// let sink = QueuingUdpSink::from_host("metrics.example.com", DEFAULT_PORT, 1024).unwrap();
/// sink.send("some.counter:1|c");
/// sink.send("some.timer:23|ms");
/// sink.stop();
/// ```
pub struct QueuingUdpSink {
    queue: Arc<MessageQueue>,
    transport: SharedTransport,
    errors: SharedHandler,
    worker: Mutex<Option<WorkerHandle>>,
    stats: SocketStats,
    panics: Arc<AtomicU64>,
    stop_timeout: Duration,
}

impl QueuingUdpSink {
    /// Create a sink sending to `host:port` with a queue holding up to
    /// `queue_capacity` metrics and default settings otherwise.
    ///
    /// The host is resolved once, here, and the address is used for the
    /// lifetime of the sink.
    ///
    /// # Failures
    ///
    /// This method may fail if:
    ///
    /// * It is unable to resolve the hostname of the metric server.
    /// * `queue_capacity` is zero.
    /// * It is unable to bind a local UDP socket.
    /// * It is unable to start the sender thread.
    pub fn from_host(host: &str, port: u16, queue_capacity: usize) -> MetricResult<QueuingUdpSink> {
        Self::builder(host, port).queue_capacity(queue_capacity).build()
    }

    /// Start building a sink that sends to `host:port`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use lilt::{LoggingErrorHandler, QueuingUdpSink, DEFAULT_PORT};
    /// use std::time::Duration;
    ///
    /// let sink = QueuingUdpSink::builder("metrics.example.com", DEFAULT_PORT)
    ///     .queue_capacity(4096)
    ///     .volatile_resolution(true)
    ///     .error_handler(LoggingErrorHandler::new())
    ///     .stop_timeout(Duration::from_secs(5))
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn builder<H>(host: H, port: u16) -> QueuingUdpSinkBuilder
    where
        H: Into<String>,
    {
        QueuingUdpSinkBuilder::new(Target::Host(host.into(), port))
    }

    /// Start building a sink that asks `resolver` where to send each metric.
    ///
    /// The resolver is called by the sender thread once per metric and is
    /// used as given: wrap it in a `StaticResolver` to resolve only once.
    pub fn builder_with_resolver<R>(resolver: R) -> QueuingUdpSinkBuilder
    where
        R: AddressResolver + Send + Sync + RefUnwindSafe + 'static,
    {
        QueuingUdpSinkBuilder::new(Target::Resolver(Arc::new(resolver)))
    }

    /// Queue a metric to be sent, returning `false` if it was dropped
    /// because the queue is full or the sink has been stopped.
    pub fn send<P>(&self, payload: P) -> bool
    where
        P: Into<Payload>,
    {
        self.queue.offer(payload.into())
    }

    /// Stop the sender thread and close the socket.
    ///
    /// New metrics are rejected right away. The sender thread is then given
    /// up to the stop timeout to send what it has buffered, after which the
    /// socket is closed whether or not the thread finished. Anything that
    /// goes wrong is passed to the error handler. Calling this more than
    /// once does nothing.
    pub fn stop(&self) {
        let worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner).take();
        let worker = match worker {
            Some(w) => w,
            None => return,
        };

        self.queue.close();
        if let Err(e) = worker.stop(self.stop_timeout) {
            self.report(e);
        }

        if let Err(e) = self.transport.close() {
            self.report(MetricError::with_cause(ErrorKind::Shutdown, "failed to close socket", e));
        }

        debug!("lilt: queuing sink stopped");
    }

    /// Has `.stop()` been called?
    pub fn is_stopped(&self) -> bool {
        self.queue.is_closed()
    }

    /// Return the number of times the sender thread has recovered from a
    /// panic in the resolver or transport. In typical use this should always
    /// be `0`.
    pub fn panics(&self) -> u64 {
        self.panics.load(Ordering::Acquire)
    }

    /// Return the number of currently queued metrics. Note that due to the way
    /// this number is computed (submitted metrics - drained metrics), it is
    /// necessarily approximate.
    pub fn queued(&self) -> u64 {
        self.queue.queued()
    }

    /// Return the number of metrics successfully submitted to this sink.
    pub fn submitted(&self) -> u64 {
        self.queue.submitted()
    }

    /// Return the number of metrics dropped because the queue was full or
    /// the sink was stopped.
    pub fn dropped(&self) -> u64 {
        self.queue.dropped()
    }

    /// Return the number of metrics removed from the queue. Note that this does
    /// not indicate that the metric has been successfully sent, only that the
    /// sender thread has taken it (or discarded it while stopping).
    pub fn drained(&self) -> u64 {
        self.queue.drained()
    }

    fn report(&self, err: MetricError) {
        handler::dispatch(self.errors.as_ref(), err);
    }
}

impl MetricSink for QueuingUdpSink {
    fn emit(&self, payload: Payload) -> bool {
        self.send(payload)
    }

    fn stats(&self) -> SinkStats {
        SinkStats {
            metrics_submitted: self.submitted(),
            metrics_dropped: self.dropped(),
            metrics_drained: self.drained(),
            panics: self.panics(),
            ..SinkStats::from(&self.stats)
        }
    }
}

impl Drop for QueuingUdpSink {
    /// Send the sender thread a signal to stop.
    ///
    /// Note that this destructor only sends the thread a signal to stop, it
    /// doesn't wait for it to stop. Use `.stop()` for that.
    fn drop(&mut self) {
        self.queue.close();
        if let Some(w) = self.worker.lock().unwrap_or_else(PoisonError::into_inner).as_ref() {
            w.signal();
        }
    }
}

impl fmt::Debug for QueuingUdpSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuingUdpSink")
            .field("queue", &self.queue)
            .field("stop_timeout", &self.stop_timeout)
            .finish()
    }
}

enum Target {
    Host(String, u16),
    Resolver(SharedResolver),
}

/// Builder for creating and customizing a `QueuingUdpSink`.
///
/// Created by `QueuingUdpSink::builder` or
/// `QueuingUdpSink::builder_with_resolver`.
#[must_use]
pub struct QueuingUdpSinkBuilder {
    target: Target,
    volatile: bool,
    queue_capacity: usize,
    buffer_size: usize,
    poll_interval: Duration,
    stop_timeout: Duration,
    bind_addr: SocketAddr,
    transport: Option<SharedTransport>,
    errors: SharedHandler,
}

impl QueuingUdpSinkBuilder {
    fn new(target: Target) -> Self {
        QueuingUdpSinkBuilder {
            target,
            volatile: false,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            buffer_size: DEFAULT_PACKET_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            transport: None,
            errors: Arc::new(NopErrorHandler),
        }
    }

    /// Maximum number of metrics waiting to be sent. Default 1024.
    pub fn queue_capacity(self, capacity: usize) -> Self {
        Self {
            queue_capacity: capacity,
            ..self
        }
    }

    /// Handler for errors from the sender thread and from `.stop()`.
    /// Discards errors by default.
    pub fn error_handler<E>(self, errors: E) -> Self
    where
        E: ErrorHandler + Send + Sync + RefUnwindSafe + 'static,
    {
        Self {
            errors: Arc::new(errors),
            ..self
        }
    }

    /// Ask `resolver` where to send each metric instead of the host given
    /// when creating the builder.
    pub fn resolver<R>(self, resolver: R) -> Self
    where
        R: AddressResolver + Send + Sync + RefUnwindSafe + 'static,
    {
        Self {
            target: Target::Resolver(Arc::new(resolver)),
            ..self
        }
    }

    /// Resolve the host for every metric sent instead of once when the sink
    /// is built. Useful when the address of the server may change. Has no
    /// effect when a custom resolver is used. Default `false`.
    pub fn volatile_resolution(self, volatile: bool) -> Self {
        Self { volatile, ..self }
    }

    /// Maximum size of each datagram, in bytes. Default 1400.
    ///
    /// For guidance on sizing see the
    /// [Statsd docs](https://github.com/etsy/statsd/blob/master/docs/metric_types.md#multi-metric-packets).
    pub fn buffer_size(self, size: usize) -> Self {
        Self {
            buffer_size: size,
            ..self
        }
    }

    /// How long the sender thread waits for a metric before checking if it
    /// has been asked to stop. Default 1 second.
    pub fn poll_interval(self, interval: Duration) -> Self {
        Self {
            poll_interval: interval,
            ..self
        }
    }

    /// How long `.stop()` waits for the sender thread. Default 30 seconds.
    pub fn stop_timeout(self, timeout: Duration) -> Self {
        Self {
            stop_timeout: timeout,
            ..self
        }
    }

    /// Local address to bind the UDP socket to. Default `0.0.0.0:0`.
    pub fn bind_addr(self, addr: SocketAddr) -> Self {
        Self { bind_addr: addr, ..self }
    }

    /// Send datagrams with `transport` instead of binding a UDP socket.
    pub fn transport<T>(self, transport: T) -> Self
    where
        T: Transport + Send + Sync + RefUnwindSafe + 'static,
    {
        Self {
            transport: Some(Arc::new(transport)),
            ..self
        }
    }

    /// Returns a `QueuingUdpSink` with its sender thread running.
    ///
    /// # Failures
    ///
    /// This method may fail if:
    ///
    /// * It is unable to resolve the hostname of the metric server (unless
    ///   volatile resolution or a custom resolver is used).
    /// * The queue capacity or buffer size is zero.
    /// * It is unable to bind a local UDP socket.
    /// * It is unable to start the sender thread.
    pub fn build(self) -> MetricResult<QueuingUdpSink> {
        if self.buffer_size == 0 {
            return Err(MetricError::from((
                ErrorKind::InvalidInput,
                "buffer size must be at least 1",
            )));
        }

        let queue = Arc::new(MessageQueue::new(self.queue_capacity)?);
        let resolver: SharedResolver = match self.target {
            Target::Host(host, port) if self.volatile => Arc::new(VolatileResolver::new((host, port))),
            Target::Host(host, port) => Arc::new(StaticResolver::new((host.as_str(), port))?),
            Target::Resolver(r) => r,
        };

        let transport: SharedTransport = match self.transport {
            Some(t) => t,
            None => Arc::new(UdpTransport::bind(self.bind_addr)?),
        };

        let sender = BatchingSender::new(
            Arc::clone(&queue),
            resolver,
            Arc::clone(&transport),
            Arc::clone(&self.errors),
        )
        .buffer_size(self.buffer_size)
        .poll_interval(self.poll_interval);

        let stats = sender.stats();
        let panics = sender.panic_counter();
        let worker = WorkerHandle::spawn(sender)?;

        debug!(
            "lilt: queuing sink started, queue {} metrics, buffer {} bytes",
            self.queue_capacity, self.buffer_size
        );

        Ok(QueuingUdpSink {
            queue,
            transport,
            errors: self.errors,
            worker: Mutex::new(Some(worker)),
            stats,
            panics,
            stop_timeout: self.stop_timeout,
        })
    }
}
