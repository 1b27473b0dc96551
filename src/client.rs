// Lilt - A non-blocking Statsd client for Rust!
//
// Copyright 2026 The Lilt Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::builder::{MetricFormatter, MetricValue};
use crate::payload::Payload;
use crate::sinks::{MetricSink, SinkStats};
use crate::tags::tag_string;
use crate::types::{Counter, ErrorKind, Gauge, Histogram, Metric, MetricError, MetricResult, Timer};
use std::fmt;
use std::panic::RefUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

/// Types that can be the amount of a counter (`i64`).
///
/// Exposed so the accepted types show up in the docs. Typical use of Lilt
/// shouldn't require interacting with this trait.
pub trait ToCounterValue {
    fn try_to_value(self) -> MetricResult<MetricValue>;
}

impl ToCounterValue for i64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Signed(self))
    }
}

/// Types that can be recorded as a timing: `u64` milliseconds or a
/// `Duration`.
pub trait ToTimerValue {
    fn try_to_value(self) -> MetricResult<MetricValue>;
}

impl ToTimerValue for u64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Unsigned(self))
    }
}

impl ToTimerValue for Duration {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        duration_to_millis(self)
    }
}

/// Types that can be recorded as a gauge.
pub trait ToGaugeValue {
    fn try_to_value(self) -> MetricResult<MetricValue>;
}

impl ToGaugeValue for u64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Unsigned(self))
    }
}

impl ToGaugeValue for f64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Float(self))
    }
}

/// Types that can be recorded as a histogram value.
pub trait ToHistogramValue {
    fn try_to_value(self) -> MetricResult<MetricValue>;
}

impl ToHistogramValue for u64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Unsigned(self))
    }
}

impl ToHistogramValue for f64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Float(self))
    }
}

impl ToHistogramValue for Duration {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        duration_to_millis(self)
    }
}

fn duration_to_millis(d: Duration) -> MetricResult<MetricValue> {
    let as_millis = d.as_millis();
    if as_millis > u64::MAX as u128 {
        Err(MetricError::from((ErrorKind::InvalidInput, "u64 overflow")))
    } else {
        Ok(MetricValue::Unsigned(as_millis as u64))
    }
}

/// Record changes to a counter.
///
/// The client only sends each change; rates and totals are worked out by the
/// Statsd server. Requests served or failed logins are typical counters.
///
/// Tags are a [Datadog](https://docs.datadoghq.com/developers/dogstatsd/)
/// extension, plain Statsd servers may reject them.
pub trait Counted<T>
where
    T: ToCounterValue,
{
    /// Add `count` (which may be negative) to the counter `key`.
    fn count(&self, key: &str, count: T) -> MetricResult<Counter> {
        self.count_with_tags(key, count, &[])
    }

    /// Add `count` to the counter `key`, with extra tags.
    fn count_with_tags(&self, key: &str, count: T, tags: &[&str]) -> MetricResult<Counter>;
}

/// Shorthands for adding or removing one from an `i64` counter.
pub trait CountedExt: Counted<i64> {
    /// Add one to the counter.
    fn incr(&self, key: &str) -> MetricResult<Counter> {
        self.count(key, 1)
    }

    /// Increment the counter by 1, adding the given tags to the metric.
    fn incr_with_tags(&self, key: &str, tags: &[&str]) -> MetricResult<Counter> {
        self.count_with_tags(key, 1, tags)
    }

    /// Remove one from the counter.
    fn decr(&self, key: &str) -> MetricResult<Counter> {
        self.count(key, -1)
    }

    /// Decrement the counter by 1, adding the given tags to the metric.
    fn decr_with_tags(&self, key: &str, tags: &[&str]) -> MetricResult<Counter> {
        self.count_with_tags(key, -1, tags)
    }
}

/// Record how long something took, in milliseconds.
///
/// Accepts `u64` milliseconds or a `Duration`, which is truncated to whole
/// milliseconds. A `Duration` too long to fit a `u64` is an `InvalidInput`
/// error.
pub trait Timed<T>
where
    T: ToTimerValue,
{
    /// Record a timing for `key`.
    fn time(&self, key: &str, time: T) -> MetricResult<Timer> {
        self.time_with_tags(key, time, &[])
    }

    /// Record a timing for `key`, with extra tags.
    fn time_with_tags(&self, key: &str, time: T, tags: &[&str]) -> MetricResult<Timer>;
}

/// Record the current value of something, such as the size of a pool or
/// the number of open connections. The server keeps the last value sent.
///
/// Accepts `u64` and `f64` values.
pub trait Gauged<T>
where
    T: ToGaugeValue,
{
    /// Set the gauge `key` to `value`.
    fn gauge(&self, key: &str, value: T) -> MetricResult<Gauge> {
        self.gauge_with_tags(key, value, &[])
    }

    /// Set the gauge `key` to `value`, with extra tags.
    fn gauge_with_tags(&self, key: &str, value: T, tags: &[&str]) -> MetricResult<Gauge>;
}

/// Record a sample whose distribution the server computes (response sizes,
/// queue depths, latencies).
///
/// Accepts `u64`, `f64` and `Duration` (as milliseconds).
pub trait Histogrammed<T>
where
    T: ToHistogramValue,
{
    /// Add a sample to the histogram `key`.
    fn histogram(&self, key: &str, value: T) -> MetricResult<Histogram> {
        self.histogram_with_tags(key, value, &[])
    }

    /// Add a sample to the histogram `key`, with extra tags.
    fn histogram_with_tags(&self, key: &str, value: T, tags: &[&str]) -> MetricResult<Histogram>;
}

/// Every metric trait `StatsdClient` implements, as a single trait object.
///
/// Handy for holding a client as `Box<dyn MetricClient>` or taking one as a
/// generic parameter.
///
/// ```
/// use std::time::Duration;
/// use lilt::prelude::*;
/// use lilt::{StatsdClient, NopMetricSink};
///
/// let client: Box<dyn MetricClient> = Box::new(StatsdClient::from_sink("prefix", NopMetricSink));
///
/// client.count("some.counter", 1).unwrap();
/// client.time("some.timer", 42).unwrap();
/// client.time("some.timer", Duration::from_millis(42)).unwrap();
/// client.gauge("some.gauge", 8).unwrap();
/// client.gauge("some.gauge", 8.0).unwrap();
/// client.histogram("some.histogram", 4).unwrap();
/// client.histogram("some.histogram", 4.0).unwrap();
/// client.histogram("some.histogram", Duration::from_nanos(4)).unwrap();
/// ```
pub trait MetricClient:
    Counted<i64>
    + CountedExt
    + Timed<u64>
    + Timed<Duration>
    + Gauged<u64>
    + Gauged<f64>
    + Histogrammed<u64>
    + Histogrammed<f64>
    + Histogrammed<Duration>
{
}

/// Builder for a `StatsdClient` with constant tags.
///
/// Created by `StatsdClient::builder()`.
///
/// # Example
///
/// ```
/// use lilt::prelude::*;
/// use lilt::{StatsdClient, NopMetricSink};
///
/// let client = StatsdClient::builder("prefix", NopMetricSink)
///     .with_tag("environment", "production")
///     .with_tag_value("rust")
///     .build();
///
/// client.count("something", 123).unwrap();
/// client.count_with_tags("some.counter", 42, &["region:us-east-2"]).unwrap();
/// ```
pub struct StatsdClientBuilder {
    prefix: String,
    sink: Arc<dyn MetricSink + Sync + Send + RefUnwindSafe>,
    tags: Vec<String>,
}

impl StatsdClientBuilder {
    fn new<T>(prefix: &str, sink: T) -> Self
    where
        T: MetricSink + Sync + Send + RefUnwindSafe + 'static,
    {
        StatsdClientBuilder {
            prefix: Self::formatted_prefix(prefix),
            sink: Arc::new(sink),
            tags: Vec::new(),
        }
    }

    /// Add a default `key:value` tag to every metric published by the built
    /// [StatsdClient].
    pub fn with_tag<K, V>(mut self, key: K, value: V) -> Self
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        self.tags.push(format!("{}:{}", key, value));
        self
    }

    /// Add a default tag with only a value to every metric published by the built
    /// [StatsdClient].
    pub fn with_tag_value<V>(mut self, value: V) -> Self
    where
        V: ToString,
    {
        self.tags.push(value.to_string());
        self
    }

    /// Create the client. Constant tags are rendered once, here.
    pub fn build(self) -> StatsdClient {
        StatsdClient::from_builder(self)
    }

    fn formatted_prefix(prefix: &str) -> String {
        if prefix.is_empty() {
            String::new()
        } else {
            format!("{}.", prefix.trim_end_matches('.'))
        }
    }
}

/// Client for Statsd that implements various traits to record metrics.
///
/// The client is the main entry point for users of this library. It supports
/// several traits for recording metrics of different types.
///
/// * `Counted` and `CountedExt` for emitting counters.
/// * `Timed` for emitting timings.
/// * `Gauged` for emitting gauge values.
/// * `Histogrammed` for emitting histogram values.
/// * `MetricClient` for a combination of all of the above.
///
/// The client formats each metric and hands it to a `MetricSink`. For real
/// use that's a `QueuingUdpSink`, which sends metrics from a background
/// thread: recording a metric never blocks on the network and never fails
/// because of it. The only errors returned by the client are for values that
/// can't be represented (such as a `Duration` too large for a `u64` number
/// of milliseconds).
///
/// Clients are cheap to clone and can be shared between threads.
///
/// # Example
///
/// ```no_run
/// use lilt::prelude::*;
/// use lilt::{QueuingUdpSink, StatsdClient, DEFAULT_PORT};
///
/// let sink = QueuingUdpSink::from_host("metrics.example.com", DEFAULT_PORT, 1024).unwrap();
/// let client = StatsdClient::builder("my.app", sink)
///     .with_tag("env", "prod")
///     .build();
///
/// client.incr("logins").unwrap();
/// client.gauge_with_tags("pool.size", 12, &["pool:db"]).unwrap();
/// ```
#[derive(Clone)]
pub struct StatsdClient {
    prefix: String,
    tags: Option<String>,
    sink: Arc<dyn MetricSink + Sync + Send + RefUnwindSafe>,
}

impl StatsdClient {
    /// Client that prepends `prefix` to every key and hands metrics to
    /// `sink`, with no constant tags.
    ///
    /// # Example
    ///
    /// ```
    /// use lilt::{StatsdClient, NopMetricSink};
    ///
    /// let prefix = "my.stats";
    /// let client = StatsdClient::from_sink(prefix, NopMetricSink);
    /// ```
    pub fn from_sink<T>(prefix: &str, sink: T) -> Self
    where
        T: MetricSink + Sync + Send + RefUnwindSafe + 'static,
    {
        Self::builder(prefix, sink).build()
    }

    /// Start building a client for `prefix` and `sink`. Constant tags are
    /// added with the builder's methods.
    pub fn builder<T>(prefix: &str, sink: T) -> StatsdClientBuilder
    where
        T: MetricSink + Sync + Send + RefUnwindSafe + 'static,
    {
        StatsdClientBuilder::new(prefix, sink)
    }

    /// Hand an already formatted metric (prefix and tags included) to the
    /// sink, returning `false` if the sink dropped it.
    ///
    /// Only needed for metric types Lilt doesn't know about.
    pub fn send_metric<M>(&self, metric: &M) -> bool
    where
        M: Metric,
    {
        self.sink.emit(Payload::from(metric.as_metric_str().to_owned()))
    }

    /// Return I/O and queue telemetry for the underlying sink.
    pub fn sink_stats(&self) -> SinkStats {
        self.sink.stats()
    }

    fn from_builder(builder: StatsdClientBuilder) -> Self {
        let tags = if builder.tags.is_empty() {
            None
        } else {
            Some(tag_string(&builder.tags, None))
        };

        StatsdClient {
            prefix: builder.prefix,
            tags,
            sink: builder.sink,
        }
    }

    fn emit<M>(&self, formatter: MetricFormatter<'_>, tags: &[&str]) -> M
    where
        M: Metric + From<String>,
    {
        let metric: M = formatter.with_tags(tags, self.tags.as_deref()).format();
        // Dropped metrics (full queue, stopped sink) are not an error for callers.
        let _accepted = self.send_metric(&metric);
        metric
    }
}

impl fmt::Debug for StatsdClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StatsdClient {{ prefix: {:?}, tags: {:?}, sink: ... }}",
            self.prefix, self.tags
        )
    }
}

impl<T> Counted<T> for StatsdClient
where
    T: ToCounterValue,
{
    fn count_with_tags(&self, key: &str, count: T, tags: &[&str]) -> MetricResult<Counter> {
        let value = count.try_to_value()?;
        Ok(self.emit(MetricFormatter::counter(&self.prefix, key, value), tags))
    }
}

impl CountedExt for StatsdClient {}

impl<T> Timed<T> for StatsdClient
where
    T: ToTimerValue,
{
    fn time_with_tags(&self, key: &str, time: T, tags: &[&str]) -> MetricResult<Timer> {
        let value = time.try_to_value()?;
        Ok(self.emit(MetricFormatter::timer(&self.prefix, key, value), tags))
    }
}

impl<T> Gauged<T> for StatsdClient
where
    T: ToGaugeValue,
{
    fn gauge_with_tags(&self, key: &str, value: T, tags: &[&str]) -> MetricResult<Gauge> {
        let value = value.try_to_value()?;
        Ok(self.emit(MetricFormatter::gauge(&self.prefix, key, value), tags))
    }
}

impl<T> Histogrammed<T> for StatsdClient
where
    T: ToHistogramValue,
{
    fn histogram_with_tags(&self, key: &str, value: T, tags: &[&str]) -> MetricResult<Histogram> {
        let value = value.try_to_value()?;
        Ok(self.emit(MetricFormatter::histogram(&self.prefix, key, value), tags))
    }
}

impl MetricClient for StatsdClient {}

#[cfg(test)]
mod tests {
    use super::{Counted, CountedExt, Gauged, Histogrammed, MetricClient, StatsdClient, Timed};
    use crate::payload::Payload;
    use crate::sinks::{MetricSink, NopMetricSink, SpyMetricSink};
    use crate::types::{ErrorKind, Metric};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_statsd_client_empty_prefix() {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::from_sink("", sink);
        client.count("some.counter", 1).unwrap();

        assert_eq!(Payload::from("some.counter:1|c"), rx.try_recv().unwrap());
    }

    #[test]
    fn test_statsd_client_prefix_trailing_dot() {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::from_sink("prefix.", sink);
        client.incr("some.counter").unwrap();

        assert_eq!(Payload::from("prefix.some.counter:1|c"), rx.try_recv().unwrap());
    }

    #[test]
    fn test_statsd_client_metric_types() {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::from_sink("prefix", sink);

        client.decr("some.counter").unwrap();
        client.time("some.timer", 25).unwrap();
        client.time("some.timer", Duration::from_millis(1500)).unwrap();
        client.gauge("some.gauge", 5).unwrap();
        client.gauge("some.gauge", 5.5).unwrap();
        client.histogram("some.histogram", 42).unwrap();
        client.histogram("some.histogram", Duration::from_secs(2)).unwrap();

        let lines: Vec<Payload> = rx.try_iter().collect();
        assert_eq!(
            vec![
                Payload::from("prefix.some.counter:-1|c"),
                Payload::from("prefix.some.timer:25|ms"),
                Payload::from("prefix.some.timer:1500|ms"),
                Payload::from("prefix.some.gauge:5|g"),
                Payload::from("prefix.some.gauge:5.5|g"),
                Payload::from("prefix.some.histogram:42|h"),
                Payload::from("prefix.some.histogram:2000|h"),
            ],
            lines
        );
    }

    #[test]
    fn test_statsd_client_returns_metric() {
        let client = StatsdClient::from_sink("prefix", NopMetricSink);
        let counter = client.count_with_tags("some.counter", 3, &["a", "b"]).unwrap();

        assert_eq!("prefix.some.counter:3|c|#b,a", counter.as_metric_str());
    }

    #[test]
    fn test_statsd_client_constant_tags() {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::builder("prefix", sink)
            .with_tag("env", "prod")
            .with_tag_value("canary")
            .build();

        client.count("some.counter", 1).unwrap();
        client.gauge_with_tags("some.gauge", 2, &["pool:db", "shard:3"]).unwrap();

        assert_eq!(
            Payload::from("prefix.some.counter:1|c|#canary,env:prod"),
            rx.try_recv().unwrap()
        );
        assert_eq!(
            Payload::from("prefix.some.gauge:2|g|#canary,env:prod,shard:3,pool:db"),
            rx.try_recv().unwrap()
        );
    }

    #[test]
    fn test_statsd_client_duration_overflow() {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::from_sink("prefix", sink);
        let res = client.time("some.timer", Duration::from_secs(u64::MAX));

        assert_eq!(ErrorKind::InvalidInput, res.unwrap_err().kind());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_statsd_client_dropped_metric_is_not_an_error() {
        struct RejectingSink {
            attempts: AtomicUsize,
        }

        impl MetricSink for RejectingSink {
            fn emit(&self, _payload: Payload) -> bool {
                self.attempts.fetch_add(1, Ordering::Relaxed);
                false
            }
        }

        let sink = Arc::new(RejectingSink {
            attempts: AtomicUsize::new(0),
        });
        let client = StatsdClient::from_sink("prefix", sink.clone());

        assert!(client.incr("some.counter").is_ok());
        assert_eq!(1, sink.attempts.load(Ordering::Relaxed));
    }

    // The following tests really just ensure that we've actually
    // implemented all the traits we're supposed to correctly. If
    // we hadn't, this wouldn't compile.

    #[test]
    fn test_statsd_client_as_counted() {
        let client: Box<dyn Counted<i64>> = Box::new(StatsdClient::from_sink("prefix", NopMetricSink));
        client.count("some.counter", 5).unwrap();
    }

    #[test]
    fn test_statsd_client_as_timed() {
        let client: Box<dyn Timed<u64>> = Box::new(StatsdClient::from_sink("prefix", NopMetricSink));
        client.time("some.timer", 20).unwrap();
    }

    #[test]
    fn test_statsd_client_as_gauged() {
        let client: Box<dyn Gauged<f64>> = Box::new(StatsdClient::from_sink("prefix", NopMetricSink));
        client.gauge("some.gauge", 32.5).unwrap();
    }

    #[test]
    fn test_statsd_client_as_histogrammed() {
        let client: Box<dyn Histogrammed<u64>> = Box::new(StatsdClient::from_sink("prefix", NopMetricSink));
        client.histogram("some.histogram", 9).unwrap();
    }

    #[test]
    fn test_statsd_client_as_metric_client() {
        let client: Box<dyn MetricClient> = Box::new(StatsdClient::from_sink("prefix", NopMetricSink));

        client.count("some.counter", 3).unwrap();
        client.incr("some.counter").unwrap();
        client.time("some.timer", 198).unwrap();
        client.gauge("some.gauge", 4).unwrap();
        client.histogram("some.histogram", 29).unwrap();
    }
}
