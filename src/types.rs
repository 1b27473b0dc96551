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
use std::error;
use std::fmt;
use std::io;

/// Trait for metrics to expose Statsd metric string slice representation.
///
/// Implementing metrics know how to turn themselves into one of the supported
/// types of metrics as defined in the [Statsd spec](https://github.com/b/statsd_spec).
pub trait Metric {
    fn as_metric_str(&self) -> &str;
}

/// Counters are simple values incremented or decremented by a client.
///
/// See the `Counted` trait for more information.
#[derive(PartialEq, Eq, Debug, Hash, Clone)]
pub struct Counter {
    repr: String,
}

impl Counter {
    pub fn new(prefix: &str, key: &str, count: i64) -> Self {
        MetricFormatter::counter(prefix, key, MetricValue::Signed(count)).format()
    }
}

impl From<String> for Counter {
    fn from(s: String) -> Self {
        Counter { repr: s }
    }
}

impl Metric for Counter {
    fn as_metric_str(&self) -> &str {
        &self.repr
    }
}

/// Timers are a positive number of milliseconds between a start and end point.
///
/// See the `Timed` trait for more information.
#[derive(PartialEq, Eq, Debug, Hash, Clone)]
pub struct Timer {
    repr: String,
}

impl Timer {
    pub fn new(prefix: &str, key: &str, time: u64) -> Self {
        MetricFormatter::timer(prefix, key, MetricValue::Unsigned(time)).format()
    }
}

impl From<String> for Timer {
    fn from(s: String) -> Self {
        Timer { repr: s }
    }
}

impl Metric for Timer {
    fn as_metric_str(&self) -> &str {
        &self.repr
    }
}

/// Gauges are an instantaneous value determined by the client.
///
/// See the `Gauged` trait for more information.
#[derive(PartialEq, Eq, Debug, Hash, Clone)]
pub struct Gauge {
    repr: String,
}

impl Gauge {
    pub fn new(prefix: &str, key: &str, value: u64) -> Self {
        MetricFormatter::gauge(prefix, key, MetricValue::Unsigned(value)).format()
    }

    pub fn new_f64(prefix: &str, key: &str, value: f64) -> Self {
        MetricFormatter::gauge(prefix, key, MetricValue::Float(value)).format()
    }
}

impl From<String> for Gauge {
    fn from(s: String) -> Self {
        Gauge { repr: s }
    }
}

impl Metric for Gauge {
    fn as_metric_str(&self) -> &str {
        &self.repr
    }
}

/// Histograms are values whose distribution is calculated by the server.
///
/// See the `Histogrammed` trait for more information.
#[derive(PartialEq, Eq, Debug, Hash, Clone)]
pub struct Histogram {
    repr: String,
}

impl Histogram {
    pub fn new(prefix: &str, key: &str, value: u64) -> Self {
        MetricFormatter::histogram(prefix, key, MetricValue::Unsigned(value)).format()
    }

    pub fn new_f64(prefix: &str, key: &str, value: f64) -> Self {
        MetricFormatter::histogram(prefix, key, MetricValue::Float(value)).format()
    }
}

impl From<String> for Histogram {
    fn from(s: String) -> Self {
        Histogram { repr: s }
    }
}

impl Metric for Histogram {
    fn as_metric_str(&self) -> &str {
        &self.repr
    }
}

/// Potential categories an error from this library falls into.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ErrorKind {
    /// A value or configuration option was not valid.
    InvalidInput,
    /// An I/O error from the socket or the underlying system.
    IoError,
    /// The address of the Statsd server could not be looked up.
    Resolution,
    /// Fewer bytes were written to the socket than were buffered.
    PartialSend,
    /// A collaborator of the sender thread (resolver, transport) panicked.
    Panicked,
    /// The sender could not be shut down cleanly.
    Shutdown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::IoError => "i/o error",
            ErrorKind::Resolution => "address resolution error",
            ErrorKind::PartialSend => "partial send",
            ErrorKind::Panicked => "sender panicked",
            ErrorKind::Shutdown => "shutdown error",
        };
        s.fmt(f)
    }
}

/// Error generated by this library potentially wrapping another
/// type of error (exposed via the `Error` trait).
#[derive(Debug)]
pub struct MetricError {
    repr: ErrorRepr,
}

#[derive(Debug)]
enum ErrorRepr {
    WithDescription(ErrorKind, &'static str),
    WithDescriptionAndDetail(ErrorKind, &'static str, String),
    WithCause(ErrorKind, &'static str, io::Error),
    IoError(io::Error),
}

impl MetricError {
    /// Return the kind of the error
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::IoError(_) => ErrorKind::IoError,
            ErrorRepr::WithDescription(kind, _) => kind,
            ErrorRepr::WithDescriptionAndDetail(kind, _, _) => kind,
            ErrorRepr::WithCause(kind, _, _) => kind,
        }
    }

    /// Wrap an underlying I/O error with a different kind and a description,
    /// keeping the I/O error available as the source of this one.
    pub(crate) fn with_cause(kind: ErrorKind, desc: &'static str, cause: io::Error) -> Self {
        MetricError {
            repr: ErrorRepr::WithCause(kind, desc, cause),
        }
    }
}

impl fmt::Display for MetricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.repr {
            ErrorRepr::IoError(ref err) => err.fmt(f),
            ErrorRepr::WithDescription(_, desc) => desc.fmt(f),
            ErrorRepr::WithDescriptionAndDetail(_, desc, ref detail) => write!(f, "{}: {}", desc, detail),
            ErrorRepr::WithCause(_, desc, ref err) => write!(f, "{}: {}", desc, err),
        }
    }
}

impl error::Error for MetricError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.repr {
            ErrorRepr::IoError(ref err) => Some(err),
            ErrorRepr::WithCause(_, _, ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for MetricError {
    /// Convert an `io::Error` into a `MetricError`
    fn from(err: io::Error) -> Self {
        MetricError {
            repr: ErrorRepr::IoError(err),
        }
    }
}

impl From<(ErrorKind, &'static str)> for MetricError {
    /// Convert an error kind and description into a `MetricError`
    fn from((kind, desc): (ErrorKind, &'static str)) -> Self {
        MetricError {
            repr: ErrorRepr::WithDescription(kind, desc),
        }
    }
}

impl From<(ErrorKind, &'static str, String)> for MetricError {
    /// Convert an error kind, description, and details into a `MetricError`
    fn from((kind, desc, detail): (ErrorKind, &'static str, String)) -> Self {
        MetricError {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, desc, detail),
        }
    }
}

pub type MetricResult<T> = Result<T, MetricError>;

#[cfg(test)]
mod tests {
    use super::{Counter, ErrorKind, Gauge, Histogram, Metric, MetricError, Timer};
    use std::error::Error;
    use std::io;

    #[test]
    fn test_counter_to_metric_string() {
        let counter = Counter::new("my.app.", "test.counter", 4);
        assert_eq!("my.app.test.counter:4|c", counter.as_metric_str());
    }

    #[test]
    fn test_timer_to_metric_string() {
        let timer = Timer::new("my.app.", "test.timer", 34);
        assert_eq!("my.app.test.timer:34|ms", timer.as_metric_str());
    }

    #[test]
    fn test_gauge_to_metric_string() {
        let gauge = Gauge::new("my.app.", "test.gauge", 2);
        assert_eq!("my.app.test.gauge:2|g", gauge.as_metric_str());
    }

    #[test]
    fn test_gauge_f64_to_metric_string() {
        let gauge = Gauge::new_f64("my.app.", "test.gauge", 2.5);
        assert_eq!("my.app.test.gauge:2.5|g", gauge.as_metric_str());
    }

    #[test]
    fn test_histogram_to_metric_string() {
        let histogram = Histogram::new("my.app.", "test.histogram", 45);
        assert_eq!("my.app.test.histogram:45|h", histogram.as_metric_str());
    }

    #[test]
    fn test_metric_error_kind_io_error() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "Broken pipe");
        let our_err = MetricError::from(io_err);
        assert_eq!(ErrorKind::IoError, our_err.kind());
        assert!(our_err.source().is_some());
    }

    #[test]
    fn test_metric_error_kind_invalid_input() {
        let our_err = MetricError::from((ErrorKind::InvalidInput, "Nope"));
        assert_eq!(ErrorKind::InvalidInput, our_err.kind());
        assert_eq!("Nope", our_err.to_string());
    }

    #[test]
    fn test_metric_error_description_and_detail() {
        let our_err = MetricError::from((ErrorKind::PartialSend, "short write", "sent 3 of 9 bytes".to_string()));
        assert_eq!(ErrorKind::PartialSend, our_err.kind());
        assert_eq!("short write: sent 3 of 9 bytes", our_err.to_string());
        assert!(our_err.source().is_none());
    }

    #[test]
    fn test_metric_error_with_cause() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "no such host");
        let our_err = MetricError::with_cause(ErrorKind::Resolution, "failed to look up host", io_err);
        assert_eq!(ErrorKind::Resolution, our_err.kind());
        assert_eq!("failed to look up host: no such host", our_err.to_string());
        assert!(our_err.source().is_some());
    }
}
