// Lilt - A non-blocking Statsd client for Rust!
//
// Copyright 2026 The Lilt Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::tags;
use std::fmt::{self, Write};

/// Type of metric that knows how to display itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetricType {
    Counter,
    Timer,
    Gauge,
    Histogram,
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MetricType::Counter => "c".fmt(f),
            MetricType::Timer => "ms".fmt(f),
            MetricType::Gauge => "g".fmt(f),
            MetricType::Histogram => "h".fmt(f),
        }
    }
}

/// Holder for primitive metric values that knows how to display itself
///
/// This is what the various `To*Value` conversions produce. Typical use of
/// Lilt shouldn't require interacting with this type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MetricValue::Signed(v) => v.fmt(f),
            MetricValue::Unsigned(v) => v.fmt(f),
            MetricValue::Float(v) => v.fmt(f),
        }
    }
}

/// Renders a single metric line: `{prefix}{key}:{value}|{type}{tags}`.
///
/// The prefix is expected to already end with a `.` (or be empty). Tags are
/// rendered with `tag_string` semantics, on top of an optional pre-rendered
/// suffix of constant tags.
#[derive(Debug, Clone)]
pub(crate) struct MetricFormatter<'a> {
    prefix: &'a str,
    key: &'a str,
    val: MetricValue,
    type_: MetricType,
    tags: &'a [&'a str],
    constant_tags: Option<&'a str>,
}

impl<'a> MetricFormatter<'a> {
    pub(crate) fn counter(prefix: &'a str, key: &'a str, val: MetricValue) -> Self {
        Self::from_val(prefix, key, val, MetricType::Counter)
    }

    pub(crate) fn timer(prefix: &'a str, key: &'a str, val: MetricValue) -> Self {
        Self::from_val(prefix, key, val, MetricType::Timer)
    }

    pub(crate) fn gauge(prefix: &'a str, key: &'a str, val: MetricValue) -> Self {
        Self::from_val(prefix, key, val, MetricType::Gauge)
    }

    pub(crate) fn histogram(prefix: &'a str, key: &'a str, val: MetricValue) -> Self {
        Self::from_val(prefix, key, val, MetricType::Histogram)
    }

    fn from_val(prefix: &'a str, key: &'a str, val: MetricValue, type_: MetricType) -> Self {
        MetricFormatter {
            prefix,
            key,
            val,
            type_,
            tags: &[],
            constant_tags: None,
        }
    }

    pub(crate) fn with_tags(mut self, tags: &'a [&'a str], constant_tags: Option<&'a str>) -> Self {
        self.tags = tags;
        self.constant_tags = constant_tags;
        self
    }

    #[rustfmt::skip]
    fn size_hint(&self) -> usize {
        let base = self.prefix.len() + self.key.len() + 1 /* : */ + 10 /* value */ + 1 /* | */ + 2 /* type */;
        if self.tags.is_empty() && self.constant_tags.is_none() {
            base
        } else {
            base + tags::size_hint(self.tags, self.constant_tags)
        }
    }

    pub(crate) fn format<M>(&self) -> M
    where
        M: From<String>,
    {
        let mut out = String::with_capacity(self.size_hint());
        let _ = write!(out, "{}{}:{}|{}", self.prefix, self.key, self.val, self.type_);
        tags::write_tag_string(&mut out, self.tags, self.constant_tags);
        M::from(out)
    }
}

#[cfg(test)]
mod tests {
    use super::{MetricFormatter, MetricValue};

    #[test]
    fn test_metric_formatter_counter_no_tags() {
        let fmt = MetricFormatter::counter("prefix.", "some.key", MetricValue::Signed(4));
        assert_eq!("prefix.some.key:4|c", fmt.format::<String>());
    }

    #[test]
    fn test_metric_formatter_counter_with_tags() {
        let tags = ["host:app03.example.com", "bucket:2"];
        let fmt = MetricFormatter::counter("prefix.", "some.key", MetricValue::Signed(4)).with_tags(&tags, None);

        assert_eq!(
            "prefix.some.key:4|c|#bucket:2,host:app03.example.com",
            fmt.format::<String>()
        );
    }

    #[test]
    fn test_metric_formatter_timer_no_tags() {
        let fmt = MetricFormatter::timer("prefix.", "some.method", MetricValue::Unsigned(21));
        assert_eq!("prefix.some.method:21|ms", fmt.format::<String>());
    }

    #[test]
    fn test_metric_formatter_gauge_with_constant_tags() {
        let fmt = MetricFormatter::gauge("prefix.", "num.failures", MetricValue::Unsigned(7))
            .with_tags(&[], Some("|#env:prod"));
        assert_eq!("prefix.num.failures:7|g|#env:prod", fmt.format::<String>());
    }

    #[test]
    fn test_metric_formatter_gauge_with_tags_and_constant_tags() {
        let tags = ["window:left", "floor:2"];
        let fmt = MetricFormatter::gauge("", "room.temp", MetricValue::Float(21.5))
            .with_tags(&tags, Some("|#env:prod"));
        assert_eq!("room.temp:21.5|g|#env:prod,floor:2,window:left", fmt.format::<String>());
    }

    #[test]
    fn test_metric_formatter_histogram_no_tags() {
        let fmt = MetricFormatter::histogram("prefix.", "some.histo", MetricValue::Unsigned(150));
        assert_eq!("prefix.some.histo:150|h", fmt.format::<String>());
    }

    #[test]
    fn test_metric_formatter_negative_counter() {
        let fmt = MetricFormatter::counter("", "some.key", MetricValue::Signed(-3));
        assert_eq!("some.key:-3|c", fmt.format::<String>());
    }
}
