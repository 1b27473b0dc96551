// Lilt - A non-blocking Statsd client for Rust!
//
// Copyright 2026 The Lilt Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::types::{ErrorKind, MetricError, MetricResult};
use bytes::Bytes;
use std::fmt;

/// A single encoded metric line, ready to be queued and sent.
///
/// A payload is an immutable view over a shared byte buffer: creating a
/// window into a larger buffer or cloning a payload never copies the
/// underlying bytes. The line should not include a trailing newline, the
/// sender adds separators between lines itself.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Payload {
    bytes: Bytes,
}

impl Payload {
    /// Create a payload covering `len` bytes of `buf` starting at `start`.
    ///
    /// # Failures
    ///
    /// Returns an `InvalidInput` error if the window doesn't fit in `buf`.
    ///
    /// # Example
    ///
    /// ```
    /// use bytes::Bytes;
    /// use lilt::Payload;
    ///
    /// let buf = Bytes::from_static(b"a:1|c\nb:2|c");
    /// let second = Payload::window(buf, 6, 5).unwrap();
    /// assert_eq!(b"b:2|c", second.as_bytes());
    /// ```
    pub fn window(buf: Bytes, start: usize, len: usize) -> MetricResult<Payload> {
        match start.checked_add(len) {
            Some(end) if end <= buf.len() => Ok(Payload {
                bytes: buf.slice(start..end),
            }),
            _ => Err(MetricError::from((
                ErrorKind::InvalidInput,
                "payload window out of bounds",
                format!("start {} + len {} > buffer of {} bytes", start, len, buf.len()),
            ))),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for Payload {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Payload { bytes }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(v: Vec<u8>) -> Self {
        Payload { bytes: Bytes::from(v) }
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload { bytes: Bytes::from(s) }
    }
}

impl From<&'static str> for Payload {
    fn from(s: &'static str) -> Self {
        Payload {
            bytes: Bytes::from_static(s.as_bytes()),
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload({:?})", String::from_utf8_lossy(&self.bytes))
    }
}
