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

const LINE_ENDING: u8 = b'\n';

/// Fixed capacity buffer that joins metric lines with a newline.
///
/// Separators are only written *between* lines: the contents of the buffer
/// never start or end with a newline. The buffer never grows beyond the
/// capacity it was created with, so its contents can always be sent as a
/// single datagram of at most that many bytes.
#[derive(Debug)]
pub struct SendBuffer {
    buf: Vec<u8>,
    capacity: usize,
}

impl SendBuffer {
    pub fn with_capacity(capacity: usize) -> SendBuffer {
        SendBuffer {
            buf: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Number of bytes that can still be written before the buffer is full.
    pub fn remaining(&self) -> usize {
        self.capacity - self.buf.len()
    }

    /// Can a line of `len` bytes plus a separator be appended without
    /// exceeding the capacity of the buffer?
    ///
    /// When this returns `false` the caller should send the current contents
    /// and clear the buffer before appending.
    pub fn has_room_for(&self, len: usize) -> bool {
        self.remaining() > len
    }

    /// Append a line to the buffer, preceded by a newline if the buffer
    /// already holds something.
    ///
    /// # Failures
    ///
    /// Returns an `InvalidInput` error, leaving the buffer untouched, if the
    /// line (plus separator) doesn't fit in the remaining space. For an empty
    /// buffer that only happens when the line is longer than the capacity.
    pub fn append(&mut self, line: &[u8]) -> MetricResult<()> {
        let sep = if self.buf.is_empty() { 0 } else { 1 };
        if line.len() + sep > self.remaining() {
            return Err(MetricError::from((
                ErrorKind::InvalidInput,
                "metric too large for send buffer",
                format!("{} bytes, {} of {} available", line.len(), self.remaining(), self.capacity),
            )));
        }

        if sep > 0 {
            self.buf.push(LINE_ENDING);
        }

        self.buf.extend_from_slice(line);
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::SendBuffer;
    use crate::types::ErrorKind;

    #[test]
    fn test_send_buffer_joins_lines() {
        let mut buf = SendBuffer::with_capacity(64);
        buf.append(b"foo:1234|c").unwrap();
        buf.append(b"baz:56789|c").unwrap();

        assert_eq!(b"foo:1234|c\nbaz:56789|c", buf.as_bytes());
        assert_eq!(22, buf.len());
        assert_eq!(42, buf.remaining());
    }

    #[test]
    fn test_send_buffer_first_line_has_no_separator() {
        let mut buf = SendBuffer::with_capacity(16);
        buf.append(b"abc:3|g").unwrap();

        assert_eq!(b"abc:3|g", buf.as_bytes());
    }

    #[test]
    fn test_send_buffer_has_room_for() {
        let mut buf = SendBuffer::with_capacity(16);
        assert!(buf.has_room_for(10));
        buf.append(b"foo:1234|c").unwrap();

        // 6 remaining: a 5 byte line needs 6 with the separator
        assert!(buf.has_room_for(5));
        assert!(!buf.has_room_for(6));
    }

    #[test]
    fn test_send_buffer_exact_fill() {
        let mut buf = SendBuffer::with_capacity(10);
        buf.append(b"abcd").unwrap();
        buf.append(b"efghi").unwrap();

        assert_eq!(0, buf.remaining());
        assert_eq!(b"abcd\nefghi", buf.as_bytes());
    }

    #[test]
    fn test_send_buffer_line_at_capacity_into_empty() {
        let mut buf = SendBuffer::with_capacity(8);
        buf.append(b"12345678").unwrap();
        assert_eq!(8, buf.len());
    }

    #[test]
    fn test_send_buffer_too_large() {
        let mut buf = SendBuffer::with_capacity(8);
        let err = buf.append(b"123456789").unwrap_err();

        assert_eq!(ErrorKind::InvalidInput, err.kind());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_send_buffer_no_room_leaves_contents() {
        let mut buf = SendBuffer::with_capacity(8);
        buf.append(b"1234").unwrap();

        assert!(buf.append(b"5678").is_err());
        assert_eq!(b"1234", buf.as_bytes());
    }

    #[test]
    fn test_send_buffer_clear() {
        let mut buf = SendBuffer::with_capacity(8);
        buf.append(b"1234").unwrap();
        buf.clear();

        assert!(buf.is_empty());
        assert_eq!(8, buf.remaining());
        assert_eq!(8, buf.capacity());
    }
}
