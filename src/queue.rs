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
use crate::types::{ErrorKind, MetricError, MetricResult};
use crossbeam_channel::{self, Receiver, RecvTimeoutError, Sender, TrySendError};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// Counters for payloads moving through a `MessageQueue`.
#[derive(Debug, Default)]
struct QueueStats {
    submitted: AtomicU64,
    dropped: AtomicU64,
    drained: AtomicU64,
}

impl QueueStats {
    fn incr_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Release);
    }

    fn incr_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Release);
    }

    fn incr_drained(&self, n: u64) {
        self.drained.fetch_add(n, Ordering::Release);
    }

    fn queued(&self) -> u64 {
        let submitted = self.submitted.load(Ordering::Acquire);
        let drained = self.drained.load(Ordering::Acquire);
        submitted.saturating_sub(drained)
    }
}

/// Bounded, multi-producer FIFO of payloads waiting to be sent.
///
/// Producers call `.offer()`, which never blocks: when the queue is full (or
/// has been closed) the payload is dropped and `false` is returned. The single
/// consumer calls `.poll()` which waits a bounded amount of time for the next
/// payload.
pub struct MessageQueue {
    sender: Sender<Payload>,
    receiver: Receiver<Payload>,
    capacity: usize,
    closed: AtomicBool,
    stats: QueueStats,
}

impl MessageQueue {
    /// Create a queue holding at most `capacity` payloads.
    ///
    /// # Failures
    ///
    /// Returns an `InvalidInput` error if `capacity` is zero.
    pub fn new(capacity: usize) -> MetricResult<MessageQueue> {
        if capacity == 0 {
            return Err(MetricError::from((
                ErrorKind::InvalidInput,
                "queue capacity must be at least 1",
            )));
        }

        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        Ok(MessageQueue {
            sender,
            receiver,
            capacity,
            closed: AtomicBool::new(false),
            stats: QueueStats::default(),
        })
    }

    /// Try to add a payload to the back of the queue without blocking.
    pub fn offer(&self, payload: Payload) -> bool {
        if self.is_closed() {
            self.stats.incr_dropped();
            return false;
        }

        match self.sender.try_send(payload) {
            Ok(()) => {
                self.stats.incr_submitted();
                true
            }
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.stats.incr_dropped();
                false
            }
        }
    }

    /// Take the payload at the front of the queue, waiting at most `timeout`
    /// for one to arrive.
    pub fn poll(&self, timeout: Duration) -> Option<Payload> {
        match self.receiver.recv_timeout(timeout) {
            Ok(p) => {
                self.stats.incr_drained(1);
                Some(p)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reject every payload offered from now on. Payloads already queued
    /// stay queued.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Discard everything currently queued, returning how many payloads
    /// were discarded.
    pub fn clear(&self) -> usize {
        let discarded = self.receiver.try_iter().count();
        self.stats.incr_drained(discarded as u64);
        discarded
    }

    /// Number of payloads accepted by `.offer()`.
    pub fn submitted(&self) -> u64 {
        self.stats.submitted.load(Ordering::Acquire)
    }

    /// Number of payloads rejected by `.offer()` because the queue was full
    /// or closed.
    pub fn dropped(&self) -> u64 {
        self.stats.dropped.load(Ordering::Acquire)
    }

    /// Number of payloads removed from the queue, by `.poll()` or `.clear()`.
    pub fn drained(&self) -> u64 {
        self.stats.drained.load(Ordering::Acquire)
    }

    /// Approximate number of payloads in the queue (submitted - drained).
    pub fn queued(&self) -> u64 {
        self.stats.queued()
    }
}

impl fmt::Debug for MessageQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageQueue")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::MessageQueue;
    use crate::payload::Payload;
    use crate::types::ErrorKind;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn test_message_queue_zero_capacity() {
        let res = MessageQueue::new(0);
        assert_eq!(ErrorKind::InvalidInput, res.unwrap_err().kind());
    }

    #[test]
    fn test_message_queue_fifo() {
        let queue = MessageQueue::new(8).unwrap();
        assert!(queue.offer(Payload::from("a:1|c")));
        assert!(queue.offer(Payload::from("b:2|c")));
        assert!(queue.offer(Payload::from("c:3|c")));

        let timeout = Duration::from_millis(10);
        assert_eq!(Some(Payload::from("a:1|c")), queue.poll(timeout));
        assert_eq!(Some(Payload::from("b:2|c")), queue.poll(timeout));
        assert_eq!(Some(Payload::from("c:3|c")), queue.poll(timeout));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_message_queue_offer_full_does_not_block() {
        let queue = MessageQueue::new(2).unwrap();
        assert!(queue.offer(Payload::from("a:1|c")));
        assert!(queue.offer(Payload::from("b:1|c")));

        let start = Instant::now();
        assert!(!queue.offer(Payload::from("c:1|c")));
        assert!(start.elapsed() < Duration::from_secs(1));

        assert_eq!(2, queue.submitted());
        assert_eq!(1, queue.dropped());
        assert_eq!(2, queue.len());
        assert_eq!(2, queue.capacity());
    }

    #[test]
    fn test_message_queue_poll_timeout() {
        let queue = MessageQueue::new(1).unwrap();
        let start = Instant::now();

        assert_eq!(None, queue.poll(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_message_queue_poll_wakes_on_offer() {
        let queue = Arc::new(MessageQueue::new(4).unwrap());
        let producer = queue.clone();

        let t = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            producer.offer(Payload::from("late:1|c"))
        });

        assert_eq!(Some(Payload::from("late:1|c")), queue.poll(Duration::from_secs(5)));
        assert!(t.join().unwrap());
    }

    #[test]
    fn test_message_queue_closed_rejects() {
        let queue = MessageQueue::new(4).unwrap();
        assert!(queue.offer(Payload::from("before:1|c")));
        queue.close();

        assert!(queue.is_closed());
        assert!(!queue.offer(Payload::from("after:1|c")));
        assert_eq!(1, queue.len());
        assert_eq!(1, queue.dropped());
    }

    #[test]
    fn test_message_queue_clear() {
        let queue = MessageQueue::new(4).unwrap();
        queue.offer(Payload::from("a:1|c"));
        queue.offer(Payload::from("b:1|c"));
        queue.offer(Payload::from("c:1|c"));
        queue.poll(Duration::from_millis(1));

        assert_eq!(2, queue.queued());
        assert_eq!(2, queue.clear());
        assert_eq!(0, queue.queued());
        assert_eq!(3, queue.drained());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_message_queue_concurrent_producers() {
        let queue = Arc::new(MessageQueue::new(1000).unwrap());
        let threads: Vec<_> = (0..4)
            .map(|_| {
                let q = queue.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        q.offer(Payload::from("x:1|c"));
                    }
                })
            })
            .collect();

        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(400, queue.len());
        assert_eq!(400, queue.submitted());
        assert_eq!(0, queue.dropped());
    }
}
