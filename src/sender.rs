// Lilt - A non-blocking Statsd client for Rust!
//
// Copyright 2026 The Lilt Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The background half of the queuing sink: a single thread that drains the
//! queue, batches payloads into datagrams and sends them.

use crate::handler::{self, ErrorHandler};
use crate::io::SendBuffer;
use crate::queue::MessageQueue;
use crate::resolve::AddressResolver;
use crate::sinks::core::SocketStats;
use crate::transport::Transport;
use crate::types::{ErrorKind, MetricError, MetricResult};
use crate::{DEFAULT_PACKET_SIZE, DEFAULT_POLL_INTERVAL};
use crossbeam_channel::{self, Receiver, RecvTimeoutError};
use std::fmt;
use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe, RefUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub(crate) const SENDER_THREAD_NAME: &str = "lilt-sender";

pub(crate) type SharedResolver = Arc<dyn AddressResolver + Send + Sync + RefUnwindSafe>;
pub(crate) type SharedTransport = Arc<dyn Transport + Send + Sync + RefUnwindSafe>;
pub(crate) type SharedHandler = Arc<dyn ErrorHandler + Send + Sync + RefUnwindSafe>;

/// Consumer of a `MessageQueue` that packs payloads into datagrams.
///
/// Payloads are joined with newlines in a `SendBuffer` owned exclusively by
/// this sender. The buffer is sent as one datagram when the next payload
/// would not fit, or as soon as the queue has nothing else waiting, so a
/// lone metric goes out without waiting for more to arrive.
///
/// Nothing that happens while sending is returned to the caller. Errors and
/// panics from the resolver or transport are handed to the error handler
/// and the loop carries on with the next payload.
pub(crate) struct BatchingSender {
    queue: Arc<MessageQueue>,
    resolver: SharedResolver,
    transport: SharedTransport,
    errors: SharedHandler,
    buffer: SendBuffer,
    poll_interval: Duration,
    running: Arc<AtomicBool>,
    stats: SocketStats,
    panics: Arc<AtomicU64>,
}

impl BatchingSender {
    pub(crate) fn new(
        queue: Arc<MessageQueue>,
        resolver: SharedResolver,
        transport: SharedTransport,
        errors: SharedHandler,
    ) -> Self {
        BatchingSender {
            queue,
            resolver,
            transport,
            errors,
            buffer: SendBuffer::with_capacity(DEFAULT_PACKET_SIZE),
            poll_interval: DEFAULT_POLL_INTERVAL,
            running: Arc::new(AtomicBool::new(true)),
            stats: SocketStats::default(),
            panics: Arc::new(AtomicU64::new(0)),
        }
    }

    pub(crate) fn buffer_size(mut self, size: usize) -> Self {
        self.buffer = SendBuffer::with_capacity(size);
        self
    }

    pub(crate) fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub(crate) fn stats(&self) -> SocketStats {
        self.stats.clone()
    }

    pub(crate) fn panic_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.panics)
    }

    /// Run until the running flag is cleared, then flush what's buffered and
    /// discard whatever is still queued.
    pub(crate) fn run(mut self) {
        debug!("lilt: sender started, buffer {} bytes", self.buffer.capacity());

        while self.running.load(Ordering::Acquire) {
            match panic::catch_unwind(AssertUnwindSafe(|| self.run_once())) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => self.report(e),
                Err(_) => self.recover_from_panic(),
            }
        }

        self.shutdown();
        debug!("lilt: sender stopped");
    }

    /// Wait for one payload and add it to the current batch, sending the
    /// batch when it's full or when nothing else is queued.
    pub(crate) fn run_once(&mut self) -> MetricResult<()> {
        let payload = match self.queue.poll(self.poll_interval) {
            Some(p) => p,
            None => return Ok(()),
        };

        let addr = self.resolver.resolve()?;
        if !self.buffer.has_room_for(payload.len()) {
            self.flush(addr)?;
        }

        self.buffer.append(payload.as_bytes())?;

        if self.queue.is_empty() {
            self.flush(addr)?;
        }

        Ok(())
    }

    /// Send the buffer as a single datagram and clear it, whatever the
    /// outcome. Sending fewer bytes than buffered is reported but isn't a
    /// failure of the iteration.
    fn flush(&mut self, addr: SocketAddr) -> MetricResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let len = self.buffer.len();
        let res = self.transport.send_to(self.buffer.as_bytes(), addr);
        self.buffer.clear();

        let written = self.stats.update(res, len)?;
        trace!("lilt: sent {} byte datagram to {}", written, addr);

        if written < len {
            self.report(MetricError::from((
                ErrorKind::PartialSend,
                "datagram only partially sent",
                format!("sent {} of {} bytes to {}", written, len, addr),
            )));
        }

        Ok(())
    }

    fn shutdown(&mut self) {
        if !self.buffer.is_empty() {
            let res = panic::catch_unwind(AssertUnwindSafe(|| {
                let addr = self.resolver.resolve()?;
                self.flush(addr)
            }));

            match res {
                Ok(Ok(())) => {}
                Ok(Err(e)) => self.report(e),
                Err(_) => self.recover_from_panic(),
            }
        }

        let discarded = self.queue.clear();
        if discarded > 0 {
            debug!("lilt: discarded {} queued metrics on stop", discarded);
        }
    }

    fn recover_from_panic(&mut self) {
        self.panics.fetch_add(1, Ordering::Release);
        self.buffer.clear();
        self.report(MetricError::from((
            ErrorKind::Panicked,
            "panic while sending metrics, buffered metrics dropped",
        )));
    }

    fn report(&self, err: MetricError) {
        handler::dispatch(self.errors.as_ref(), err);
    }
}

impl fmt::Debug for BatchingSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchingSender")
            .field("queue", &self.queue)
            .field("buffer", &self.buffer)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

/// Handle to a `BatchingSender` running in its own thread.
#[derive(Debug)]
pub(crate) struct WorkerHandle {
    running: Arc<AtomicBool>,
    done: Receiver<()>,
    thread: JoinHandle<()>,
}

impl WorkerHandle {
    /// Start the sender in a new thread named `lilt-sender`.
    pub(crate) fn spawn(sender: BatchingSender) -> MetricResult<WorkerHandle> {
        let running = Arc::clone(&sender.running);
        // Never sent on: the worker drops its half when it exits, which
        // disconnects the channel and wakes up anyone waiting in `.stop()`.
        let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(0);

        let thread = thread::Builder::new()
            .name(SENDER_THREAD_NAME.to_string())
            .spawn(move || {
                let _done = done_tx;
                sender.run();
            })
            .map_err(|e| MetricError::with_cause(ErrorKind::IoError, "failed to start sender thread", e))?;

        Ok(WorkerHandle {
            running,
            done: done_rx,
            thread,
        })
    }

    /// Ask the worker to stop without waiting for it.
    pub(crate) fn signal(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Ask the worker to stop and wait up to `timeout` for it to finish.
    ///
    /// If the worker doesn't finish in time it's left to exit on its own.
    pub(crate) fn stop(self, timeout: Duration) -> MetricResult<()> {
        self.signal();

        match self.done.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => self
                .thread
                .join()
                .map_err(|_| MetricError::from((ErrorKind::Shutdown, "sender thread panicked"))),
            Err(RecvTimeoutError::Timeout) => Err(MetricError::from((
                ErrorKind::Shutdown,
                "timed out waiting for sender to stop",
                format!("waited {:?}", timeout),
            ))),
        }
    }
}
