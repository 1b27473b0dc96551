// Lilt - A non-blocking Statsd client for Rust!
//
// Copyright 2026 The Lilt Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::types::MetricError;
use log::Level;
use std::panic::{self, AssertUnwindSafe};

/// Receiver of errors that happen in the background, away from the caller.
///
/// Sending metrics never returns an error to the code recording them. Any
/// failure to resolve the Statsd server, write to the socket, or shut the
/// sender down cleanly is handed to an `ErrorHandler` instead. Handlers are
/// called from the sender thread (and from the thread calling `.stop()`) so
/// they must be `Send + Sync`. A handler that panics is contained and does
/// not stop the sender.
///
/// Any `Fn(MetricError)` closure can be used as a handler.
///
/// # Example
///
/// ```
/// use lilt::{ErrorHandler, MetricError};
///
/// fn my_handler(err: MetricError) {
///     eprintln!("Error sending metrics: {}", err);
/// }
///
/// my_handler.handle(MetricError::from((lilt::ErrorKind::IoError, "boom")));
/// ```
pub trait ErrorHandler {
    fn handle(&self, err: MetricError);
}

impl<F> ErrorHandler for F
where
    F: Fn(MetricError),
{
    fn handle(&self, err: MetricError) {
        (self)(err)
    }
}

/// Error handler that discards every error. This is the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopErrorHandler;

impl ErrorHandler for NopErrorHandler {
    fn handle(&self, _err: MetricError) {}
}

/// Error handler that writes every error to the `log` facade.
///
/// Errors are logged at `Warn` by default. Nothing is written unless the
/// application has installed a logger.
#[derive(Debug, Clone, Copy)]
pub struct LoggingErrorHandler {
    level: Level,
}

impl LoggingErrorHandler {
    pub fn new() -> Self {
        Self::with_level(Level::Warn)
    }

    pub fn with_level(level: Level) -> Self {
        LoggingErrorHandler { level }
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl Default for LoggingErrorHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorHandler for LoggingErrorHandler {
    fn handle(&self, err: MetricError) {
        log::log!(self.level, "lilt: error sending metrics ({}): {}", err.kind(), err);
    }
}

/// Hand an error to `handler`, containing any panic it raises.
pub(crate) fn dispatch<H>(handler: &H, err: MetricError)
where
    H: ErrorHandler + ?Sized,
{
    if panic::catch_unwind(AssertUnwindSafe(|| handler.handle(err))).is_err() {
        warn!("lilt: error handler panicked");
    }
}
