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
use std::net::{SocketAddr, ToSocketAddrs};

/// Strategy for finding the address of the Statsd server to send to.
///
/// The sender thread calls `.resolve()` once for every payload it takes off
/// the queue, so implementations decide whether that means a DNS lookup each
/// time (`VolatileResolver`) or a cached answer (`StaticResolver`).
///
/// Any `Fn() -> MetricResult<SocketAddr>` closure is also a resolver.
pub trait AddressResolver {
    fn resolve(&self) -> MetricResult<SocketAddr>;
}

impl<F> AddressResolver for F
where
    F: Fn() -> MetricResult<SocketAddr>,
{
    fn resolve(&self) -> MetricResult<SocketAddr> {
        (self)()
    }
}

/// Attempt to convert anything implementing the `ToSocketAddrs` trait
/// into a concrete `SocketAddr` instance, returning a `Resolution`
/// error if the lookup failed or yielded no addresses.
pub(crate) fn get_addr<A>(addr: &A) -> MetricResult<SocketAddr>
where
    A: ToSocketAddrs + ?Sized,
{
    let mut addrs = addr
        .to_socket_addrs()
        .map_err(|e| MetricError::with_cause(ErrorKind::Resolution, "Failed to look up Statsd host", e))?;

    match addrs.next() {
        Some(addr) => Ok(addr),
        None => Err(MetricError::from((ErrorKind::Resolution, "No socket addresses yielded"))),
    }
}

/// Resolver that looks up the address of the Statsd server every time it is
/// asked for it.
///
/// Useful when the server may move, for example when it's behind a DNS entry
/// that changes. Since the sender asks for the address once per payload, this
/// results in a lookup per payload, which is only cheap when the system caches
/// DNS responses.
///
/// # Example
///
/// ```
/// use lilt::{AddressResolver, VolatileResolver};
///
/// let resolver = VolatileResolver::new(("127.0.0.1", 8125));
/// assert_eq!(8125, resolver.resolve().unwrap().port());
/// ```
#[derive(Debug, Clone)]
pub struct VolatileResolver<A> {
    target: A,
}

impl<A> VolatileResolver<A>
where
    A: ToSocketAddrs,
{
    pub fn new(target: A) -> Self {
        VolatileResolver { target }
    }
}

impl<A> AddressResolver for VolatileResolver<A>
where
    A: ToSocketAddrs,
{
    fn resolve(&self) -> MetricResult<SocketAddr> {
        get_addr(&self.target)
    }
}

/// Resolver that looks up the address of the Statsd server once, when it is
/// created, and returns that same address forever after.
///
/// Resolving with a `StaticResolver` never performs I/O and never fails.
///
/// # Example
///
/// ```
/// use lilt::{AddressResolver, StaticResolver};
///
/// let resolver = StaticResolver::new(("127.0.0.1", 8125)).unwrap();
/// assert_eq!(8125, resolver.resolve().unwrap().port());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticResolver {
    addr: SocketAddr,
}

impl StaticResolver {
    /// Look up `target` now and cache the first address it yields.
    ///
    /// # Failures
    ///
    /// This method may fail if:
    ///
    /// * It is unable to resolve the hostname of the metric server.
    /// * The host address is otherwise unable to be parsed
    pub fn new<A>(target: A) -> MetricResult<StaticResolver>
    where
        A: ToSocketAddrs,
    {
        let addr = get_addr(&target)?;
        Ok(StaticResolver { addr })
    }

    /// Ask another resolver for an address once and cache the answer.
    pub fn cache<R>(resolver: &R) -> MetricResult<StaticResolver>
    where
        R: AddressResolver + ?Sized,
    {
        let addr = resolver.resolve()?;
        Ok(StaticResolver { addr })
    }

    /// The cached address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl From<SocketAddr> for StaticResolver {
    fn from(addr: SocketAddr) -> Self {
        StaticResolver { addr }
    }
}

impl AddressResolver for StaticResolver {
    fn resolve(&self) -> MetricResult<SocketAddr> {
        Ok(self.addr)
    }
}
