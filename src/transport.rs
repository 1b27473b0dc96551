// Lilt - A non-blocking Statsd client for Rust!
//
// Copyright 2026 The Lilt Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::{Arc, PoisonError, RwLock};

/// Connectionless datagram socket used by the sender thread.
///
/// `.send_to()` is only ever called from the sender thread while `.close()`
/// is called from whichever thread stops the sink. Implementations must make
/// a close that races with a send safe: the send may fail, but must not
/// touch a closed socket.
pub trait Transport {
    /// Send `buf` as a single datagram to `addr`, returning the number of
    /// bytes written.
    fn send_to(&self, buf: &[u8], addr: SocketAddr) -> io::Result<usize>;

    /// Release the underlying socket. Sends after this fail.
    fn close(&self) -> io::Result<()> {
        Ok(())
    }
}

impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    fn send_to(&self, buf: &[u8], addr: SocketAddr) -> io::Result<usize> {
        self.as_ref().send_to(buf, addr)
    }

    fn close(&self) -> io::Result<()> {
        self.as_ref().close()
    }
}

/// `Transport` backed by a non-blocking `UdpSocket`.
#[derive(Debug)]
pub struct UdpTransport {
    socket: RwLock<Option<UdpSocket>>,
}

impl UdpTransport {
    /// Bind a new non-blocking socket to the given local address.
    ///
    /// `"0.0.0.0:0"` lets the OS pick an interface and port.
    pub fn bind<A>(addr: A) -> io::Result<UdpTransport>
    where
        A: ToSocketAddrs,
    {
        let socket = UdpSocket::bind(addr)?;
        Self::from_socket(socket)
    }

    /// Use an existing socket, switching it to non-blocking mode.
    pub fn from_socket(socket: UdpSocket) -> io::Result<UdpTransport> {
        socket.set_nonblocking(true)?;
        Ok(UdpTransport {
            socket: RwLock::new(Some(socket)),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        let guard = self.socket.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(s) => s.local_addr(),
            None => Err(closed()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.socket.read().unwrap_or_else(PoisonError::into_inner).is_none()
    }
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "socket closed")
}

impl Transport for UdpTransport {
    fn send_to(&self, buf: &[u8], addr: SocketAddr) -> io::Result<usize> {
        let guard = self.socket.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(s) => s.send_to(buf, addr),
            None => Err(closed()),
        }
    }

    fn close(&self) -> io::Result<()> {
        // Dropping the socket closes it. Closing twice is a no-op.
        let mut guard = self.socket.write().unwrap_or_else(PoisonError::into_inner);
        guard.take();
        Ok(())
    }
}
