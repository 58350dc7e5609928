//! Connections
//!
//! Dialing, liveness probing, and the guard that hands pooled streams back.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};

use bytes::BytesMut;

use crate::config::Timeouts;
use crate::error::{FdfsError, Result};
use crate::protocol::{Command, Exchange, Request};
use super::ConnectionPool;

/// Open a TCP connection to `host:port` and apply the configured timeouts.
///
/// Every address the host resolves to is tried in turn, each bounded by the
/// dial timeout.
pub fn dial(host: &str, port: u16, timeouts: &Timeouts) -> Result<TcpStream> {
    let mut last_error = None;

    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeouts.dial) {
            Ok(stream) => {
                // Disable Nagle's algorithm for low latency
                stream.set_nodelay(true)?;
                stream.set_read_timeout(timeouts.read)?;
                stream.set_write_timeout(timeouts.write)?;
                tracing::debug!("Connected to {}", addr);
                return Ok(stream);
            }
            Err(e) => {
                tracing::debug!("Dial to {} failed: {}", addr, e);
                last_error = Some(e);
            }
        }
    }

    Err(FdfsError::Transport(last_error.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("{}:{} did not resolve to any address", host, port),
        )
    })))
}

/// Round trip a zero-length active test and expect an empty success response.
pub fn active_test<S: Read + Write + ?Sized>(stream: &mut S) -> Result<()> {
    let mut exchange = Exchange::new(stream);
    exchange.send(&Request::new(Command::ActiveTest, BytesMut::new()))?;

    let header = exchange.recv_header()?;
    if header.body_len != 0 {
        return Err(FdfsError::Framing(format!(
            "active test answered with a {} byte body",
            header.body_len
        )));
    }
    exchange.recv_body(&header)?;
    Ok(())
}

/// A tracker connection borrowed from a [`ConnectionPool`].
///
/// Dropping the guard returns the stream to the pool when there is room and the
/// pool is still open; otherwise the stream is closed.
pub struct PooledConnection<'a> {
    pool: &'a ConnectionPool,

    /// Taken on drop or discard
    stream: Option<TcpStream>,

    /// Peer address for logging
    peer_addr: String,
}

impl<'a> PooledConnection<'a> {
    pub(super) fn new(pool: &'a ConnectionPool, stream: TcpStream) -> Self {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        Self {
            pool,
            stream: Some(stream),
            peer_addr,
        }
    }

    /// Close the underlying stream instead of returning it. Used when the
    /// stream may hold unread bytes or is known to be broken.
    pub fn discard(mut self) {
        if let Some(stream) = self.stream.take() {
            tracing::debug!("Discarding tracker connection to {}", self.peer_addr);
            self.pool.release(stream);
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    fn stream(&mut self) -> io::Result<&mut TcpStream> {
        self.stream
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "connection already released"))
    }
}

impl Read for PooledConnection<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream()?.read(buf)
    }
}

impl Write for PooledConnection<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream()?.flush()
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(stream) = self.stream.take() {
            self.pool.put(stream);
        }
    }
}

/// Shut a stream down, ignoring errors from an already dead peer
pub(super) fn shutdown(stream: TcpStream) {
    let _ = stream.shutdown(Shutdown::Both);
}
