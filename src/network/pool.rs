//! Tracker Connection Pool
//!
//! A bounded set of reusable connections to one tracker cluster.
//!
//! ## Concurrency Model
//!
//! - Idle streams live in a lock-free `ArrayQueue` sized to `max_connections`
//! - `get`/`put` hold the `RwLock` for reading only; `close` takes it for
//!   writing to detach the queue, so no stream can slip back in afterwards
//! - `open` counts every live stream (idle + lent) and is reserved with a
//!   compare-and-swap before dialing, so it never exceeds `max_connections`
//! - Nothing blocks waiting for a free slot: a full pool fails immediately

use std::net::TcpStream;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam::queue::ArrayQueue;
use parking_lot::RwLock;
use rand::Rng;

use crate::config::{Config, Timeouts};
use crate::error::{FdfsError, Result};
use super::connection::{active_test, dial, shutdown, PooledConnection};

/// Pool of tracker connections
pub struct ConnectionPool {
    hosts: Vec<String>,
    port: u16,
    max_connections: usize,
    timeouts: Timeouts,

    /// Idle streams; `None` once the pool is closed
    idle: RwLock<Option<ArrayQueue<TcpStream>>>,

    /// Live streams, idle or lent out
    open: AtomicUsize,
}

impl ConnectionPool {
    /// Build a pool and eagerly open `min_connections` streams.
    ///
    /// Any failure during warm-up closes what was already opened and fails
    /// construction.
    pub fn new(
        hosts: Vec<String>,
        port: u16,
        min_connections: usize,
        max_connections: usize,
        timeouts: Timeouts,
    ) -> Result<Self> {
        if hosts.is_empty() {
            return Err(FdfsError::Config("no tracker hosts configured".to_string()));
        }
        if max_connections == 0 || min_connections > max_connections {
            return Err(FdfsError::Config(format!(
                "invalid pool bounds: min {} max {}",
                min_connections, max_connections
            )));
        }

        let pool = Self {
            hosts,
            port,
            max_connections,
            timeouts,
            idle: RwLock::new(Some(ArrayQueue::new(max_connections))),
            open: AtomicUsize::new(0),
        };

        for _ in 0..min_connections {
            pool.reserve_slot()?;
            let stream = match pool.dial_random() {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!("Pool warm-up failed: {}", e);
                    pool.open.fetch_sub(1, Ordering::SeqCst);
                    pool.close();
                    return Err(e);
                }
            };
            pool.put(stream);
        }

        tracing::debug!(
            hosts = ?pool.hosts,
            port = pool.port,
            min_connections,
            max_connections,
            "Connection pool ready"
        );
        Ok(pool)
    }

    /// Build a pool from the tracker section of a [`Config`]
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Self::new(
            config.tracker_hosts.clone(),
            config.tracker_port,
            config.min_connections,
            config.max_connections,
            config.timeouts(),
        )
    }

    /// Borrow a connection.
    ///
    /// Idle streams are probed with an active test and dropped if they fail it.
    /// With no idle stream a new one is dialed to a random host, unless the
    /// pool is already at `max_connections`, in which case this fails at once
    /// with [`FdfsError::Capacity`].
    pub fn get(&self) -> Result<PooledConnection<'_>> {
        loop {
            let popped = {
                let idle = self.idle.read();
                idle.as_ref().ok_or(FdfsError::Closed)?.pop()
            };

            let Some(mut stream) = popped else { break };
            match active_test(&mut stream) {
                Ok(()) => return Ok(PooledConnection::new(self, stream)),
                Err(e) => {
                    tracing::debug!("Dropping stale tracker connection: {}", e);
                    self.release(stream);
                }
            }
        }

        self.reserve_slot()?;
        match self.dial_random() {
            Ok(stream) => Ok(PooledConnection::new(self, stream)),
            Err(e) => {
                self.open.fetch_sub(1, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    /// Close every idle connection and refuse further `get` calls.
    ///
    /// Connections currently lent out are closed when their guards drop.
    pub fn close(&self) {
        let detached = self.idle.write().take();
        if let Some(queue) = detached {
            let mut closed = 0usize;
            while let Some(stream) = queue.pop() {
                self.release(stream);
                closed += 1;
            }
            tracing::debug!("Connection pool closed, {} idle connections shut down", closed);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.idle.read().is_none()
    }

    /// Idle streams waiting in the pool
    pub fn idle_count(&self) -> usize {
        self.idle.read().as_ref().map_or(0, |queue| queue.len())
    }

    /// Live streams, idle plus lent out
    pub fn open_count(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Return a stream to the idle queue, or close it if the pool is closed or full
    pub(super) fn put(&self, stream: TcpStream) {
        let rejected = {
            let idle = self.idle.read();
            match idle.as_ref() {
                Some(queue) => queue.push(stream).err(),
                None => Some(stream),
            }
        };
        if let Some(stream) = rejected {
            self.release(stream);
        }
    }

    /// Close a stream for real and free its slot
    pub(super) fn release(&self, stream: TcpStream) {
        shutdown(stream);
        self.open.fetch_sub(1, Ordering::SeqCst);
    }

    fn reserve_slot(&self) -> Result<()> {
        self.open
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |open| {
                (open < self.max_connections).then_some(open + 1)
            })
            .map(|_| ())
            .map_err(|_| FdfsError::Capacity {
                max: self.max_connections,
            })
    }

    /// Single attempt against one uniformly chosen host; no failover.
    fn dial_random(&self) -> Result<TcpStream> {
        let index = rand::rng().random_range(0..self.hosts.len());
        dial(&self.hosts[index], self.port, &self.timeouts)
    }
}

impl Drop for ConnectionPool {
    fn drop(&mut self) {
        self.close();
    }
}
