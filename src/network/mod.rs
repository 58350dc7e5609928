//! Network Module
//!
//! Socket handling for tracker and storage connections.
//!
//! ## Architecture
//! - Tracker connections come from a bounded [`ConnectionPool`] and go back
//!   to it when their [`PooledConnection`] guard is dropped
//! - Storage connections are dialed per operation with [`dial`] and closed
//!   when the operation ends

mod connection;
mod pool;

pub use connection::{active_test, dial, PooledConnection};
pub use pool::ConnectionPool;
