//! # fdfs-client
//!
//! A synchronous client for a two-tier distributed file system:
//! - Trackers decide which storage node serves each request
//! - Storage nodes hold file bytes in named groups
//! - A bounded, thread-safe pool of tracker connections
//! - Fixed binary framing with a 10-byte big-endian header
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Client                               │
//! │           upload / upload_slave / download / delete          │
//! └──────────────┬───────────────────────────────┬──────────────┘
//!                │ 1. resolve                    │ 2. operate
//!                ▼                               ▼
//!   ┌────────────────────────┐       ┌────────────────────────┐
//!   │     TrackerClient      │       │     StorageClient      │
//!   │  (one round trip per   │       │ (fresh connection per  │
//!   │   lookup, pooled)      │       │  call, never pooled)   │
//!   └───────────┬────────────┘       └───────────┬────────────┘
//!               │                                │
//!               ▼                                ▼
//!   ┌────────────────────────┐       ┌────────────────────────┐
//!   │    ConnectionPool      │       │     Storage node       │
//!   │  (bounded, non-blocking)│       │                        │
//!   └───────────┬────────────┘       └────────────────────────┘
//!               ▼
//!   ┌────────────────────────┐
//!   │     Tracker cluster    │
//!   └────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use fdfs_client::{Client, Config, FileId};
//!
//! # fn main() -> fdfs_client::Result<()> {
//! let config = Config::builder()
//!     .tracker_hosts(["10.0.0.1", "10.0.0.2"])
//!     .max_connections(16)
//!     .build();
//! let client = Client::new(config)?;
//!
//! let uploaded = client.upload_from_bytes(b"hello", "txt")?;
//! let file_id = uploaded.file_id()?;
//! let downloaded = client.download_to_buffer(&file_id, 0, 0)?;
//! assert_eq!(&downloaded.content[..], b"hello");
//!
//! client.delete(&FileId::parse(&uploaded.to_string())?)?;
//! client.close();
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod types;
pub mod tracker;
pub mod storage;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FdfsError, Result};
pub use config::Config;
pub use client::Client;
pub use network::ConnectionPool;
pub use storage::StorageClient;
pub use tracker::TrackerClient;
pub use types::{
    DownloadResult, DownloadSink, FileId, StorageEndpoint, UploadResult, UploadSource,
};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of fdfs-client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
