//! Client Module
//!
//! The entry point that ties the tracker and storage clients together.
//!
//! ## Responsibilities
//! - Own the tracker connection pool for the lifetime of the client
//! - Validate inputs before any network call
//! - Run every operation as resolve-then-operate: one tracker lookup, then one
//!   direct storage connection using the endpoint from that same lookup

use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;

use crate::config::Config;
use crate::error::{FdfsError, Result};
use crate::network::ConnectionPool;
use crate::protocol::{FILE_EXT_NAME_MAX_LEN, FILE_PREFIX_MAX_LEN};
use crate::storage::StorageClient;
use crate::tracker::TrackerClient;
use crate::types::{DownloadResult, DownloadSink, FileId, StorageEndpoint, UploadResult, UploadSource};

/// Client for a tracker/storage cluster
///
/// ## Concurrency Model
///
/// - Every call runs synchronously on the calling thread
/// - The tracker pool is the only shared state; borrowing from it never blocks
///   and fails with [`FdfsError::Capacity`] when it is exhausted
/// - Storage connections are private to the call that opened them
///
/// `Client` is `Send + Sync`; share it behind an `Arc` across threads.
pub struct Client {
    config: Config,
    tracker: TrackerClient,

    /// Every operation's events are recorded under this span
    span: tracing::Span,
}

impl Client {
    /// Build the pool (opening `min_connections` eagerly) and the client
    pub fn new(config: Config) -> Result<Self> {
        let span = tracing::info_span!("fdfs_client", trackers = ?config.tracker_hosts);
        Self::with_span(config, span)
    }

    /// Like [`Client::new`], recording all events under the caller's span
    pub fn with_span(config: Config, span: tracing::Span) -> Result<Self> {
        let pool = {
            let _enter = span.enter();
            ConnectionPool::from_config(&config)?
        };

        Ok(Self {
            config,
            tracker: TrackerClient::new(Arc::new(pool)),
            span,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tracker(&self) -> &TrackerClient {
        &self.tracker
    }

    pub fn pool(&self) -> &Arc<ConnectionPool> {
        self.tracker.pool()
    }

    // =========================================================================
    // Upload
    // =========================================================================

    /// Upload to whichever node the tracker picks. An empty `ext` on a path
    /// source takes the file's own extension.
    pub fn upload(&self, source: UploadSource<'_>, ext: &str) -> Result<UploadResult> {
        let _enter = self.span.enter();

        let ext = resolve_extension(&source, ext)?;
        check_source(&source)?;

        let endpoint = self.tracker.query_store_without_group()?;
        self.storage(endpoint).upload(source, &ext, None, "")
    }

    pub fn upload_from_path(&self, path: &Path) -> Result<UploadResult> {
        self.upload(UploadSource::Path(path), "")
    }

    pub fn upload_from_bytes(&self, bytes: &[u8], ext: &str) -> Result<UploadResult> {
        self.upload(UploadSource::Bytes(bytes), ext)
    }

    pub fn upload_from_stream(&self, reader: &mut dyn Read, size: u64, ext: &str) -> Result<UploadResult> {
        self.upload(UploadSource::Stream { reader, size }, ext)
    }

    /// Upload a slave file next to `master`. The node is always resolved in
    /// the master's group.
    pub fn upload_slave(
        &self,
        source: UploadSource<'_>,
        master: &FileId,
        prefix: &str,
        ext: &str,
    ) -> Result<UploadResult> {
        let _enter = self.span.enter();

        let ext = resolve_extension(&source, ext)?;
        if prefix.len() > FILE_PREFIX_MAX_LEN {
            return Err(FdfsError::Validation(format!(
                "prefix '{}' is longer than {} bytes",
                prefix, FILE_PREFIX_MAX_LEN
            )));
        }
        check_source(&source)?;

        let endpoint = self.tracker.query_store_with_group(master.group())?;
        self.storage(endpoint)
            .upload(source, &ext, Some(master.path()), prefix)
    }

    // =========================================================================
    // Delete
    // =========================================================================

    pub fn delete(&self, file_id: &FileId) -> Result<()> {
        let _enter = self.span.enter();

        let endpoint = self.tracker.query_update(file_id)?;
        self.storage(endpoint).delete(file_id)
    }

    // =========================================================================
    // Download
    // =========================================================================

    /// Download `size` bytes from `offset` into `sink`; `size == 0` reads to
    /// the end. Returns the bytes transferred.
    pub fn download(
        &self,
        file_id: &FileId,
        sink: DownloadSink<'_>,
        offset: u64,
        size: u64,
    ) -> Result<u64> {
        let _enter = self.span.enter();

        let endpoint = self.tracker.query_fetch(file_id)?;
        self.storage(endpoint).download(file_id, offset, size, sink)
    }

    pub fn download_to_buffer(&self, file_id: &FileId, offset: u64, size: u64) -> Result<DownloadResult> {
        let mut buffer = Vec::new();
        let size = self.download(file_id, DownloadSink::Buffer(&mut buffer), offset, size)?;

        Ok(DownloadResult {
            file_id: file_id.clone(),
            size,
            content: Bytes::from(buffer),
        })
    }

    /// Download a whole object into a local file, replacing it
    pub fn download_to_file(&self, file_id: &FileId, path: &Path) -> Result<u64> {
        self.download(file_id, DownloadSink::Path(path), 0, 0)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Close the tracker pool. Later calls fail with [`FdfsError::Closed`].
    pub fn close(&self) {
        let _enter = self.span.enter();
        self.tracker.pool().close();
        tracing::info!("Client closed");
    }

    fn storage(&self, endpoint: StorageEndpoint) -> StorageClient {
        StorageClient::new(endpoint, self.config.timeouts())
    }
}

/// Pick the extension to send: the explicit one, else the path's own.
fn resolve_extension(source: &UploadSource<'_>, ext: &str) -> Result<String> {
    if !ext.is_empty() {
        if ext.len() > FILE_EXT_NAME_MAX_LEN {
            return Err(FdfsError::Validation(format!(
                "file extension '{}' is longer than {} bytes",
                ext, FILE_EXT_NAME_MAX_LEN
            )));
        }
        return Ok(ext.to_string());
    }

    match source.path_extension() {
        Some(derived) if derived.len() <= FILE_EXT_NAME_MAX_LEN => Ok(derived.to_string()),
        Some(derived) => {
            tracing::debug!("Extension '{}' too long to send, uploading without one", derived);
            Ok(String::new())
        }
        None => Ok(String::new()),
    }
}

/// A path source must name an existing regular file
fn check_source(source: &UploadSource<'_>) -> Result<()> {
    if let UploadSource::Path(path) = source {
        let metadata = fs::metadata(path).map_err(|e| {
            FdfsError::Validation(format!("cannot upload {}: {}", path.display(), e))
        })?;
        if !metadata.is_file() {
            return Err(FdfsError::Validation(format!(
                "cannot upload {}: not a regular file",
                path.display()
            )));
        }
    }
    Ok(())
}
