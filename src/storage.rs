//! Storage Client
//!
//! Uploads, downloads and deletes against one storage node picked by the tracker.
//!
//! Every operation dials its own connection, which is never pooled and is
//! closed when the operation returns, on success and on failure alike.

use std::fs::File;
use std::io::{BufWriter, Read};
use std::net::TcpStream;

use crate::config::Timeouts;
use crate::error::{FdfsError, Result};
use crate::network::dial;
use crate::protocol::{
    decode_upload_response, DeleteRequest, DownloadRequest, Exchange, Request,
    SlaveUploadRequest, UploadRequest,
};
use crate::types::{DownloadSink, FileId, StorageEndpoint, UploadResult, UploadSource};

/// Operations against a single resolved storage node
#[derive(Debug)]
pub struct StorageClient {
    endpoint: StorageEndpoint,
    timeouts: Timeouts,
}

impl StorageClient {
    /// Takes ownership of the endpoint; it serves exactly one logical call.
    pub fn new(endpoint: StorageEndpoint, timeouts: Timeouts) -> Self {
        Self { endpoint, timeouts }
    }

    pub fn endpoint(&self) -> &StorageEndpoint {
        &self.endpoint
    }

    // =========================================================================
    // Upload
    // =========================================================================

    /// Upload `source`. With `master` set this is a slave upload attached to
    /// that master filename, named with `prefix`.
    pub fn upload(
        &self,
        source: UploadSource<'_>,
        ext: &str,
        master: Option<&str>,
        prefix: &str,
    ) -> Result<UploadResult> {
        let (mut reader, size) = open_source(source)?;

        let request = upload_request(&self.endpoint, size, ext, master, prefix)?;

        let mut stream = self.connect()?;
        let mut exchange = Exchange::new(&mut stream);
        exchange.send(&request)?;
        exchange.send_payload(&mut reader, size)?;
        let header = exchange.recv_header()?;
        let body = exchange.recv_body(&header)?;
        let result = decode_upload_response(&body)?;

        tracing::debug!(
            storage = %self.endpoint.addr(),
            size,
            slave = master.is_some(),
            "Uploaded {}",
            result
        );
        Ok(result)
    }

    // =========================================================================
    // Delete
    // =========================================================================

    pub fn delete(&self, file_id: &FileId) -> Result<()> {
        let request = DeleteRequest {
            group: file_id.group(),
            filename: file_id.path(),
        }
        .encode()?;

        let mut stream = self.connect()?;
        let mut exchange = Exchange::new(&mut stream);
        exchange.send(&request)?;
        let header = exchange.recv_header()?;
        exchange.recv_body(&header)?;

        tracing::debug!(storage = %self.endpoint.addr(), "Deleted {}", file_id);
        Ok(())
    }

    // =========================================================================
    // Download
    // =========================================================================

    /// Stream `length` bytes from `offset` into `sink` (`length == 0` reads to
    /// the end). Returns the number of bytes the node sent.
    pub fn download(
        &self,
        file_id: &FileId,
        offset: u64,
        length: u64,
        sink: DownloadSink<'_>,
    ) -> Result<u64> {
        let request = DownloadRequest {
            offset,
            length,
            group: file_id.group(),
            filename: file_id.path(),
        }
        .encode()?;

        let mut stream = self.connect()?;
        let mut exchange = Exchange::new(&mut stream);
        exchange.send(&request)?;
        let header = exchange.recv_header()?;

        let transferred = match sink {
            DownloadSink::Path(path) => {
                let mut file = BufWriter::new(File::create(path)?);
                exchange.recv_body_into(&header, &mut file)?
            }
            DownloadSink::Buffer(buffer) => exchange.recv_body_into(&header, buffer)?,
            DownloadSink::Writer(writer) => exchange.recv_body_into(&header, writer)?,
        };

        if length > 0 && transferred < length {
            return Err(FdfsError::SizeMismatch {
                expected: length,
                actual: transferred,
            });
        }

        tracing::debug!(
            storage = %self.endpoint.addr(),
            offset,
            transferred,
            "Downloaded {}",
            file_id
        );
        Ok(transferred)
    }

    fn connect(&self) -> Result<TcpStream> {
        dial(&self.endpoint.host, self.endpoint.port, &self.timeouts)
    }
}

/// Resolve an upload source into a reader and the exact byte count to send
fn open_source(source: UploadSource<'_>) -> Result<(Box<dyn Read + '_>, u64)> {
    match source {
        UploadSource::Path(path) => {
            let file = File::open(path).map_err(|e| {
                FdfsError::Validation(format!("cannot open {}: {}", path.display(), e))
            })?;
            let size = file
                .metadata()
                .map_err(|e| FdfsError::Validation(format!("cannot stat {}: {}", path.display(), e)))?
                .len();
            Ok((Box::new(file), size))
        }
        UploadSource::Bytes(bytes) => Ok((Box::new(bytes), bytes.len() as u64)),
        UploadSource::Stream { reader, size } => Ok((Box::new(reader), size)),
    }
}

/// Encode the request an upload sends ahead of its payload
pub fn upload_request(
    endpoint: &StorageEndpoint,
    size: u64,
    ext: &str,
    master: Option<&str>,
    prefix: &str,
) -> Result<Request> {
    match master {
        Some(master_filename) => SlaveUploadRequest {
            master_filename,
            file_size: size,
            prefix,
            ext,
        }
        .encode(),
        None => UploadRequest {
            store_path_index: endpoint.store_path_index,
            file_size: size,
            ext,
        }
        .encode(),
    }
}
