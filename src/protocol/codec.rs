//! Protocol codec
//!
//! Encoding of request bodies and decoding of response bodies.
//!
//! ## Body Layouts
//!
//! ```text
//! upload:        │ store_path_index (1) │ file_size (8) │ ext (6) │
//! upload slave:  │ master_len (8) │ file_size (8) │ prefix (16) │ ext (6) │ master_name │
//! delete:        │ group (16) │ filename │
//! download:      │ offset (8) │ length (8) │ group (16) │ filename │
//! tracker query: │ group (16) │ [filename] │
//!
//! query response:  │ group (16) │ ip (15) │ port (8) │ [store_path_index (1)] │
//! upload response: │ group (16) │ remote filename (rest) │
//! ```
//!
//! Fixed-width strings are NUL padded on the way out and cut at the first NUL
//! on the way in.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{FdfsError, Result};
use crate::types::{StorageEndpoint, UploadResult};
use super::{
    Command, FrameHeader, FILE_EXT_NAME_MAX_LEN, FILE_PREFIX_MAX_LEN, GROUP_NAME_MAX_LEN,
    IP_ADDRESS_SIZE, PKG_LEN_SIZE,
};

/// Largest response body read into memory (16 MB). Downloads stream and are not capped.
pub const MAX_RESPONSE_BODY: u64 = 16 * 1024 * 1024;

/// Query response without the trailing store path index (fetch/update answers)
pub const QUERY_FETCH_BODY_LEN: usize = GROUP_NAME_MAX_LEN + IP_ADDRESS_SIZE - 1 + PKG_LEN_SIZE;

/// Query response with the trailing store path index (store answers)
pub const QUERY_STORE_BODY_LEN: usize = QUERY_FETCH_BODY_LEN + 1;

// =============================================================================
// Request
// =============================================================================

/// An encoded request: command, body, and the length of any payload streamed
/// after the body. The header length is always derived from both.
#[derive(Debug, Clone)]
pub struct Request {
    pub command: Command,
    pub body: BytesMut,
    pub payload_len: u64,
}

impl Request {
    pub fn new(command: Command, body: BytesMut) -> Self {
        Self {
            command,
            body,
            payload_len: 0,
        }
    }

    /// Declare `len` bytes that will be streamed after the body
    pub fn with_payload(mut self, len: u64) -> Self {
        self.payload_len = len;
        self
    }

    /// Header whose length covers body and payload
    pub fn header(&self) -> FrameHeader {
        FrameHeader::request(self.command, self.body.len() as u64 + self.payload_len)
    }
}

// =============================================================================
// Fixed-width strings
// =============================================================================

/// Append `value` NUL padded to `width`; longer values are rejected.
pub fn encode_fixed_str(buf: &mut BytesMut, field: &str, value: &str, width: usize) -> Result<()> {
    let bytes = value.as_bytes();
    if bytes.len() > width {
        return Err(FdfsError::Validation(format!(
            "{} '{}' is {} bytes, at most {} allowed",
            field,
            value,
            bytes.len(),
            width
        )));
    }
    buf.put_slice(bytes);
    buf.put_bytes(0, width - bytes.len());
    Ok(())
}

/// Consume `width` bytes and return them up to the first NUL.
pub fn read_fixed_str(buf: &mut &[u8], width: usize) -> Result<String> {
    if buf.remaining() < width {
        return Err(FdfsError::Framing(format!(
            "expected a {} byte field, only {} bytes left",
            width,
            buf.remaining()
        )));
    }

    let raw = &buf[..width];
    let end = raw.iter().position(|&b| b == 0).unwrap_or(width);
    let value = std::str::from_utf8(&raw[..end])
        .map_err(|e| FdfsError::Framing(format!("field is not valid UTF-8: {}", e)))?
        .to_string();
    buf.advance(width);
    Ok(value)
}

// =============================================================================
// Storage requests
// =============================================================================

/// Plain upload. The file bytes follow the body.
#[derive(Debug, Clone, Copy)]
pub struct UploadRequest<'a> {
    pub store_path_index: u8,
    pub file_size: u64,
    pub ext: &'a str,
}

impl UploadRequest<'_> {
    pub const BODY_LEN: usize = 1 + PKG_LEN_SIZE + FILE_EXT_NAME_MAX_LEN;

    pub fn encode(&self) -> Result<Request> {
        let mut body = BytesMut::with_capacity(Self::BODY_LEN);
        body.put_u8(self.store_path_index);
        body.put_u64(self.file_size);
        encode_fixed_str(&mut body, "file extension", self.ext, FILE_EXT_NAME_MAX_LEN)?;
        Ok(Request::new(Command::Upload, body).with_payload(self.file_size))
    }
}

/// Upload of a slave file attached to an existing master file.
#[derive(Debug, Clone, Copy)]
pub struct SlaveUploadRequest<'a> {
    pub master_filename: &'a str,
    pub file_size: u64,
    pub prefix: &'a str,
    pub ext: &'a str,
}

impl SlaveUploadRequest<'_> {
    /// Body length before the master filename
    pub const FIXED_LEN: usize =
        PKG_LEN_SIZE * 2 + FILE_PREFIX_MAX_LEN + FILE_EXT_NAME_MAX_LEN;

    pub fn encode(&self) -> Result<Request> {
        if self.master_filename.is_empty() {
            return Err(FdfsError::Validation(
                "slave upload requires a master filename".to_string(),
            ));
        }

        let master = self.master_filename.as_bytes();
        let mut body = BytesMut::with_capacity(Self::FIXED_LEN + master.len());
        body.put_u64(master.len() as u64);
        body.put_u64(self.file_size);
        encode_fixed_str(&mut body, "prefix", self.prefix, FILE_PREFIX_MAX_LEN)?;
        encode_fixed_str(&mut body, "file extension", self.ext, FILE_EXT_NAME_MAX_LEN)?;
        body.put_slice(master);
        Ok(Request::new(Command::UploadSlave, body).with_payload(self.file_size))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteRequest<'a> {
    pub group: &'a str,
    pub filename: &'a str,
}

impl DeleteRequest<'_> {
    pub fn encode(&self) -> Result<Request> {
        let mut body = BytesMut::with_capacity(GROUP_NAME_MAX_LEN + self.filename.len());
        encode_fixed_str(&mut body, "group name", self.group, GROUP_NAME_MAX_LEN)?;
        body.put_slice(self.filename.as_bytes());
        Ok(Request::new(Command::Delete, body))
    }
}

/// Download `length` bytes starting at `offset`; a zero length reads to the end.
#[derive(Debug, Clone, Copy)]
pub struct DownloadRequest<'a> {
    pub offset: u64,
    pub length: u64,
    pub group: &'a str,
    pub filename: &'a str,
}

impl DownloadRequest<'_> {
    pub fn encode(&self) -> Result<Request> {
        let mut body =
            BytesMut::with_capacity(PKG_LEN_SIZE * 2 + GROUP_NAME_MAX_LEN + self.filename.len());
        body.put_u64(self.offset);
        body.put_u64(self.length);
        encode_fixed_str(&mut body, "group name", self.group, GROUP_NAME_MAX_LEN)?;
        body.put_slice(self.filename.as_bytes());
        Ok(Request::new(Command::Download, body))
    }
}

// =============================================================================
// Tracker requests
// =============================================================================

/// The four lookups a tracker answers with a single storage endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerQuery<'a> {
    StoreWithoutGroup,
    StoreWithGroup { group: &'a str },
    Fetch { group: &'a str, filename: &'a str },
    Update { group: &'a str, filename: &'a str },
}

impl TrackerQuery<'_> {
    pub fn command(&self) -> Command {
        match self {
            TrackerQuery::StoreWithoutGroup => Command::QueryStoreWithoutGroup,
            TrackerQuery::StoreWithGroup { .. } => Command::QueryStoreWithGroup,
            TrackerQuery::Fetch { .. } => Command::QueryFetchOne,
            TrackerQuery::Update { .. } => Command::QueryUpdate,
        }
    }

    pub fn encode(&self) -> Result<Request> {
        let mut body = BytesMut::new();
        match *self {
            TrackerQuery::StoreWithoutGroup => {}
            TrackerQuery::StoreWithGroup { group } => {
                encode_fixed_str(&mut body, "group name", group, GROUP_NAME_MAX_LEN)?;
            }
            TrackerQuery::Fetch { group, filename } | TrackerQuery::Update { group, filename } => {
                body.reserve(GROUP_NAME_MAX_LEN + filename.len());
                encode_fixed_str(&mut body, "group name", group, GROUP_NAME_MAX_LEN)?;
                body.put_slice(filename.as_bytes());
            }
        }
        Ok(Request::new(self.command(), body))
    }
}

// =============================================================================
// Response decoding
// =============================================================================

/// Decode a tracker answer into the endpoint that should serve the request.
///
/// Store answers carry a trailing store path index; fetch/update answers from
/// real trackers omit it, in which case the index is 0.
pub fn decode_storage_endpoint(body: &[u8]) -> Result<StorageEndpoint> {
    if body.len() < QUERY_FETCH_BODY_LEN {
        return Err(FdfsError::Framing(format!(
            "tracker response body too short: expected at least {} bytes, got {}",
            QUERY_FETCH_BODY_LEN,
            body.len()
        )));
    }

    let mut buf = body;
    let group_name = read_fixed_str(&mut buf, GROUP_NAME_MAX_LEN)?;
    let host = read_fixed_str(&mut buf, IP_ADDRESS_SIZE - 1)?;
    let raw_port = buf.get_u64();
    let port = u16::try_from(raw_port)
        .map_err(|_| FdfsError::Framing(format!("port {} out of range", raw_port)))?;
    let store_path_index = if buf.has_remaining() { buf.get_u8() } else { 0 };

    if host.is_empty() {
        return Err(FdfsError::Framing("tracker returned an empty host".to_string()));
    }

    Ok(StorageEndpoint {
        host,
        port,
        group_name,
        store_path_index,
    })
}

/// Decode the group and remote filename a storage node assigned to an upload
pub fn decode_upload_response(body: &[u8]) -> Result<UploadResult> {
    if body.len() <= GROUP_NAME_MAX_LEN {
        return Err(FdfsError::Framing(format!(
            "upload response body too short: expected more than {} bytes, got {}",
            GROUP_NAME_MAX_LEN,
            body.len()
        )));
    }

    let mut buf = body;
    let group_name = read_fixed_str(&mut buf, GROUP_NAME_MAX_LEN)?;
    let remote_id = std::str::from_utf8(buf)
        .map_err(|e| FdfsError::Framing(format!("remote filename is not valid UTF-8: {}", e)))?
        .to_string();

    Ok(UploadResult {
        group_name,
        remote_id,
    })
}
