//! Data model shared by the tracker client, storage client and facade.

use std::fmt;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

use bytes::Bytes;

use crate::error::{FdfsError, Result};
use crate::protocol::GROUP_NAME_MAX_LEN;

// =============================================================================
// File identifier
// =============================================================================

/// Address of one stored object: a group and the path the storage node
/// assigned within it. The external form is `"group/path"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileId {
    group: String,
    path: String,
}

impl FileId {
    pub fn new(group: impl Into<String>, path: impl Into<String>) -> Result<Self> {
        let group = group.into();
        let path = path.into();

        if group.is_empty() {
            return Err(FdfsError::Validation("file id has an empty group".to_string()));
        }
        if group.len() > GROUP_NAME_MAX_LEN {
            return Err(FdfsError::Validation(format!(
                "group '{}' is longer than {} bytes",
                group, GROUP_NAME_MAX_LEN
            )));
        }
        if path.is_empty() {
            return Err(FdfsError::Validation(format!(
                "file id in group '{}' has an empty path",
                group
            )));
        }

        Ok(Self { group, path })
    }

    /// Split `"group/path"` on the first `/`
    pub fn parse(remote_id: &str) -> Result<Self> {
        let (group, path) = remote_id.split_once('/').ok_or_else(|| {
            FdfsError::Validation(format!("remote id '{}' has no '/' separator", remote_id))
        })?;
        Self::new(group, path)
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl FromStr for FileId {
    type Err = FdfsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.path)
    }
}

// =============================================================================
// Tracker answers
// =============================================================================

/// The storage node a tracker picked for one request.
///
/// Produced fresh by every lookup and consumed by the storage client that
/// performs the matching operation; never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEndpoint {
    pub host: String,
    pub port: u16,
    pub group_name: String,
    pub store_path_index: u8,
}

impl StorageEndpoint {
    /// `host:port` form used for dialing
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Operation results
// =============================================================================

/// Where an upload landed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub group_name: String,
    /// Path within the group
    pub remote_id: String,
}

impl UploadResult {
    pub fn file_id(&self) -> Result<FileId> {
        FileId::new(self.group_name.clone(), self.remote_id.clone())
    }
}

impl fmt::Display for UploadResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group_name, self.remote_id)
    }
}

/// A download held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    pub file_id: FileId,
    pub size: u64,
    pub content: Bytes,
}

// =============================================================================
// Sources and sinks
// =============================================================================

/// Where upload bytes come from
pub enum UploadSource<'a> {
    /// A local file; its size is taken from metadata
    Path(&'a Path),
    Bytes(&'a [u8]),
    /// Exactly `size` bytes are read from `reader`
    Stream { reader: &'a mut dyn Read, size: u64 },
}

impl fmt::Debug for UploadSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            UploadSource::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            UploadSource::Stream { size, .. } => write!(f, "Stream({} bytes)", size),
        }
    }
}

impl UploadSource<'_> {
    /// Extension of a path source, if it has a usable one
    pub fn path_extension(&self) -> Option<&str> {
        match self {
            UploadSource::Path(path) => path.extension().and_then(|ext| ext.to_str()),
            _ => None,
        }
    }
}

/// Where download bytes go
pub enum DownloadSink<'a> {
    /// Created (or truncated) once the storage node accepts the request
    Path(&'a Path),
    /// Bytes are appended
    Buffer(&'a mut Vec<u8>),
    Writer(&'a mut dyn Write),
}

impl fmt::Debug for DownloadSink<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadSink::Path(path) => f.debug_tuple("Path").field(path).finish(),
            DownloadSink::Buffer(buf) => write!(f, "Buffer({} bytes)", buf.len()),
            DownloadSink::Writer(_) => f.write_str("Writer"),
        }
    }
}
