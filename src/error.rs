//! Error types for fdfs-client
//!
//! Provides a unified error type for all operations. Nothing in this crate
//! retries; every error is handed straight back to the caller.

use thiserror::Error;

/// Result type alias using FdfsError
pub type Result<T> = std::result::Result<T, FdfsError>;

/// Unified error type for client operations
#[derive(Debug, Error)]
pub enum FdfsError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    /// Dial, read, write or timeout failure on a socket.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// Short or malformed header/body. Fatal to the call.
    #[error("framing error: {0}")]
    Framing(String),

    /// The server answered with a non-zero status byte.
    #[error("server returned status {code} ({})", status_description(*.code))]
    Status { code: i8 },

    /// Requested and transferred byte counts disagree.
    #[error("size mismatch: expected {expected} bytes, transferred {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    // -------------------------------------------------------------------------
    // Pool Errors
    // -------------------------------------------------------------------------
    #[error("connection pool exhausted: {max} connections already open")]
    Capacity { max: usize },

    #[error("connection pool is closed")]
    Closed,

    // -------------------------------------------------------------------------
    // Input / Configuration Errors
    // -------------------------------------------------------------------------
    /// Rejected before any network call was attempted.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl FdfsError {
    /// The server status code, if this error came from a non-zero status.
    pub fn status_code(&self) -> Option<i8> {
        match self {
            FdfsError::Status { code } => Some(*code),
            _ => None,
        }
    }

    /// True for socket-level failures (dial/read/write/timeout).
    pub fn is_transport(&self) -> bool {
        matches!(self, FdfsError::Transport(_))
    }
}

/// Human-readable meaning of the status codes servers are known to send.
/// Codes are errno values; anything else passes through opaque.
pub fn status_description(code: i8) -> &'static str {
    match code {
        2 => "no such file or directory",
        17 => "file exists",
        22 => "invalid argument",
        28 => "no space left on device",
        _ => "unknown",
    }
}
