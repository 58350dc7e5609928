//! Frame header
//!
//! The fixed 10-byte prefix of every request and response.

use std::io::{Read, Write};

use bytes::{Buf, BufMut};

use crate::error::{FdfsError, Result};
use super::Command;

/// Header size: 8 bytes body length + 1 byte command + 1 byte status
pub const HEADER_SIZE: usize = 10;

/// A decoded frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameHeader {
    /// Length of everything that follows the header
    pub body_len: u64,
    pub command: i8,
    /// Zero on success; only meaningful in responses
    pub status: i8,
}

impl FrameHeader {
    /// Header for an outgoing request
    pub fn request(command: Command, body_len: u64) -> Self {
        Self {
            body_len,
            command: command.code(),
            status: 0,
        }
    }

    /// Encode to the fixed wire layout
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        let mut buf = &mut bytes[..];
        buf.put_u64(self.body_len);
        buf.put_i8(self.command);
        buf.put_i8(self.status);
        bytes
    }

    /// Decode from exactly [`HEADER_SIZE`] bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != HEADER_SIZE {
            return Err(FdfsError::Framing(format!(
                "header must be {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let mut buf = bytes;
        Ok(Self {
            body_len: buf.get_u64(),
            command: buf.get_i8(),
            status: buf.get_i8(),
        })
    }

    /// True when the server reported success
    pub fn is_ok(&self) -> bool {
        self.status == 0
    }

    /// Read one header from a stream
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let mut bytes = [0u8; HEADER_SIZE];
        reader.read_exact(&mut bytes).map_err(|e| match e.kind() {
            std::io::ErrorKind::UnexpectedEof => {
                FdfsError::Framing("connection closed before a full header arrived".to_string())
            }
            _ => FdfsError::Transport(e),
        })?;
        Self::decode(&bytes)
    }

    /// Write this header to a stream
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.encode())?;
        Ok(())
    }
}
