//! Request/response exchange
//!
//! Drives one request through a connection and tracks where it is, so a failure
//! can be reported with the phase it happened in and so the owner of the
//! connection knows whether the stream is still in sync.
//!
//! ```text
//! Idle → HeaderSent → BodySent → AwaitingResponseHeader → AwaitingResponseBody → Done
//!                                                                         └──→ Failed
//! ```

use std::fmt;
use std::io::{self, Read, Write};

use crate::error::{FdfsError, Result};
use super::{Command, FrameHeader, Request, MAX_RESPONSE_BODY};

/// Where an exchange currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    HeaderSent,
    BodySent,
    AwaitingResponseHeader,
    AwaitingResponseBody,
    Done,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::HeaderSent => "header sent",
            Phase::BodySent => "body sent",
            Phase::AwaitingResponseHeader => "awaiting response header",
            Phase::AwaitingResponseBody => "awaiting response body",
            Phase::Done => "done",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One request in flight on a borrowed stream
pub struct Exchange<'a, S: Read + Write + ?Sized> {
    stream: &'a mut S,
    phase: Phase,
    command: Option<Command>,
}

impl<'a, S: Read + Write + ?Sized> Exchange<'a, S> {
    pub fn new(stream: &'a mut S) -> Self {
        Self {
            stream,
            phase: Phase::Idle,
            command: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True once the response was consumed completely; the stream can carry
    /// another request.
    pub fn is_clean(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Send header and body. Any payload declared by the request must follow
    /// through [`Exchange::send_payload`].
    pub fn send(&mut self, request: &Request) -> Result<()> {
        self.expect(Phase::Idle)?;
        self.command = Some(request.command);

        let header = request.header();
        let result = header.write_to(&mut *self.stream);
        self.step(result, Phase::HeaderSent)?;

        let result = self
            .stream
            .write_all(&request.body)
            .and_then(|_| self.stream.flush())
            .map_err(FdfsError::from);
        self.step(result, Phase::BodySent)
    }

    /// Stream exactly `expected` bytes from `source` after the body.
    pub fn send_payload<R: Read + ?Sized>(&mut self, source: &mut R, expected: u64) -> Result<()> {
        self.expect(Phase::BodySent)?;

        let result = io::copy(&mut source.take(expected), &mut *self.stream)
            .and_then(|copied| self.stream.flush().map(|_| copied))
            .map_err(FdfsError::from)
            .and_then(|copied| {
                if copied == expected {
                    Ok(())
                } else {
                    Err(FdfsError::SizeMismatch {
                        expected,
                        actual: copied,
                    })
                }
            });
        self.step(result, Phase::BodySent)
    }

    /// Read the response header. A non-zero status becomes
    /// [`FdfsError::Status`]; any error body is drained so the stream stays usable.
    pub fn recv_header(&mut self) -> Result<FrameHeader> {
        self.expect(Phase::BodySent)?;
        self.phase = Phase::AwaitingResponseHeader;

        let result = FrameHeader::read_from(&mut *self.stream).and_then(|header| {
            if header.command != Command::Response.code() {
                return Err(FdfsError::Framing(format!(
                    "expected response command {}, got {}",
                    Command::Response.code(),
                    header.command
                )));
            }
            Ok(header)
        });
        let header = self.step(result, Phase::AwaitingResponseBody)?;

        if !header.is_ok() {
            let code = header.status;
            tracing::debug!(command = ?self.command, status = code, "server returned error status");
            self.drain(header.body_len);
            return Err(FdfsError::Status { code });
        }

        Ok(header)
    }

    /// Read the whole response body into memory.
    pub fn recv_body(&mut self, header: &FrameHeader) -> Result<Vec<u8>> {
        self.expect(Phase::AwaitingResponseBody)?;

        let result = if header.body_len > MAX_RESPONSE_BODY {
            Err(FdfsError::Framing(format!(
                "response body too large: {} bytes (max {})",
                header.body_len, MAX_RESPONSE_BODY
            )))
        } else {
            let mut body = vec![0u8; header.body_len as usize];
            self.stream
                .read_exact(&mut body)
                .map(|_| body)
                .map_err(|e| short_body(e, header.body_len))
        };
        self.step(result, Phase::Done)
    }

    /// Stream the whole response body into `sink`, returning the bytes moved.
    pub fn recv_body_into<W: Write + ?Sized>(
        &mut self,
        header: &FrameHeader,
        sink: &mut W,
    ) -> Result<u64> {
        self.expect(Phase::AwaitingResponseBody)?;

        let expected = header.body_len;
        let result = io::copy(&mut (&mut *self.stream).take(expected), sink)
            .and_then(|copied| sink.flush().map(|_| copied))
            .map_err(FdfsError::from)
            .and_then(|copied| {
                if copied == expected {
                    Ok(copied)
                } else {
                    Err(FdfsError::Framing(format!(
                        "connection closed after {} of {} body bytes",
                        copied, expected
                    )))
                }
            });
        self.step(result, Phase::Done)
    }

    fn expect(&mut self, phase: Phase) -> Result<()> {
        if self.phase == phase {
            return Ok(());
        }
        let error = FdfsError::Framing(format!(
            "exchange out of order: expected phase '{}', currently '{}'",
            phase, self.phase
        ));
        self.phase = Phase::Failed;
        Err(error)
    }

    fn step<T>(&mut self, result: Result<T>, next: Phase) -> Result<T> {
        match result {
            Ok(value) => {
                tracing::trace!(command = ?self.command, from = %self.phase, to = %next, "exchange advanced");
                self.phase = next;
                Ok(value)
            }
            Err(e) => {
                tracing::debug!(command = ?self.command, phase = %self.phase, error = %e, "exchange failed");
                self.phase = Phase::Failed;
                Err(e)
            }
        }
    }

    fn drain(&mut self, len: u64) {
        if len > MAX_RESPONSE_BODY {
            self.phase = Phase::Failed;
            return;
        }
        self.phase = match io::copy(&mut (&mut *self.stream).take(len), &mut io::sink()) {
            Ok(copied) if copied == len => Phase::Done,
            _ => Phase::Failed,
        };
    }
}

fn short_body(error: io::Error, expected: u64) -> FdfsError {
    match error.kind() {
        io::ErrorKind::UnexpectedEof => FdfsError::Framing(format!(
            "connection closed before {} body bytes arrived",
            expected
        )),
        _ => FdfsError::Transport(error),
    }
}
