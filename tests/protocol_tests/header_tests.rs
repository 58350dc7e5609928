//! Frame Header Tests
//!
//! Tests for the fixed 10-byte header.

use std::io::Cursor;

use fdfs_client::protocol::{Command, FrameHeader, HEADER_SIZE};
use fdfs_client::FdfsError;

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_header_size_is_ten_bytes() {
    let header = FrameHeader::request(Command::Upload, 42);
    assert_eq!(header.encode().len(), HEADER_SIZE);
    assert_eq!(HEADER_SIZE, 10);
}

#[test]
fn test_header_wire_layout_is_big_endian() {
    let header = FrameHeader {
        body_len: 0x0102_0304_0506_0708,
        command: 101,
        status: 22,
    };

    assert_eq!(
        header.encode(),
        [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 101, 22]
    );
}

#[test]
fn test_request_header_has_zero_status() {
    let header = FrameHeader::request(Command::ActiveTest, 0);
    assert_eq!(header.command, 111);
    assert_eq!(header.status, 0);
    assert_eq!(header.encode(), [0, 0, 0, 0, 0, 0, 0, 0, 111, 0]);
}

#[test]
fn test_negative_command_and_status_survive() {
    let header = FrameHeader {
        body_len: 1,
        command: -1,
        status: -128,
    };
    let bytes = header.encode();
    assert_eq!(bytes[8], 0xFF);
    assert_eq!(bytes[9], 0x80);
    assert_eq!(FrameHeader::decode(&bytes).unwrap(), header);
}

#[test]
fn test_header_roundtrip_across_ranges() {
    let lengths = [0u64, 1, 15, 255, 256, 65_535, 1 << 32, (1 << 63) - 1];
    let bytes = [i8::MIN, -1, 0, 1, 22, 100, i8::MAX];

    for &body_len in &lengths {
        for &command in &bytes {
            for &status in &bytes {
                let header = FrameHeader {
                    body_len,
                    command,
                    status,
                };
                assert_eq!(FrameHeader::decode(&header.encode()).unwrap(), header);
            }
        }
    }
}

// =============================================================================
// Decoding Error Tests
// =============================================================================

#[test]
fn test_decode_rejects_short_input() {
    let result = FrameHeader::decode(&[0u8; 9]);
    assert!(matches!(result, Err(FdfsError::Framing(_))));
}

#[test]
fn test_decode_rejects_long_input() {
    let result = FrameHeader::decode(&[0u8; 11]);
    assert!(matches!(result, Err(FdfsError::Framing(_))));
}

#[test]
fn test_decode_rejects_empty_input() {
    let result = FrameHeader::decode(&[]);
    assert!(matches!(result, Err(FdfsError::Framing(_))));
}

// =============================================================================
// Stream Tests
// =============================================================================

#[test]
fn test_write_then_read_from_stream() {
    let header = FrameHeader {
        body_len: 40,
        command: 100,
        status: 0,
    };

    let mut buffer = Vec::new();
    header.write_to(&mut buffer).unwrap();
    assert_eq!(buffer.len(), HEADER_SIZE);

    let mut cursor = Cursor::new(buffer);
    let read = FrameHeader::read_from(&mut cursor).unwrap();
    assert_eq!(read, header);
    assert!(read.is_ok());
}

#[test]
fn test_read_from_truncated_stream_is_framing_error() {
    let mut cursor = Cursor::new(vec![0u8; 4]);
    let result = FrameHeader::read_from(&mut cursor);
    assert!(matches!(result, Err(FdfsError::Framing(_))));
}

#[test]
fn test_nonzero_status_is_not_ok() {
    let header = FrameHeader {
        body_len: 0,
        command: 100,
        status: 2,
    };
    assert!(!header.is_ok());
}

// =============================================================================
// Command Code Tests
// =============================================================================

#[test]
fn test_command_codes() {
    assert_eq!(Command::Upload.code(), 11);
    assert_eq!(Command::Delete.code(), 12);
    assert_eq!(Command::Download.code(), 14);
    assert_eq!(Command::UploadSlave.code(), 21);
    assert_eq!(Command::Response.code(), 100);
    assert_eq!(Command::QueryStoreWithoutGroup.code(), 101);
    assert_eq!(Command::QueryFetchOne.code(), 102);
    assert_eq!(Command::QueryUpdate.code(), 103);
    assert_eq!(Command::QueryStoreWithGroup.code(), 104);
    assert_eq!(Command::ActiveTest.code(), 111);
}

#[test]
fn test_command_from_code() {
    for command in [
        Command::Upload,
        Command::Delete,
        Command::Download,
        Command::UploadSlave,
        Command::Response,
        Command::QueryStoreWithoutGroup,
        Command::QueryFetchOne,
        Command::QueryUpdate,
        Command::QueryStoreWithGroup,
        Command::ActiveTest,
    ] {
        assert_eq!(Command::from_code(command.code()), Some(command));
    }
    assert_eq!(Command::from_code(13), None);
}
