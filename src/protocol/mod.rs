//! Protocol Module
//!
//! Defines the wire protocol spoken to trackers and storage nodes.
//!
//! ## Frame Format
//!
//! ```text
//! ┌──────────────────┬──────────┬──────────┬─────────────────────────────┐
//! │ Body Len (8, BE) │ Cmd (1)  │Status (1)│   Body (Body Len bytes)     │
//! └──────────────────┴──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! The body length covers the encoded command body plus any file bytes that
//! are streamed after it. `status` is only meaningful in responses; a
//! non-zero value is an errno-style server error.
//!
//! ### Commands
//! - 101: tracker query store without group - Body: empty
//! - 102: tracker query fetch one            - Body: group (16) + filename
//! - 103: tracker query update               - Body: group (16) + filename
//! - 104: tracker query store with group     - Body: group (16)
//! - 111: active test                        - Body: empty
//! - 11:  storage upload                     - Body: see [`UploadRequest`]
//! - 12:  storage delete                     - Body: group (16) + filename
//! - 14:  storage download                   - Body: offset (8) + length (8) + group (16) + filename
//! - 21:  storage upload slave               - Body: see [`SlaveUploadRequest`]
//! - 100: response

mod command;
mod header;
mod codec;
mod exchange;

pub use command::{
    Command, FILE_EXT_NAME_MAX_LEN, FILE_PREFIX_MAX_LEN, GROUP_NAME_MAX_LEN, IP_ADDRESS_SIZE,
    PKG_LEN_SIZE,
};
pub use header::{FrameHeader, HEADER_SIZE};
pub use codec::{
    decode_storage_endpoint, decode_upload_response, encode_fixed_str, read_fixed_str,
    DeleteRequest, DownloadRequest, Request, SlaveUploadRequest, TrackerQuery, UploadRequest,
    MAX_RESPONSE_BODY, QUERY_FETCH_BODY_LEN, QUERY_STORE_BODY_LEN,
};
pub use exchange::{Exchange, Phase};
