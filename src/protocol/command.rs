//! Command definitions
//!
//! Command codes and fixed field widths shared by trackers and storage nodes.

/// Width of a group name field
pub const GROUP_NAME_MAX_LEN: usize = 16;

/// Width of an IP address field including its terminating NUL
pub const IP_ADDRESS_SIZE: usize = 16;

/// Width of a length/offset/size field
pub const PKG_LEN_SIZE: usize = 8;

/// Width of a file extension field
pub const FILE_EXT_NAME_MAX_LEN: usize = 6;

/// Width of a slave file prefix field
pub const FILE_PREFIX_MAX_LEN: usize = 16;

/// Command codes carried in the frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum Command {
    // Storage commands
    Upload = 11,
    Delete = 12,
    Download = 14,
    UploadSlave = 21,

    // Tracker commands
    Response = 100,
    QueryStoreWithoutGroup = 101,
    QueryFetchOne = 102,
    QueryUpdate = 103,
    QueryStoreWithGroup = 104,

    /// Liveness probe understood by trackers and storage nodes alike
    ActiveTest = 111,
}

impl Command {
    /// The raw header byte
    pub fn code(self) -> i8 {
        self as i8
    }

    /// Map a raw header byte back to a known command
    pub fn from_code(code: i8) -> Option<Self> {
        let command = match code {
            11 => Command::Upload,
            12 => Command::Delete,
            14 => Command::Download,
            21 => Command::UploadSlave,
            100 => Command::Response,
            101 => Command::QueryStoreWithoutGroup,
            102 => Command::QueryFetchOne,
            103 => Command::QueryUpdate,
            104 => Command::QueryStoreWithGroup,
            111 => Command::ActiveTest,
            _ => return None,
        };
        Some(command)
    }
}
