//! The 90-byte bitfile metadata record
//!
//! Layout as stored in a slot's metadata page and returned by a header read:
//!
//! | Field     | Size | Notes                                         |
//! |-----------|------|-----------------------------------------------|
//! | size      | 4    | big-endian byte count, `0xFFFFFFFF` = erased  |
//! | filename  | 64   | ASCII, truncated or right-padded with spaces  |
//! | timestamp | 6    | year-2000, month, day, hour, minute, second   |
//! | md5       | 16   | raw digest of the uploaded bitfile            |
//!
//! The record is written field by field during an upload (each field its own
//! frame), overwritten wholesale by the next upload to the slot, and reset
//! to the erased sentinel by an erase command on the target.

use core::fmt;

use crate::error::{ProtocolError, Result};
use crate::protocol::HEADER_LEN;

/// Size-field sentinel marking a slot as erased/empty
pub const ERASED_SIZE: u32 = 0xFFFF_FFFF;

/// Length of the filename field
pub const NAME_LEN: usize = 64;

/// Length of the MD5 field
pub const MD5_LEN: usize = 16;

/// Timestamp of the uploaded bitfile, one byte per component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    /// Years since 2000
    pub year: u8,
    /// Month (1-12)
    pub month: u8,
    /// Day of month
    pub day: u8,
    /// Hour (0-23)
    pub hour: u8,
    /// Minute
    pub minute: u8,
    /// Second
    pub second: u8,
}

impl Timestamp {
    /// Wire representation, in field order
    pub fn to_bytes(self) -> [u8; 6] {
        [
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        ]
    }

    /// Decode the 6 timestamp bytes of a record
    pub fn from_bytes(bytes: [u8; 6]) -> Self {
        Self {
            year: bytes[0],
            month: bytes[1],
            day: bytes[2],
            hour: bytes[3],
            minute: bytes[4],
            second: bytes[5],
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}/{:02}/{:02} - {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// A decoded metadata record for a written slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitfileHeader {
    /// Total bitfile byte count
    pub size: u32,
    /// Original filename, trailing padding stripped
    pub name: String,
    /// Modification time of the uploaded file
    pub timestamp: Timestamp,
    /// MD5 digest of the bitfile contents
    pub md5: [u8; MD5_LEN],
}

impl BitfileHeader {
    /// The MD5 digest as a lowercase hex string
    pub fn md5_hex(&self) -> String {
        self.md5.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// What a slot's metadata page holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotHeader {
    /// Size field carries the erased sentinel; remaining bytes are meaningless
    Erased,
    /// Slot holds a bitfile described by this record
    Written(BitfileHeader),
}

/// Parse a 90-byte metadata record
///
/// A record whose size field is `0xFFFFFFFF` is reported as erased no matter
/// what the remaining 86 bytes contain.
pub fn parse(record: &[u8]) -> Result<SlotHeader> {
    if record.len() != HEADER_LEN {
        return Err(ProtocolError::BadRecordLength {
            expected: HEADER_LEN,
            actual: record.len(),
        });
    }

    let size = u32::from_be_bytes([record[0], record[1], record[2], record[3]]);
    if size == ERASED_SIZE {
        return Ok(SlotHeader::Erased);
    }

    let name = String::from_utf8_lossy(&record[4..4 + NAME_LEN])
        .trim_end()
        .to_string();

    let mut ts = [0u8; 6];
    ts.copy_from_slice(&record[68..74]);

    let mut md5 = [0u8; MD5_LEN];
    md5.copy_from_slice(&record[74..90]);

    Ok(SlotHeader::Written(BitfileHeader {
        size,
        name,
        timestamp: Timestamp::from_bytes(ts),
        md5,
    }))
}

/// Truncate or right-pad a filename to the fixed 64-byte field
pub fn pad_name(name: &str) -> [u8; NAME_LEN] {
    let mut field = [b' '; NAME_LEN];
    let bytes = name.as_bytes();
    let len = bytes.len().min(NAME_LEN);
    field[..len].copy_from_slice(&bytes[..len]);
    field
}
