//! Protocol constants for the configuration store wire format
//!
//! The command set is deliberately tiny. `CMD_WRITE_DATA` is overloaded for
//! every "write N bytes at the current flash write pointer" step; the target
//! tells the metadata fields and data pages apart purely by their position
//! in the fixed upload sequence, so that ordering must never change.

/// Frame start marker
pub const MAGIC: [u8; 3] = [0xAA, 0xBB, 0xCC];

/// Positive acknowledgement byte sent by the target after each accepted frame
pub const ACK: u8 = 0xDD;

/// Set the flash write pointer (payload: 4-byte big-endian address)
pub const CMD_SET_ADDRESS: u8 = 0x10;
/// Erase a storage slot (payload: 1-byte slot number)
pub const CMD_ERASE_SLOT: u8 = 0x22;
/// Write payload bytes at the current write pointer
pub const CMD_WRITE_DATA: u8 = 0x30;
/// Read back a slot's metadata record (payload: 5-byte read request)
pub const CMD_READ_HEADER: u8 = 0x40;
/// Boot the configuration stored in a slot (payload: 1-byte slot number)
pub const CMD_START_CONFIG: u8 = 0x50;

/// Flash page size; bitfile data is streamed in pages of this size
pub const PAGE_SIZE: usize = 256;

/// Size of the metadata record stored in a slot's metadata page
pub const HEADER_LEN: usize = 90;

/// Build the 5-byte payload of a header read request
///
/// The second byte selects which metadata page offset to read, the last one
/// is the number of record bytes the target should return.
pub fn header_read_request(header_offset: u8) -> [u8; 5] {
    [0x00, header_offset, 0x00, 0x00, HEADER_LEN as u8]
}
