//! Slot addressing in target flash
//!
//! The configuration store holds five fixed slots. Each slot owns a 384 KiB
//! region starting at `slot * 393216`; the first 256 bytes of the region are
//! the metadata page, bitfile data starts right after it.

use core::fmt;

use crate::error::{ProtocolError, Result};
use crate::protocol::PAGE_SIZE;

/// Number of storage slots in the current flash format
pub const SLOT_COUNT: u8 = 5;

/// Flash bytes reserved per slot (metadata page included)
pub const SLOT_REGION_SIZE: u32 = 393_216;

/// A validated slot number (1 to [`SLOT_COUNT`])
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot(u8);

impl Slot {
    /// Validate a raw slot number
    pub fn new(number: u8) -> Result<Self> {
        if number == 0 || number > SLOT_COUNT {
            return Err(ProtocolError::InvalidSlot(number));
        }
        Ok(Self(number))
    }

    /// The raw slot number
    pub fn number(self) -> u8 {
        self.0
    }

    /// Start of the slot's flash region (the metadata page)
    pub fn start_address(self) -> u32 {
        u32::from(self.0) * SLOT_REGION_SIZE
    }

    /// Start of the slot's bitfile data, one page past the metadata
    pub fn data_address(self) -> u32 {
        self.start_address() + PAGE_SIZE as u32
    }

    /// Offset byte used in the header read request for this slot
    pub fn header_offset(self) -> u8 {
        self.0 * 6
    }

    /// All slots, in ascending order
    pub fn all() -> impl Iterator<Item = Slot> {
        (1..=SLOT_COUNT).map(Slot)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot {}", self.0)
    }
}
