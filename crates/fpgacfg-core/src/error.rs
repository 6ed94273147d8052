//! Error types for protocol encoding and decoding

use thiserror::Error;

/// Errors produced by the pure protocol layer
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Slot number outside the supported range
    #[error("slot number {0} is out of range (valid slots are 1 to 5)")]
    InvalidSlot(u8),

    /// Frame does not start with the magic bytes
    #[error("frame does not start with the AA BB CC magic")]
    BadMagic,

    /// Buffer is too short to hold even an empty frame
    #[error("frame truncated: {0} bytes is shorter than the minimal frame")]
    Truncated(usize),

    /// Length field disagrees with the buffer size
    #[error("frame length field announces {announced} payload bytes, buffer holds {actual}")]
    LengthMismatch { announced: usize, actual: usize },

    /// Trailing checksum byte does not match the frame contents
    #[error("frame checksum mismatch: computed {computed:#04X}, frame carries {found:#04X}")]
    ChecksumMismatch { computed: u8, found: u8 },

    /// Payload does not fit the 16-bit length field
    #[error("payload of {0} bytes exceeds the 16-bit length field")]
    PayloadTooLarge(usize),

    /// Metadata record has the wrong length
    #[error("metadata record must be {expected} bytes, got {actual}")]
    BadRecordLength { expected: usize, actual: usize },
}

/// Result type for protocol operations
pub type Result<T> = core::result::Result<T, ProtocolError>;
