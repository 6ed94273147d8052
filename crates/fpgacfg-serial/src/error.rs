//! Error types for link and sequencer operations
//!
//! Every error here is fatal to the top-level operation it occurs in: there
//! is no retry and no rollback, a failed upload must be restarted from the
//! beginning. Errors therefore carry the protocol step they happened at so
//! the failure can be diagnosed.

use std::path::PathBuf;
use std::time::Duration;

use fpgacfg_core::{ProtocolError, Slot};
use thiserror::Error;

use crate::device::Step;

/// Errors produced by the serial link and the command sequencer
#[derive(Debug, Error)]
pub enum LinkError {
    /// Serial port could not be opened
    #[error("failed to open serial port {port}: {source}")]
    PortOpen {
        /// Device path that was requested
        port: String,
        /// Underlying serial error
        source: serialport::Error,
    },

    /// Serial port error after open
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error on the link
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bitfile is missing or unreadable
    #[error("cannot read bitfile {path}: {source}")]
    FileAccess {
        /// Path of the source file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Bitfile byte count does not fit the 4-byte size field
    #[error("bitfile of {0} bytes exceeds the 32-bit size field")]
    FileTooLarge(u64),

    /// No ack byte arrived within the read window
    #[error("no ack within {timeout:?} at step: {step}")]
    AckTimeout {
        /// Protocol step that went unacknowledged
        step: Step,
        /// Read window that elapsed
        timeout: Duration,
    },

    /// Target answered with a byte other than the ack
    #[error("expected ack (0xDD) at step {step}, target sent {got:#04X}")]
    AckMismatch {
        /// Protocol step that was rejected
        step: Step,
        /// Byte the target actually sent
        got: u8,
    },

    /// Header read response did not arrive in full within the read window
    #[error("header response for {slot} incomplete after {timeout:?} ({available} of {wanted} bytes)")]
    HeaderTimeout {
        /// Slot whose header was requested
        slot: Slot,
        /// Expected response length
        wanted: usize,
        /// Bytes that were buffered when the window closed
        available: usize,
        /// Read window that elapsed
        timeout: Duration,
    },

    /// Trailing checksum byte of a header response disagrees with the record
    #[error("header response for {slot} failed checksum: computed {computed:#04X}, got {found:#04X}")]
    HeaderChecksum {
        /// Slot whose header was read
        slot: Slot,
        /// Checksum computed over the 90 record bytes
        computed: u8,
        /// Trailing byte the target sent
        found: u8,
    },

    /// Protocol-level failure (invalid slot, bad frame, bad record)
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Result type for link operations
pub type Result<T> = std::result::Result<T, LinkError>;
