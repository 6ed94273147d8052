//! Frame encoding and decoding
//!
//! A frame is `magic ‖ command ‖ length ‖ payload ‖ checksum` where the
//! length is a big-endian u16 and the checksum is the XOR of every byte
//! before it. Encoding and decoding are pure transformations; the transport
//! in `fpgacfg-serial` moves the resulting bytes.

use crate::error::{ProtocolError, Result};
use crate::protocol::MAGIC;

/// Bytes preceding the payload: magic (3) + command (1) + length (2)
pub const FRAME_HEADER_LEN: usize = 6;

/// A decoded protocol frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command opcode
    pub command: u8,
    /// Operation-specific payload
    pub payload: Vec<u8>,
}

/// XOR of all bytes in `data`
///
/// Also used to verify the trailing byte of a header read response, which
/// covers the 90 record bytes.
pub fn xor_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0, |acc, b| acc ^ b)
}

/// Encode a command and payload into a complete frame
///
/// The payload must fit the 16-bit length field. A full 256-byte page comes
/// out with `length = 0x0100`, shorter payloads as `0x00, count`.
pub fn encode(command: u8, payload: &[u8]) -> Result<Vec<u8>> {
    let len = u16::try_from(payload.len())
        .map_err(|_| ProtocolError::PayloadTooLarge(payload.len()))?;

    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + payload.len() + 1);
    frame.extend_from_slice(&MAGIC);
    frame.push(command);
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(payload);
    frame.push(xor_checksum(&frame));
    Ok(frame)
}

/// Decode a buffer holding exactly one frame
///
/// The buffer must be exactly header + payload + checksum long. The checksum
/// is recomputed over all but the last byte and compared to the trailing
/// byte; any disagreement fails the decode.
pub fn decode(buf: &[u8]) -> Result<Frame> {
    if buf.len() < FRAME_HEADER_LEN + 1 {
        return Err(ProtocolError::Truncated(buf.len()));
    }
    if buf[..3] != MAGIC {
        return Err(ProtocolError::BadMagic);
    }

    let command = buf[3];
    let announced = u16::from_be_bytes([buf[4], buf[5]]) as usize;
    let actual = buf.len() - FRAME_HEADER_LEN - 1;
    if announced != actual {
        return Err(ProtocolError::LengthMismatch { announced, actual });
    }

    let computed = xor_checksum(&buf[..buf.len() - 1]);
    let found = buf[buf.len() - 1];
    if computed != found {
        return Err(ProtocolError::ChecksumMismatch { computed, found });
    }

    Ok(Frame {
        command,
        payload: buf[FRAME_HEADER_LEN..buf.len() - 1].to_vec(),
    })
}
