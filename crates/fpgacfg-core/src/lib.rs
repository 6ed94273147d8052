//! fpgacfg-core - Wire protocol for the FPGA configuration store
//!
//! This crate holds everything that is pure protocol knowledge: the frame
//! format with its XOR checksum, the command opcodes, slot addressing in
//! target flash, and the 90-byte bitfile metadata record. It performs no
//! I/O; the serial side lives in `fpgacfg-serial`.
//!
//! # Protocol Overview
//!
//! Every frame on the wire is
//! `0xAA 0xBB 0xCC <command:1> <length:2 BE> <payload:length> <checksum:1>`
//! where the checksum is the XOR of all preceding bytes. The target answers
//! each accepted frame with the single ack byte `0xDD`.

pub mod error;
pub mod frame;
pub mod metadata;
pub mod protocol;
pub mod slot;

pub use error::{ProtocolError, Result};
pub use frame::Frame;
pub use metadata::{BitfileHeader, SlotHeader, Timestamp};
pub use slot::Slot;
