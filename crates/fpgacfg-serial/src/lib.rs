//! fpgacfg-serial - Serial link and command sequencer
//!
//! This crate drives the configuration store of the FPGA board over a
//! serial port: it owns the blocking byte-stream transport, the strict
//! request/ack discipline, and the fixed multi-frame sequences for upload,
//! header read-back, and boot-trigger. All frame and record layout knowledge
//! lives in `fpgacfg-core`.
//!
//! # Example
//!
//! ```no_run
//! use fpgacfg_core::Slot;
//! use fpgacfg_serial::{ConfigStore, NoProgress, SerialLink};
//!
//! let link = SerialLink::open("/dev/ttyUSB0", fpgacfg_serial::DEFAULT_BAUD)?;
//! let mut store = ConfigStore::new(link);
//! store.upload(Slot::new(2)?, "top.bit".as_ref(), &mut NoProgress)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod device;
pub mod error;
pub mod progress;
pub mod transport;

pub use device::{ConfigStore, LinkOptions, Step};
pub use error::{LinkError, Result};
pub use progress::{NoProgress, UploadProgress};
pub use transport::{list_ports, SerialLink, Transport, DEFAULT_BAUD};
