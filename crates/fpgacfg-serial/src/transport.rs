//! Transport layer abstraction for the configuration link
//!
//! The protocol only needs three primitives from the physical connection:
//! a blocking write of a whole frame, a count of buffered receive bytes, and
//! an exact read of bytes already known to be buffered. Bounded waiting is
//! implemented on top of `bytes_available` by the sequencer.

use crate::error::{LinkError, Result};

/// Default baud rate of the configuration MCU
pub const DEFAULT_BAUD: u32 = 115_200;

/// Byte-stream transport the sequencer runs over
pub trait Transport {
    /// Blocking write of the full buffer
    fn write_all(&mut self, data: &[u8]) -> Result<()>;

    /// Number of received bytes buffered and ready to read
    fn bytes_available(&mut self) -> Result<usize>;

    /// Read exactly `buf.len()` bytes
    ///
    /// Callers check `bytes_available` first; the read itself must not be
    /// used to wait.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;
}

/// Serial port transport
pub struct SerialLink {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialLink {
    /// Open a serial port at the given baud rate (8 data bits, no parity,
    /// 1 stop bit, no flow control)
    pub fn open(device: &str, baud: u32) -> Result<Self> {
        use serialport::{DataBits, FlowControl, Parity, StopBits};
        use std::time::Duration;

        let port = serialport::new(device, baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_secs(10))
            .open()
            .map_err(|source| LinkError::PortOpen {
                port: device.to_string(),
                source,
            })?;

        log::info!("Opened serial port {} at {} baud", device, baud);

        Ok(Self { port })
    }
}

impl Transport for SerialLink {
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        use std::io::Write;
        self.port.write_all(data)?;
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<usize> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        use std::io::Read;
        self.port.read_exact(buf)?;
        Ok(())
    }
}

/// Names of the serial ports available on this system
pub fn list_ports() -> Result<Vec<String>> {
    let ports = serialport::available_ports()?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
