//! Configuration store device
//!
//! `ConfigStore` drives the target's configuration MCU over a transport:
//! one link, one outstanding frame, every step blocks until its ack or a
//! bounded timeout. There is no retry and no rollback; a failure anywhere in
//! an upload leaves the slot half-written and the whole operation must be
//! restarted by the caller.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{Datelike, Timelike};
use md5::{Digest, Md5};

use fpgacfg_core::metadata::{self, SlotHeader, Timestamp};
use fpgacfg_core::protocol::{
    header_read_request, ACK, CMD_ERASE_SLOT, CMD_READ_HEADER, CMD_SET_ADDRESS, CMD_START_CONFIG,
    CMD_WRITE_DATA, HEADER_LEN, PAGE_SIZE,
};
use fpgacfg_core::{frame, Slot};

use crate::error::{LinkError, Result};
use crate::progress::UploadProgress;
use crate::transport::Transport;

/// Protocol step a frame belongs to
///
/// Carried in errors so a failed sequence can be diagnosed: the write-data
/// opcode is overloaded and only the position in the sequence tells a
/// metadata field from a data page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Erase the target slot
    Erase,
    /// Point the write pointer at the metadata page
    SetMetadataAddress,
    /// Write the 4-byte bitfile size
    WriteSize,
    /// Write the 64-byte bitfile name
    WriteName,
    /// Write the 6-byte modification timestamp
    WriteTimestamp,
    /// Write the 16-byte MD5 digest
    WriteMd5,
    /// Point the write pointer at the data region
    SetDataAddress,
    /// Write one data page (zero-based index)
    WritePage(usize),
    /// Trigger configuration from a slot
    StartConfig,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Erase => write!(f, "erase slot"),
            Step::SetMetadataAddress => write!(f, "set metadata address"),
            Step::WriteSize => write!(f, "write bitfile size"),
            Step::WriteName => write!(f, "write bitfile name"),
            Step::WriteTimestamp => write!(f, "write timestamp"),
            Step::WriteMd5 => write!(f, "write MD5 digest"),
            Step::SetDataAddress => write!(f, "set data address"),
            Step::WritePage(i) => write!(f, "write data page {}", i),
            Step::StartConfig => write!(f, "start configuration"),
        }
    }
}

/// Timing configuration for the link
///
/// Threaded in explicitly at construction; there is no global state.
#[derive(Debug, Clone, Copy)]
pub struct LinkOptions {
    /// How long to wait for an ack or a header response
    pub read_timeout: Duration,
    /// How often to poll the receive buffer while waiting
    pub poll_interval: Duration,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Connection to the configuration store on the target
pub struct ConfigStore<T: Transport> {
    link: T,
    options: LinkOptions,
}

impl<T: Transport> ConfigStore<T> {
    /// Wrap a transport with default timing
    pub fn new(link: T) -> Self {
        Self::with_options(link, LinkOptions::default())
    }

    /// Wrap a transport with explicit timing
    pub fn with_options(link: T, options: LinkOptions) -> Self {
        Self { link, options }
    }

    /// Upload a bitfile into a slot
    ///
    /// Runs the fixed sequence: erase, metadata address, size, name,
    /// timestamp, MD5, data address, then the bitfile in 256-byte pages with
    /// an ack after every page. Returns the number of data bytes sent.
    pub fn upload<P: UploadProgress>(
        &mut self,
        slot: Slot,
        path: &Path,
        progress: &mut P,
    ) -> Result<u64> {
        let file_meta = std::fs::metadata(path).map_err(|source| LinkError::FileAccess {
            path: path.into(),
            source,
        })?;
        let total = file_meta.len();
        let size = u32::try_from(total).map_err(|_| LinkError::FileTooLarge(total))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let timestamp = modification_timestamp(path, &file_meta)?;
        let digest = md5_of_file(path)?;

        log::info!(
            "Uploading {} ({} bytes) to {} at {:#010X}",
            name,
            total,
            slot,
            slot.start_address()
        );

        self.send_expect_ack(CMD_ERASE_SLOT, &[slot.number()], Step::Erase)?;
        self.send_expect_ack(
            CMD_SET_ADDRESS,
            &slot.start_address().to_be_bytes(),
            Step::SetMetadataAddress,
        )?;
        self.send_expect_ack(CMD_WRITE_DATA, &size.to_be_bytes(), Step::WriteSize)?;
        self.send_expect_ack(CMD_WRITE_DATA, &metadata::pad_name(&name), Step::WriteName)?;
        self.send_expect_ack(CMD_WRITE_DATA, &timestamp.to_bytes(), Step::WriteTimestamp)?;
        self.send_expect_ack(CMD_WRITE_DATA, &digest, Step::WriteMd5)?;
        self.send_expect_ack(
            CMD_SET_ADDRESS,
            &slot.data_address().to_be_bytes(),
            Step::SetDataAddress,
        )?;

        progress.started(total);

        let mut file = File::open(path).map_err(|source| LinkError::FileAccess {
            path: path.into(),
            source,
        })?;
        let mut page = [0u8; PAGE_SIZE];
        let mut sent: u64 = 0;
        let mut index = 0;
        loop {
            let filled = read_page(&mut file, &mut page)?;
            if filled == 0 {
                break;
            }
            self.send_expect_ack(CMD_WRITE_DATA, &page[..filled], Step::WritePage(index))?;
            sent += filled as u64;
            index += 1;
            progress.page_sent(sent);
            if filled < PAGE_SIZE {
                break;
            }
        }

        progress.finished();
        log::info!("Done sending {} bytes of data in {} pages", sent, index);
        Ok(sent)
    }

    /// Read back the metadata records of all slots, in slot order
    pub fn read_headers(&mut self) -> Result<Vec<(Slot, SlotHeader)>> {
        Slot::all()
            .map(|slot| Ok((slot, self.read_header(slot)?)))
            .collect()
    }

    /// Read back the metadata record of one slot
    ///
    /// The response is 90 record bytes plus one trailing XOR checksum byte,
    /// which is verified before the record is parsed.
    pub fn read_header(&mut self, slot: Slot) -> Result<SlotHeader> {
        let request = frame::encode(CMD_READ_HEADER, &header_read_request(slot.header_offset()))?;
        log::debug!("Requesting header of {}", slot);
        self.link.write_all(&request)?;

        let wanted = HEADER_LEN + 1;
        let available = self.wait_for_bytes(wanted)?;
        if available < wanted {
            return Err(LinkError::HeaderTimeout {
                slot,
                wanted,
                available,
                timeout: self.options.read_timeout,
            });
        }

        let mut response = [0u8; HEADER_LEN + 1];
        self.link.read_exact(&mut response)?;

        let computed = frame::xor_checksum(&response[..HEADER_LEN]);
        let found = response[HEADER_LEN];
        if computed != found {
            return Err(LinkError::HeaderChecksum {
                slot,
                computed,
                found,
            });
        }

        Ok(metadata::parse(&response[..HEADER_LEN])?)
    }

    /// Trigger the target to boot the configuration stored in a slot
    pub fn start_config(&mut self, slot: Slot) -> Result<()> {
        log::info!("Starting configuration of {}", slot);
        self.send_expect_ack(CMD_START_CONFIG, &[slot.number()], Step::StartConfig)
    }

    /// Encode and send one frame, then block for its ack
    fn send_expect_ack(&mut self, command: u8, payload: &[u8], step: Step) -> Result<()> {
        let bytes = frame::encode(command, payload)?;
        log::debug!(
            "{}: sending {}-byte frame (command {:#04X})",
            step,
            bytes.len(),
            command
        );
        self.link.write_all(&bytes)?;

        if self.wait_for_bytes(1)? < 1 {
            return Err(LinkError::AckTimeout {
                step,
                timeout: self.options.read_timeout,
            });
        }
        let mut response = [0u8; 1];
        self.link.read_exact(&mut response)?;
        if response[0] != ACK {
            return Err(LinkError::AckMismatch {
                step,
                got: response[0],
            });
        }
        Ok(())
    }

    /// Poll the receive buffer until `wanted` bytes are ready or the read
    /// window closes; returns how many bytes were available
    fn wait_for_bytes(&mut self, wanted: usize) -> Result<usize> {
        let deadline = Instant::now() + self.options.read_timeout;
        loop {
            let available = self.link.bytes_available()?;
            if available >= wanted || Instant::now() >= deadline {
                return Ok(available);
            }
            thread::sleep(self.options.poll_interval);
        }
    }
}

/// Decompose the file's modification time into the 6 record bytes
fn modification_timestamp(path: &Path, meta: &std::fs::Metadata) -> Result<Timestamp> {
    let modified = meta.modified().map_err(|source| LinkError::FileAccess {
        path: path.into(),
        source,
    })?;
    let local: chrono::DateTime<chrono::Local> = modified.into();
    Ok(Timestamp {
        year: (local.year() - 2000).clamp(0, 255) as u8,
        month: local.month() as u8,
        day: local.day() as u8,
        hour: local.hour() as u8,
        minute: local.minute() as u8,
        second: local.second() as u8,
    })
}

/// MD5 digest of the file contents, streamed in 8 KiB chunks
fn md5_of_file(path: &Path) -> Result<[u8; 16]> {
    let mut file = File::open(path).map_err(|source| LinkError::FileAccess {
        path: path.into(),
        source,
    })?;
    let mut hasher = Md5::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().into())
}

/// Fill the page buffer from the file; returns the byte count, short only
/// at end of file
fn read_page(file: &mut File, page: &mut [u8; PAGE_SIZE]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < PAGE_SIZE {
        let n = file.read(&mut page[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use fpgacfg_core::frame::{Frame, FRAME_HEADER_LEN};
    use fpgacfg_core::metadata::ERASED_SIZE;
    use std::collections::VecDeque;
    use std::io::Write;

    /// Scripted in-memory transport: everything written lands in `tx`,
    /// reads are served from the preloaded `rx` bytes.
    struct MockTransport {
        tx: Vec<u8>,
        rx: VecDeque<u8>,
    }

    impl MockTransport {
        fn new() -> Self {
            Self {
                tx: Vec::new(),
                rx: VecDeque::new(),
            }
        }

        fn with_acks(count: usize) -> Self {
            let mut t = Self::new();
            t.rx.extend(std::iter::repeat(ACK).take(count));
            t
        }

        fn push_response(&mut self, bytes: &[u8]) {
            self.rx.extend(bytes);
        }
    }

    impl Transport for MockTransport {
        fn write_all(&mut self, data: &[u8]) -> Result<()> {
            self.tx.extend_from_slice(data);
            Ok(())
        }

        fn bytes_available(&mut self) -> Result<usize> {
            Ok(self.rx.len())
        }

        fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
            for b in buf.iter_mut() {
                *b = self.rx.pop_front().ok_or_else(|| {
                    LinkError::Io(std::io::Error::from(std::io::ErrorKind::UnexpectedEof))
                })?;
            }
            Ok(())
        }
    }

    fn fast_options() -> LinkOptions {
        LinkOptions {
            read_timeout: Duration::ZERO,
            poll_interval: Duration::ZERO,
        }
    }

    /// Split a captured byte stream back into decoded frames
    fn split_frames(mut buf: &[u8]) -> Vec<Frame> {
        let mut frames = Vec::new();
        while !buf.is_empty() {
            assert!(buf.len() >= FRAME_HEADER_LEN + 1, "trailing garbage in stream");
            let len = u16::from_be_bytes([buf[4], buf[5]]) as usize;
            let total = FRAME_HEADER_LEN + len + 1;
            frames.push(frame::decode(&buf[..total]).expect("invalid frame in stream"));
            buf = &buf[total..];
        }
        frames
    }

    fn bitfile(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn upload_sends_the_exact_command_sequence() {
        let content: Vec<u8> = (0..600u32).map(|i| (i % 251) as u8).collect();
        let file = bitfile(&content);
        let slot = Slot::new(1).unwrap();

        // 7 setup/metadata steps + 3 data pages
        let mut store = ConfigStore::new(MockTransport::with_acks(10));
        let sent = store.upload(slot, file.path(), &mut NoProgress).unwrap();
        assert_eq!(sent, 600);

        let frames = split_frames(&store.link.tx);
        assert_eq!(frames.len(), 10);

        let commands: Vec<u8> = frames.iter().map(|f| f.command).collect();
        assert_eq!(
            commands,
            vec![0x22, 0x10, 0x30, 0x30, 0x30, 0x30, 0x10, 0x30, 0x30, 0x30]
        );

        // Erase slot, then metadata address
        assert_eq!(frames[0].payload, vec![1]);
        assert_eq!(frames[1].payload, 393_216u32.to_be_bytes().to_vec());

        // Size, name, timestamp, digest
        assert_eq!(frames[2].payload, 600u32.to_be_bytes().to_vec());
        let name = file.path().file_name().unwrap().to_string_lossy();
        assert_eq!(frames[3].payload, metadata::pad_name(&name).to_vec());
        assert_eq!(frames[4].payload.len(), 6);
        let digest: [u8; 16] = Md5::digest(&content).into();
        assert_eq!(frames[5].payload, digest.to_vec());

        // Data address is one page past the start
        assert_eq!(frames[6].payload, 393_472u32.to_be_bytes().to_vec());

        // Two full pages and an 88-byte remainder
        assert_eq!(frames[7].payload, content[..256].to_vec());
        assert_eq!(frames[8].payload, content[256..512].to_vec());
        assert_eq!(frames[9].payload, content[512..].to_vec());
        assert_eq!(frames[9].payload.len(), 88);
    }

    #[test]
    fn data_frames_use_page_length_encoding() {
        let content = vec![0x5A; 600];
        let file = bitfile(&content);
        let mut store = ConfigStore::new(MockTransport::with_acks(10));
        store
            .upload(Slot::new(1).unwrap(), file.path(), &mut NoProgress)
            .unwrap();

        // Raw length fields of the three data frames: 0x0100, 0x0100, 0x0058
        let frames = split_frames(&store.link.tx);
        let data_lens: Vec<usize> = frames[7..].iter().map(|f| f.payload.len()).collect();
        assert_eq!(data_lens, vec![256, 256, 88]);
    }

    #[test]
    fn page_aligned_file_sends_only_full_pages() {
        let content = vec![0xFF; 512];
        let file = bitfile(&content);
        let mut store = ConfigStore::new(MockTransport::with_acks(9));
        let sent = store
            .upload(Slot::new(4).unwrap(), file.path(), &mut NoProgress)
            .unwrap();
        assert_eq!(sent, 512);

        let frames = split_frames(&store.link.tx);
        assert_eq!(frames.len(), 9);
        assert_eq!(frames[7].payload.len(), 256);
        assert_eq!(frames[8].payload.len(), 256);
    }

    #[test]
    fn missing_ack_aborts_before_any_further_write() {
        let file = bitfile(&[0u8; 600]);
        // Only the erase gets acked, then the line goes dead
        let mut store =
            ConfigStore::with_options(MockTransport::with_acks(1), fast_options());
        let err = store
            .upload(Slot::new(2).unwrap(), file.path(), &mut NoProgress)
            .unwrap_err();

        assert!(matches!(
            err,
            LinkError::AckTimeout {
                step: Step::SetMetadataAddress,
                ..
            }
        ));
        // Erase and set-address were written, nothing after the failure
        assert_eq!(split_frames(&store.link.tx).len(), 2);
    }

    #[test]
    fn non_ack_byte_aborts_with_the_failing_step() {
        let file = bitfile(&[0u8; 16]);
        let mut store =
            ConfigStore::with_options(MockTransport::with_acks(1), fast_options());
        store.link.push_response(&[0x00]);

        let err = store
            .upload(Slot::new(2).unwrap(), file.path(), &mut NoProgress)
            .unwrap_err();
        assert!(matches!(
            err,
            LinkError::AckMismatch {
                step: Step::SetMetadataAddress,
                got: 0x00
            }
        ));
        assert_eq!(split_frames(&store.link.tx).len(), 2);
    }

    #[test]
    fn invalid_slot_is_rejected_before_any_io() {
        assert!(matches!(
            Slot::new(6),
            Err(fpgacfg_core::ProtocolError::InvalidSlot(6))
        ));
    }

    #[test]
    fn missing_bitfile_fails_without_touching_the_link() {
        let mut store = ConfigStore::with_options(MockTransport::new(), fast_options());
        let err = store
            .upload(
                Slot::new(1).unwrap(),
                Path::new("/no/such/bitfile.bit"),
                &mut NoProgress,
            )
            .unwrap_err();
        assert!(matches!(err, LinkError::FileAccess { .. }));
        assert!(store.link.tx.is_empty());
    }

    fn header_response(record: &[u8; HEADER_LEN]) -> Vec<u8> {
        let mut response = record.to_vec();
        response.push(frame::xor_checksum(record));
        response
    }

    fn written_record(size: u32, name: &str) -> [u8; HEADER_LEN] {
        let mut record = [0u8; HEADER_LEN];
        record[..4].copy_from_slice(&size.to_be_bytes());
        record[4..68].copy_from_slice(&metadata::pad_name(name));
        record[68..74].copy_from_slice(&[15, 9, 8, 12, 0, 0]);
        record[74..].copy_from_slice(&[0xCD; 16]);
        record
    }

    #[test]
    fn read_header_sends_the_fixed_request_and_parses_the_record() {
        let mut transport = MockTransport::new();
        transport.push_response(&header_response(&written_record(600, "top.bit")));
        let mut store = ConfigStore::new(transport);

        let slot = Slot::new(2).unwrap();
        let header = store.read_header(slot).unwrap();

        let frames = split_frames(&store.link.tx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].command, CMD_READ_HEADER);
        assert_eq!(frames[0].payload, vec![0x00, 12, 0x00, 0x00, 0x5A]);

        match header {
            SlotHeader::Written(h) => {
                assert_eq!(h.size, 600);
                assert_eq!(h.name, "top.bit");
                assert_eq!(h.timestamp.to_string(), "15/09/08 - 12:00:00");
            }
            SlotHeader::Erased => panic!("slot reported erased"),
        }
    }

    #[test]
    fn erased_sentinel_wins_over_stale_record_bytes() {
        let mut record = written_record(0, "stale.bit");
        record[..4].copy_from_slice(&ERASED_SIZE.to_be_bytes());
        let mut transport = MockTransport::new();
        transport.push_response(&header_response(&record));

        let mut store = ConfigStore::new(transport);
        let header = store.read_header(Slot::new(1).unwrap()).unwrap();
        assert_eq!(header, SlotHeader::Erased);
    }

    #[test]
    fn corrupted_header_response_fails_checksum_verification() {
        let mut response = header_response(&written_record(600, "top.bit"));
        response[10] ^= 0x01;
        let mut transport = MockTransport::new();
        transport.push_response(&response);

        let mut store = ConfigStore::with_options(transport, fast_options());
        let err = store.read_header(Slot::new(1).unwrap()).unwrap_err();
        assert!(matches!(err, LinkError::HeaderChecksum { .. }));
    }

    #[test]
    fn short_header_response_times_out() {
        let mut transport = MockTransport::new();
        transport.push_response(&[0u8; 40]);
        let mut store = ConfigStore::with_options(transport, fast_options());

        let err = store.read_header(Slot::new(3).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            LinkError::HeaderTimeout {
                wanted: 91,
                available: 40,
                ..
            }
        ));
    }

    #[test]
    fn read_headers_walks_all_five_slots_in_order() {
        let mut transport = MockTransport::new();
        for slot in 1..=5u32 {
            let record = if slot % 2 == 0 {
                let mut r = [0xFFu8; HEADER_LEN];
                r[..4].copy_from_slice(&ERASED_SIZE.to_be_bytes());
                r
            } else {
                written_record(slot * 1000, &format!("design{}.bit", slot))
            };
            transport.push_response(&header_response(&record));
        }

        let mut store = ConfigStore::new(transport);
        let headers = store.read_headers().unwrap();
        assert_eq!(headers.len(), 5);
        for (i, (slot, header)) in headers.iter().enumerate() {
            assert_eq!(slot.number() as usize, i + 1);
            if slot.number() % 2 == 0 {
                assert_eq!(*header, SlotHeader::Erased);
            } else {
                assert!(matches!(header, SlotHeader::Written(_)));
            }
        }
    }

    #[test]
    fn start_config_sends_the_known_frame_bytes() {
        let mut store = ConfigStore::new(MockTransport::with_acks(1));
        store.start_config(Slot::new(2).unwrap()).unwrap();
        assert_eq!(
            store.link.tx,
            vec![0xAA, 0xBB, 0xCC, 0x50, 0x00, 0x01, 0x02, 0x8E]
        );
    }

    #[test]
    fn start_config_reports_nak() {
        let mut store = ConfigStore::with_options(MockTransport::new(), fast_options());
        store.link.push_response(&[0x15]);
        let err = store.start_config(Slot::new(5).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            LinkError::AckMismatch {
                step: Step::StartConfig,
                got: 0x15
            }
        ));
    }
}
