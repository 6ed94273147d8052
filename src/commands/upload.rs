//! Upload command implementation

use std::path::Path;

use fpgacfg_core::Slot;
use fpgacfg_serial::UploadProgress;
use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporter using an indicatif progress bar
struct IndicatifProgress {
    bar: Option<ProgressBar>,
}

impl IndicatifProgress {
    fn new() -> Self {
        Self { bar: None }
    }
}

impl UploadProgress for IndicatifProgress {
    fn started(&mut self, total_bytes: u64) {
        let bar = ProgressBar::new(total_bytes);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        self.bar = Some(bar);
    }

    fn page_sent(&mut self, bytes_sent: u64) {
        if let Some(bar) = &self.bar {
            bar.set_position(bytes_sent);
        }
    }

    fn finished(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
    }
}

pub fn run(
    port: &str,
    slot: u8,
    bitfile: &Path,
    timeout_secs: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let slot = Slot::new(slot)?;
    let mut store = super::open_store(port, timeout_secs)?;

    let mut progress = IndicatifProgress::new();
    let sent = store.upload(slot, bitfile, &mut progress)?;

    println!("Uploaded {} bytes to {}", sent, slot);
    Ok(())
}
