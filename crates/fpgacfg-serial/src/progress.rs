//! Progress reporting for uploads
//!
//! The library never prints; consumers implement this trait to render a
//! progress bar or stay silent.

/// Callback for progress reporting during an upload
pub trait UploadProgress {
    /// Called once before the first data page, with the total byte count
    fn started(&mut self, total_bytes: u64);

    /// Called after each acknowledged data page
    fn page_sent(&mut self, bytes_sent: u64);

    /// Called once after the final page was acknowledged
    fn finished(&mut self);
}

/// A no-op progress reporter
pub struct NoProgress;

impl UploadProgress for NoProgress {
    fn started(&mut self, _total_bytes: u64) {}
    fn page_sent(&mut self, _bytes_sent: u64) {}
    fn finished(&mut self) {}
}
