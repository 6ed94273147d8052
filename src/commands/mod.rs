//! CLI command implementations
//!
//! Each module translates one subcommand into calls on the typed operations
//! of `fpgacfg-serial` and renders the result; no protocol logic lives here.

pub mod headers;
pub mod list;
pub mod start;
pub mod upload;

use fpgacfg_serial::{ConfigStore, LinkOptions, SerialLink, DEFAULT_BAUD};
use std::time::Duration;

/// Open the port and wrap it with the requested read timeout
fn open_store(
    port: &str,
    timeout_secs: Option<u64>,
) -> Result<ConfigStore<SerialLink>, Box<dyn std::error::Error>> {
    let link = SerialLink::open(port, DEFAULT_BAUD)?;
    let mut options = LinkOptions::default();
    if let Some(secs) = timeout_secs {
        options.read_timeout = Duration::from_secs(secs);
    }
    Ok(ConfigStore::with_options(link, options))
}
