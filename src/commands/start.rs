//! Start-configuration command implementation

use fpgacfg_core::Slot;

pub fn run(port: &str, slot: u8, timeout_secs: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let slot = Slot::new(slot)?;
    let mut store = super::open_store(port, timeout_secs)?;

    store.start_config(slot)?;
    println!("Configuration of {} started", slot);
    Ok(())
}
