//! Headers command implementation

use fpgacfg_core::metadata::SlotHeader;

pub fn run(port: &str, timeout_secs: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = super::open_store(port, timeout_secs)?;

    println!("-------------------- Format --------------------");
    println!("Date and time: YY/MM/DD - HH:MM:SS");

    for (slot, header) in store.read_headers()? {
        println!("---------------- Bitfile {} ----------------", slot);
        match header {
            SlotHeader::Erased => println!("Slot is ERASED"),
            SlotHeader::Written(h) => {
                println!("Filename:      {}", h.name);
                println!("Size:          {} bytes", h.size);
                println!("Date and time: {}", h.timestamp);
                println!("MD5 checksum:  {}", h.md5_hex());
            }
        }
    }
    println!("------------------------------------------------");
    Ok(())
}
