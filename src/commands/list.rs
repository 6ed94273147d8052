//! List-ports command implementation

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let ports = fpgacfg_serial::list_ports()?;
    if ports.is_empty() {
        println!("No serial ports found");
    } else {
        println!("Available serial ports:");
        for port in ports {
            println!("  {}", port);
        }
    }
    Ok(())
}
