//! fpgacfg - program and inspect the FPGA bitstream configuration store
//!
//! Talks to the configuration MCU over a serial port: uploads bitfiles into
//! numbered flash slots, reads back the stored metadata records, and
//! triggers configuration from a slot. All protocol logic lives in the
//! `fpgacfg-core` and `fpgacfg-serial` crates; this binary only parses
//! arguments, renders output, and maps failures to a nonzero exit code.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match cli.command {
        Commands::Upload { port, slot, bitfile } => {
            commands::upload::run(&port, slot, &bitfile, cli.timeout)
        }
        Commands::Start { port, slot } => commands::start::run(&port, slot, cli.timeout),
        Commands::Headers { port } => commands::headers::run(&port, cli.timeout),
        Commands::ListPorts => commands::list::run(),
    }
}
