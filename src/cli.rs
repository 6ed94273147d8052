//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fpgacfg")]
#[command(author, version, about = "FPGA configuration store programmer", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Read timeout in seconds for acks and header responses
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a bitfile into a flash slot
    Upload {
        /// Serial port to use (e.g. /dev/ttyUSB0)
        #[arg(short, long)]
        port: String,

        /// Slot the bitfile should be stored in (1-5)
        #[arg(short = 'n', long)]
        slot: u8,

        /// Path to the bitfile
        #[arg(short, long)]
        bitfile: PathBuf,
    },

    /// Start the configuration stored in a slot
    Start {
        /// Serial port to use
        #[arg(short, long)]
        port: String,

        /// Slot to boot (1-5)
        #[arg(short = 'n', long)]
        slot: u8,
    },

    /// Read the bitfile headers stored in flash
    Headers {
        /// Serial port to use
        #[arg(short, long)]
        port: String,
    },

    /// List the available serial ports
    ListPorts,
}
