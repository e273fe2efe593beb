//! CLI argument parsing

use crate::ports;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u16
fn parse_hex_u16(s: &str) -> Result<u16, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u16>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Generate dynamic help text for the port argument
fn port_help() -> String {
    format!("Port to use [available: {}]", ports::port_names_short())
}

#[derive(Parser)]
#[command(name = "hbiflash")]
#[command(author, version, about = "Vproc voice-processor programmer", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read device registers
    Read {
        /// Port to use
        #[arg(short, long, help = port_help())]
        port: String,

        /// Register address (hex, e.g. 0x0028)
        #[arg(short, long, value_parser = parse_hex_u16)]
        address: u16,

        /// Number of 16-bit words to read
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },

    /// Write device registers
    Write {
        /// Port to use
        #[arg(short, long, help = port_help())]
        port: String,

        /// Register address (hex, e.g. 0x000E)
        #[arg(short, long, value_parser = parse_hex_u16)]
        address: u16,

        /// Word values to write (hex, comma-separated)
        #[arg(short = 'V', long, value_parser = parse_hex_u16, num_args = 1.., value_delimiter = ',')]
        values: Vec<u16>,
    },

    /// Load a compiled firmware or configuration image into the device
    Load {
        /// Port to use
        #[arg(short, long, help = port_help())]
        port: String,

        /// Input image path (compiled with `convert`)
        #[arg(short, long)]
        input: PathBuf,

        /// Save firmware and configuration to flash after loading
        #[arg(long)]
        save: bool,

        /// Start the firmware after loading
        #[arg(long)]
        start: bool,
    },

    /// Start the firmware loaded in device RAM
    Start {
        /// Port to use
        #[arg(short, long, help = port_help())]
        port: String,
    },

    /// Save the loaded firmware and configuration to flash
    Save {
        /// Port to use
        #[arg(short, long, help = port_help())]
        port: String,
    },

    /// Erase all firmware and configuration from flash
    Erase {
        /// Port to use
        #[arg(short, long, help = port_help())]
        port: String,
    },

    /// Load a grammar blob into the ASR segment window
    Grammar {
        /// Port to use
        #[arg(short, long, help = port_help())]
        port: String,

        /// Grammar blob path (built with `pack-grammar`)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Compile firmware (.s3) or configuration (.cr2) source into an image
    Convert {
        /// Input source path; the extension selects the encoder
        #[arg(short, long)]
        input: PathBuf,

        /// Output image path
        #[arg(short, long)]
        output: PathBuf,

        /// Block size in 16-bit words (firmware: 16*2^n, config: 2^n)
        #[arg(short, long)]
        block_size: Option<u16>,

        /// Device/operation code, e.g. 38040 for a zl38040 image
        #[arg(short = 'f', long, default_value = "0")]
        device_code: u16,
    },

    /// Pack acoustic models into a grammar blob
    PackGrammar {
        /// Trigger acoustic model (*.bin)
        #[arg(short, long)]
        trigger: Option<PathBuf>,

        /// Command acoustic model (*.bin)
        #[arg(short, long)]
        command: Option<PathBuf>,

        /// Output blob path
        #[arg(short, long)]
        output: PathBuf,

        /// Grammar description (truncated to 32 bytes)
        #[arg(short, long, default_value = "")]
        description: String,

        /// Grammar format version
        #[arg(long, default_value = "1")]
        version: u32,
    },

    /// List available ports
    ListPorts,
}
