//! Port registration and dispatch
//!
//! This module provides a centralized registry for bus ports, with support
//! for feature-gated inclusion and dynamic help text generation.

use hbiflash_core::port::HbiPort;

/// Information about a port
pub struct PortInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all ports enabled at compile time
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_ports() -> Vec<PortInfo> {
    let mut ports = Vec::new();

    #[cfg(feature = "dummy")]
    ports.push(PortInfo {
        name: "dummy",
        aliases: &[],
        description: "In-memory Vproc emulator for testing",
    });

    #[cfg(feature = "linux-spi")]
    ports.push(PortInfo {
        name: "linux_spi",
        aliases: &["linux-spi", "spidev"],
        description: "Linux spidev interface (dev=/dev/spidevX.Y,spispeed=<kHz>,mode=<0-3>)",
    });

    ports
}

/// Generate help text listing all available ports
pub fn port_help() -> String {
    let ports = available_ports();

    if ports.is_empty() {
        return "No ports available (recompile with port features enabled)".to_string();
    }

    let mut help = String::from("Available ports:\n");
    for p in &ports {
        let aliases = if p.aliases.is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", p.aliases.join(", "))
        };
        help.push_str(&format!("  {:12} - {}{}\n", p.name, p.description, aliases));
    }
    help
}

/// Generate a short list of port names for CLI help
pub fn port_names_short() -> String {
    let names: Vec<&str> = available_ports().iter().map(|p| p.name).collect();
    names.join(", ")
}

/// Print the available ports
pub fn list_ports() {
    print!("{}", port_help());
}

/// Execute a function with the specified port
///
/// The port string can be just the name (e.g., "dummy") or include
/// parameters (e.g., "linux_spi:dev=/dev/spidev0.0,spispeed=4000").
#[allow(unused_variables)]
pub fn with_port<F>(spec: &str, f: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(&mut dyn HbiPort) -> Result<(), Box<dyn std::error::Error>>,
{
    let (name, options) = parse_port_string(spec);

    match name {
        #[cfg(feature = "dummy")]
        "dummy" => {
            let mut port = hbiflash_dummy::DummyVproc::new_default();
            f(&mut port)
        }

        #[cfg(feature = "linux-spi")]
        "linux_spi" | "linux-spi" | "spidev" => {
            use hbiflash_linux_spi::{parse_options, LinuxSpi};

            log::info!("Opening Linux SPI port...");

            let config = parse_options(&options)
                .map_err(|e| format!("Invalid linux_spi parameters: {}", e))?;

            let mut port = LinuxSpi::open(&config).map_err(|e| {
                format!(
                    "Failed to open Linux SPI device: {}\n\
                     Make sure the device exists and you have read/write permissions.\n\
                     You may need to: sudo usermod -aG spi $USER",
                    e
                )
            })?;

            f(&mut port)
        }

        _ => Err(unknown_port_error(name)),
    }
}

/// Parse a port string into name and options
///
/// Format: "name" or "name:option1=value1,option2=value2"
pub fn parse_port_string(s: &str) -> (&str, Vec<(&str, &str)>) {
    if let Some((name, opts)) = s.split_once(':') {
        let options: Vec<_> = opts
            .split(',')
            .filter_map(|opt| opt.split_once('='))
            .collect();
        (name, options)
    } else {
        (s, Vec::new())
    }
}

fn unknown_port_error(name: &str) -> Box<dyn std::error::Error> {
    let mut msg = format!("Unknown port: {}\n\n", name);
    msg.push_str(&port_help());
    msg.push_str("\nUse 'hbiflash list-ports' for more details");
    msg.into()
}
