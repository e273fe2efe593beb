//! Grammar load command

use std::path::Path;

use hbiflash_core::device::VprocDevice;
use hbiflash_core::grammar::loader::load_grammar;
use hbiflash_core::port::HbiPort;

pub fn run(port: &mut dyn HbiPort, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let blob = std::fs::read(input)?;
    log::info!("Read {} byte grammar from {}", blob.len(), input.display());

    let mut dev = VprocDevice::new(port);
    load_grammar(&mut dev, &blob)?;

    println!("Grammar loaded to RAM ({} bytes)", blob.len());
    Ok(())
}
