//! Register write command

use hbiflash_core::device::VprocDevice;
use hbiflash_core::port::HbiPort;

pub fn run(
    port: &mut dyn HbiPort,
    address: u16,
    values: &[u16],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut dev = VprocDevice::new(port);
    dev.write_words(address, values)?;

    println!(
        "Wrote {} word(s) starting at 0x{:04X}",
        values.len(),
        address
    );
    Ok(())
}
