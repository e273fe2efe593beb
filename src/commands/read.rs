//! Register read command

use hbiflash_core::device::VprocDevice;
use hbiflash_core::port::HbiPort;

pub fn run(
    port: &mut dyn HbiPort,
    address: u16,
    count: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut dev = VprocDevice::new(port);

    let mut words = vec![0u16; count];
    dev.read_words(address, &mut words)?;

    for (i, word) in words.iter().enumerate() {
        println!("0x{:04X}: 0x{:04X}", address + (i as u16) * 2, word);
    }
    Ok(())
}
