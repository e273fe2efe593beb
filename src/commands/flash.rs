//! Flash and boot commands

use hbiflash_core::device::VprocDevice;
use hbiflash_core::image::flash;
use hbiflash_core::port::HbiPort;

pub fn run_start(port: &mut dyn HbiPort) -> Result<(), Box<dyn std::error::Error>> {
    let mut dev = VprocDevice::new(port);
    flash::start_firmware(&mut dev)?;
    println!("Firmware started");
    Ok(())
}

pub fn run_save(port: &mut dyn HbiPort) -> Result<(), Box<dyn std::error::Error>> {
    let mut dev = VprocDevice::new(port);
    let count = flash::save_to_flash(&mut dev)?;
    println!("Image saved, {} image(s) on flash", count);
    Ok(())
}

pub fn run_erase(port: &mut dyn HbiPort) -> Result<(), Box<dyn std::error::Error>> {
    let mut dev = VprocDevice::new(port);
    flash::erase_flash(&mut dev)?;
    println!("Flash erased");
    Ok(())
}
