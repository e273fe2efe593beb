//! Image load command

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

use hbiflash_core::device::VprocDevice;
use hbiflash_core::image::flash;
use hbiflash_core::image::loader::{ImageLoader, SCRATCH_LEN};
use hbiflash_core::port::HbiPort;

pub fn run(
    port: &mut dyn HbiPort,
    input: &Path,
    save: bool,
    start: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let image = std::fs::read(input)?;
    log::info!("Read {} bytes from {}", image.len(), input.display());

    let mut dev = VprocDevice::new(port);
    let mut scratch = [0u8; SCRATCH_LEN];
    let mut loader = ImageLoader::new(&mut scratch);

    let pb = ProgressBar::new(image.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} Loading",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let header = loader.load_with(&mut dev, &image, |sent, total| {
        pb.set_length(total as u64);
        pb.set_position(sent as u64);
    })?;
    pb.finish_with_message("done");

    println!(
        "Loaded {:?} image (device code {}, {} body bytes)",
        header.image_type, header.device_code, header.body_len
    );

    if save {
        let count = flash::save_to_flash(&mut dev)?;
        println!("Image saved, {} image(s) on flash", count);
    }
    if start {
        flash::start_firmware(&mut dev)?;
        println!("Firmware started");
    }
    Ok(())
}
