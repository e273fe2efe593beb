//! Compiled images streamed end-to-end into the emulated device
//!
//! The compiler and the on-line frame encoder are independent
//! implementations of the same wire contract; these tests pin them against
//! each other through the emulator's wire-format interpreter.

use hbiflash_core::convert::{compile_config, compile_firmware};
use hbiflash_core::device::VprocDevice;
use hbiflash_core::error::Error;
use hbiflash_core::image::flash;
use hbiflash_core::image::loader::{ImageLoader, LoadState, SCRATCH_LEN};
use hbiflash_core::image::{ImageHeader, ImageType};
use hbiflash_core::regmap;
use hbiflash_dummy::{DummyConfig, DummyVproc};

/// Build an S3 data record line (checksums are not verified)
fn s3(address: u32, data: &[u8]) -> String {
    let mut line = format!("S3{:02X}{:08X}", data.len() + 5, address);
    for b in data {
        line.push_str(&format!("{:02X}", b));
    }
    line.push_str("00");
    line
}

fn s7(entry: u32) -> String {
    format!("S705{:08X}00", entry)
}

#[test]
fn firmware_image_reconstructs_the_memory_image() {
    let data: Vec<u8> = (0u8..96).collect();
    let source = format!(
        "{}\n{}\n{}\n{}\n",
        s3(0x0001_0000, &data[..32]),
        s3(0x0001_0020, &data[32..64]),
        s3(0x0002_0000, &data[64..]),
        s7(0x0001_0000),
    );
    let image = compile_firmware(&source, 16, 38040).unwrap();

    let mut port = DummyVproc::new_default();
    assert!(port.app_running());

    let mut dev = VprocDevice::new(&mut port);
    let mut scratch = [0u8; SCRATCH_LEN];
    let mut loader = ImageLoader::new(&mut scratch);
    let header = loader.load(&mut dev, &image).unwrap();

    assert_eq!(header.image_type, ImageType::Firmware);
    assert_eq!(loader.state(), LoadState::Done);
    drop(dev);

    // the load dropped the device into boot mode
    assert!(!port.app_running());
    // both runs landed at their source addresses
    assert_eq!(port.ext_mem(0x0001_0000, 64), &data[..64]);
    assert_eq!(port.ext_mem(0x0002_0000, 32), &data[64..]);
    // the termination record programmed the exec address
    assert_eq!(port.reg_u32(regmap::FWR_EXEC), 0x0001_0000);
}

#[test]
fn config_image_lands_register_values() {
    let source = "\
; synthetic config record
0x0300, 0x0001
0x0302, 0x0002
0x0304, 0x0003
0x0306, 0x0004
0x0400, 0x00AA
";
    let image = compile_config(source, 4, 38051).unwrap();

    let mut port = DummyVproc::new_default();
    let mut dev = VprocDevice::new(&mut port);
    let mut scratch = [0u8; SCRATCH_LEN];
    let mut loader = ImageLoader::new(&mut scratch);
    let header = loader.load(&mut dev, &image).unwrap();

    assert_eq!(header.image_type, ImageType::Config);
    assert_eq!(loader.state(), LoadState::Done);
    drop(dev);

    // config loads never leave boot mode engaged
    assert!(port.app_running());
    assert_eq!(port.reg(0x0300), 0x0001);
    assert_eq!(port.reg(0x0302), 0x0002);
    assert_eq!(port.reg(0x0304), 0x0003);
    assert_eq!(port.reg(0x0306), 0x0004);
    assert_eq!(port.reg(0x0400), 0x00AA);
}

#[test]
fn incompatible_firmware_fails_the_conclude_handshake() {
    let source = format!("{}\n{}\n", s3(0x100, &[1, 2, 3, 4]), s7(0x100));
    let image = compile_firmware(&source, 16, 38040).unwrap();

    let mut port = DummyVproc::new(DummyConfig {
        conclude_response: 11, // incompatible app
        ..Default::default()
    });
    let mut dev = VprocDevice::new(&mut port);
    let mut scratch = [0u8; SCRATCH_LEN];
    let mut loader = ImageLoader::new(&mut scratch);

    assert_eq!(loader.load(&mut dev, &image), Err(Error::IncompatibleApp));
    assert_eq!(loader.state(), LoadState::Failed);
}

#[test]
fn block_size_beyond_scratch_buffer_rejected() {
    let header = ImageHeader {
        major: 0,
        minor: 0,
        image_type: ImageType::Config,
        endian: Default::default(),
        device_code: 0,
        block_words: 129, // 258 bytes per block
        body_len: 0,
    };
    let image = header.encode();

    let mut port = DummyVproc::new_default();
    let mut dev = VprocDevice::new(&mut port);
    let mut scratch = [0u8; SCRATCH_LEN];
    let mut loader = ImageLoader::new(&mut scratch);

    assert_eq!(loader.load(&mut dev, &image), Err(Error::Resource));
    assert_eq!(loader.state(), LoadState::Failed);
}

#[test]
fn truncated_body_rejected() {
    let source = format!("{}\n{}\n", s3(0x100, &[1, 2, 3, 4]), s7(0x100));
    let image = compile_firmware(&source, 16, 38040).unwrap();

    let mut port = DummyVproc::new_default();
    let mut dev = VprocDevice::new(&mut port);
    let mut scratch = [0u8; SCRATCH_LEN];
    let mut loader = ImageLoader::new(&mut scratch);

    let truncated = &image[..image.len() - 2];
    assert_eq!(loader.load(&mut dev, truncated), Err(Error::BadImage));
}

#[test]
fn save_to_flash_reads_back_the_image_count() {
    let mut port = DummyVproc::new_default();
    let mut dev = VprocDevice::new(&mut port);

    let count = flash::save_to_flash(&mut dev).unwrap();
    assert_eq!(count, 1);
}

#[test]
fn save_maps_flash_full_and_missing_flash() {
    let mut port = DummyVproc::new(DummyConfig {
        save_response: 3, // flash full
        ..Default::default()
    });
    let mut dev = VprocDevice::new(&mut port);
    assert_eq!(flash::save_to_flash(&mut dev), Err(Error::FlashFull));

    let mut port = DummyVproc::new(DummyConfig {
        flash_init_response: 0, // no flash device
        ..Default::default()
    });
    let mut dev = VprocDevice::new(&mut port);
    assert_eq!(flash::save_to_flash(&mut dev), Err(Error::NoFlashPresent));
}

#[test]
fn erase_succeeds_and_maps_bad_image() {
    let mut port = DummyVproc::new_default();
    let mut dev = VprocDevice::new(&mut port);
    flash::erase_flash(&mut dev).unwrap();

    let mut port = DummyVproc::new(DummyConfig {
        erase_response: 1, // bad image
        ..Default::default()
    });
    let mut dev = VprocDevice::new(&mut port);
    assert_eq!(flash::erase_flash(&mut dev), Err(Error::BadImage));
}

#[test]
fn start_firmware_raises_the_running_bit() {
    let mut port = DummyVproc::new(DummyConfig {
        app_running: false,
        ..Default::default()
    });
    let mut dev = VprocDevice::new(&mut port);
    flash::start_firmware(&mut dev).unwrap();
    drop(dev);

    assert!(port.app_running());
}
