//! Boot-mode and flash operations
//!
//! The privileged operations around an image load: switching the device
//! into boot mode, starting the loaded firmware, and saving to or erasing
//! the on-board flash. All of them go through the host command handshake.

use crate::device::VprocDevice;
use crate::error::{Error, Result};
use crate::hostcmd::{self, cmd, FlashInitResponse, HostCmdResponse};
use crate::port::HbiPort;
use crate::regmap::{self, CurrentFirmware};

/// Result register value confirming the device reached boot mode
pub const BOOT_READY: u16 = 0xD3D3;

/// Value written to the result register to confirm a flash erase
pub const ERASE_CONFIRM: u16 = 0xAA55;

/// Delay after a reset-to-boot write, in milliseconds
const RESET_DELAY_MS: u32 = 50;

/// Put the device into boot mode if an application is running
///
/// Idempotent: reads the app-running bit every time and only resets when
/// it is set, so callers may re-verify before every chunk of a firmware
/// load.
pub fn switch_to_boot<P: HbiPort>(dev: &mut VprocDevice<P>) -> Result<()> {
    let cur = CurrentFirmware::from_bits_retain(dev.read_reg(regmap::CURRENT_FIRMWARE)?);
    if cur.contains(CurrentFirmware::APP_RUNNING) {
        reset_to_boot(dev)?;
    }
    Ok(())
}

fn reset_to_boot<P: HbiPort>(dev: &mut VprocDevice<P>) -> Result<()> {
    dev.write_reg(regmap::RESET_CTRL, 1)?;

    // the reset needs time to complete before HBI is accessible again
    dev.delay_ms(RESET_DELAY_MS);

    let val = dev.read_reg(regmap::CMD_PARAM_RESULT)?;
    if val != BOOT_READY {
        log::error!("device did not reach boot mode, result 0x{:04X}", val);
        return Err(Error::Transport);
    }
    log::debug!("device in boot mode");
    Ok(())
}

/// Start the firmware currently loaded in device RAM
pub fn start_firmware<P: HbiPort>(dev: &mut VprocDevice<P>) -> Result<()> {
    switch_to_boot(dev)?;
    hostcmd::run_host_command(dev, cmd::START_FIRMWARE)?;

    let response = hostcmd::command_result(dev)?;
    if HostCmdResponse::from_raw(response) != Some(HostCmdResponse::Success) {
        return Err(Error::Command { response });
    }
    log::info!("firmware started");
    Ok(())
}

fn flash_init<P: HbiPort>(dev: &mut VprocDevice<P>) -> Result<()> {
    hostcmd::run_host_command(dev, cmd::FLASH_INIT)?;

    let response = hostcmd::command_result(dev)?;
    match FlashInitResponse::from_raw(response) {
        Some(FlashInitResponse::InitOk) => Ok(()),
        Some(FlashInitResponse::NoDevice) => Err(Error::NoFlashPresent),
        _ => {
            log::error!("flash init failed with response 0x{:04X}", response);
            Err(Error::Transport)
        }
    }
}

/// Save the loaded firmware and configuration record to flash
///
/// Returns the number of firmware images on the flash after the save.
pub fn save_to_flash<P: HbiPort>(dev: &mut VprocDevice<P>) -> Result<u16> {
    switch_to_boot(dev)?;
    flash_init(dev)?;

    dev.write_reg(regmap::CFG_CHECKSUM, 0)?;

    hostcmd::run_host_command(dev, cmd::SAVE_TO_FLASH)?;
    let response = hostcmd::command_result(dev)?;
    match HostCmdResponse::from_raw(response) {
        Some(HostCmdResponse::Success) => {}
        Some(HostCmdResponse::FlashFull) => {
            log::error!("flash is full, erase to free up space");
            return Err(Error::FlashFull);
        }
        _ => return Err(Error::Command { response }),
    }

    let count = dev.read_reg(regmap::FWR_COUNT)?;
    log::info!("image saved, {} image(s) on flash", count);
    Ok(count)
}

/// Erase all firmware and configuration records from flash
pub fn erase_flash<P: HbiPort>(dev: &mut VprocDevice<P>) -> Result<()> {
    switch_to_boot(dev)?;
    flash_init(dev)?;

    dev.write_reg(regmap::CMD_PARAM_RESULT, ERASE_CONFIRM)?;

    hostcmd::run_host_command(dev, cmd::ERASE_FLASH)?;
    let response = hostcmd::command_result(dev)?;

    // success is reported in the flash-init response space, failures in the
    // host-command space
    if FlashInitResponse::from_raw(response) == Some(FlashInitResponse::InitOk) {
        log::info!("flash erased");
        return Ok(());
    }
    match HostCmdResponse::from_raw(response) {
        Some(HostCmdResponse::BadImage) => Err(Error::BadImage),
        Some(HostCmdResponse::IncompatibleApp) => Err(Error::IncompatibleApp),
        Some(HostCmdResponse::NoFlashPresent) => Err(Error::NoFlashPresent),
        _ => Err(Error::Command { response }),
    }
}
