//! Host command handshake
//!
//! Privileged operations (boot-mode transitions, flash save/erase, firmware
//! start) go through the host command register with a three-step handshake:
//!
//! 1. poll the host software flags until no command is pending
//! 2. write the command, then notify the firmware that it was written
//! 3. poll the command register until it returns to idle
//!
//! Both polls are bounded with a fixed inter-poll delay and form a
//! deterministic software timeout; exhausting a bound fails with
//! [`Error::Resource`]. Nothing else in the driver retries.

use crate::device::VprocDevice;
use crate::error::{Error, Result};
use crate::port::HbiPort;
use crate::regmap;

/// Maximum poll iterations for either handshake phase
pub const POLL_BOUND: u32 = 10_000;

/// Fixed delay between poll iterations in milliseconds
pub const POLL_DELAY_MS: u32 = 10;

/// Host software flag bit signalling a pending host command
pub const HOST_CMD_PENDING: u16 = 0x0001;

/// Value written to the flags register to notify "command written"
pub const HOST_CMD_WRITTEN: u16 = 0x0001;

/// Command register value meaning idle / previous command complete
pub const HOST_CMD_IDLE: u16 = 0x0000;

/// Host command opcodes
pub mod cmd {
    /// Save the loaded firmware and configuration to flash
    pub const SAVE_TO_FLASH: u16 = 0x0004;
    /// Start the firmware loaded in RAM
    pub const START_FIRMWARE: u16 = 0x0008;
    /// Erase all firmware and configuration from flash
    pub const ERASE_FLASH: u16 = 0x0009;
    /// Initialize the flash controller
    pub const FLASH_INIT: u16 = 0x000B;
    /// Firmware loading complete
    pub const LOAD_COMPLETE: u16 = 0x000D;
    /// Disable the ASR subsystem
    pub const ASR_DISABLE: u16 = 0x800D;
    /// Enable the ASR subsystem
    pub const ASR_ENABLE: u16 = 0x800E;
}

/// Responses posted to the result register after a host command
///
/// This space is distinct from [`FlashInitResponse`]; the same numeric
/// value means different things in the two handshake contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCmdResponse {
    /// Command completed successfully
    Success,
    /// Requested firmware image not present on flash
    BadImage,
    /// Image checksum verification failed
    ChecksumFail,
    /// No more space left on flash
    FlashFull,
    /// Configuration record does not match the firmware
    ConfRecMismatch,
    /// Flash header is invalid
    InvalidFlashHeader,
    /// No flash device connected
    NoFlashPresent,
    /// Generic flash failure
    FlashFailure,
    /// The device rejected the command
    CommandError,
    /// No configuration record present
    NoConfigRecord,
    /// Command invalid while an application is running
    RejectedAppRunning,
    /// Firmware image is incompatible with the device
    IncompatibleApp,
}

impl HostCmdResponse {
    /// Decode a raw result register value, if it is a known response
    pub fn from_raw(raw: u16) -> Option<Self> {
        Some(match raw {
            0 => Self::Success,
            1 => Self::BadImage,
            2 => Self::ChecksumFail,
            3 => Self::FlashFull,
            4 => Self::ConfRecMismatch,
            5 => Self::InvalidFlashHeader,
            6 => Self::NoFlashPresent,
            7 => Self::FlashFailure,
            8 => Self::CommandError,
            9 => Self::NoConfigRecord,
            10 => Self::RejectedAppRunning,
            11 => Self::IncompatibleApp,
            _ => return None,
        })
    }
}

/// Responses posted after a flash-init command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashInitResponse {
    /// No flash device found on the board
    NoDevice,
    /// Flash found but its checksum is bad
    BadChecksum,
    /// Flash controller initialized
    InitOk,
    /// Flash device not recognized
    UnrecognizedDevice,
}

impl FlashInitResponse {
    /// Decode a raw result register value, if it is a known response
    pub fn from_raw(raw: u16) -> Option<Self> {
        Some(match raw {
            0x0000 => Self::NoDevice,
            0x0001 => Self::BadChecksum,
            0x6000 => Self::InitOk,
            0x8000 => Self::UnrecognizedDevice,
            _ => return None,
        })
    }
}

/// Run a host command through the three-step handshake
///
/// The bounds and delay are fixed; they are not caller-configurable.
pub fn run_host_command<P: HbiPort>(dev: &mut VprocDevice<P>, opcode: u16) -> Result<()> {
    // 1. wait for any ongoing command to finish
    let mut pending = true;
    for _ in 0..POLL_BOUND {
        let flags = dev.read_reg(regmap::HOST_SW_FLAGS)?;
        if flags & HOST_CMD_PENDING == 0 {
            pending = false;
            break;
        }
        dev.delay_ms(POLL_DELAY_MS);
    }
    if pending {
        log::warn!("host command register busy after {} polls", POLL_BOUND);
        return Err(Error::Resource);
    }

    // 2. write the command and notify the firmware
    dev.write_reg(regmap::HOST_CMD, opcode)?;
    dev.write_reg(regmap::HOST_SW_FLAGS, HOST_CMD_WRITTEN)?;

    // 3. wait for the command to complete
    for _ in 0..POLL_BOUND {
        if dev.read_reg(regmap::HOST_CMD)? == HOST_CMD_IDLE {
            log::debug!("host command 0x{:04X} complete", opcode);
            return Ok(());
        }
        dev.delay_ms(POLL_DELAY_MS);
    }

    log::warn!(
        "host command 0x{:04X} did not complete after {} polls",
        opcode,
        POLL_BOUND
    );
    Err(Error::Resource)
}

/// Read the raw result of the last host command
pub fn command_result<P: HbiPort>(dev: &mut VprocDevice<P>) -> Result<u16> {
    dev.read_reg(regmap::CMD_PARAM_RESULT)
}
