//! Vproc register map
//!
//! Fixed addresses given by the hardware contract. The high byte of each
//! address is the page, the low byte the even byte offset within it.

use bitflags::bitflags;

/// Host software flags register; bit 0 signals a pending host command
pub const HOST_SW_FLAGS: u16 = 0x0006;

/// Base address register for page-255 (extended window) accesses
pub const PAGE255_BASE: u16 = 0x000C;

/// Reset control register; writing 1 resets the device into boot mode
pub const RESET_CTRL: u16 = 0x0014;

/// Number of firmware images stored on flash
pub const FWR_COUNT: u16 = 0x0026;

/// Currently loaded firmware register
pub const CURRENT_FIRMWARE: u16 = 0x0028;

/// Host command register
pub const HOST_CMD: u16 = 0x0032;

/// Host command parameter/result register
pub const CMD_PARAM_RESULT: u16 = 0x0034;

/// Firmware execution address register (32-bit)
pub const FWR_EXEC: u16 = 0x012C;

/// Number of entries in the ASR segment table
pub const ASR_SEG_COUNT: u16 = 0x013E;

/// ASR segment size table base (32-bit entries, stride [`ASR_SEG_STRIDE`])
pub const ASR_SEG_SIZE_TABLE: u16 = 0x0140;

/// ASR segment load-address table base (32-bit entries)
pub const ASR_SEG_ADDR_TABLE: u16 = 0x0144;

/// Byte stride between consecutive ASR segment table entries
pub const ASR_SEG_STRIDE: u16 = 8;

/// Configuration record checksum register
pub const CFG_CHECKSUM: u16 = 0x01F2;

/// Current ASR segment start address (32-bit)
pub const ASR_SEG_ADDR: u16 = 0x04B8;

/// Highest address usable by the ASR subsystem (32-bit)
pub const ASR_MAX_ADDR: u16 = 0x04BC;

bitflags! {
    /// Bits of the [`CURRENT_FIRMWARE`] register
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CurrentFirmware: u16 {
        /// An application firmware is running (device is out of boot mode)
        const APP_RUNNING = 1 << 15;
    }
}
