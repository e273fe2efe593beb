//! Grammar segment loading
//!
//! Streams a grammar blob into the ASR segment window through the extended
//! address path and maintains the device's segment table. The application
//! firmware must be running; grammars are managed by the firmware, not the
//! boot ROM.

use crate::device::VprocDevice;
use crate::error::{Error, Result};
use crate::hostcmd::{cmd, POLL_BOUND, POLL_DELAY_MS};
use crate::port::HbiPort;
use crate::regmap::{self, CurrentFirmware};

/// Bytes streamed per extended-window write
pub const CHUNK_LEN: usize = 64;

/// Command register sentinel while the ASR subsystem is busy
const ASR_BUSY: u16 = 0xFFFF;

/// Host software flag notifying an ASR command
const ASR_NOTIFY: u16 = 0x0004;

/// Load a grammar blob into the ASR segment window
///
/// Rejects the blob with [`Error::Resource`] if it exceeds the window
/// capacity. On success the segment table reflects the new grammar: the
/// last segment's size is updated in place when it already starts at the
/// grammar address, otherwise a new entry is appended.
pub fn load_grammar<P: HbiPort>(dev: &mut VprocDevice<P>, blob: &[u8]) -> Result<()> {
    let cur = CurrentFirmware::from_bits_retain(dev.read_reg(regmap::CURRENT_FIRMWARE)?);
    if !cur.contains(CurrentFirmware::APP_RUNNING) {
        log::error!("application firmware stopped, cannot manage grammars");
        return Err(Error::InvalidState);
    }

    let start = dev.read_u32(regmap::ASR_SEG_ADDR)?;
    let max = dev.read_u32(regmap::ASR_MAX_ADDR)?;
    let capacity = max.saturating_sub(start).saturating_sub(1);
    if blob.len() as u32 > capacity {
        log::error!("grammar of {} bytes exceeds {} byte window", blob.len(), capacity);
        return Err(Error::Resource);
    }

    asr_command(dev, cmd::ASR_DISABLE)?;

    let mut addr = start;
    for chunk in blob.chunks(CHUNK_LEN) {
        dev.write_u32(regmap::PAGE255_BASE, addr)?;

        let target = 0xFF00 | (addr as u16 & 0x00FF);
        if chunk.len() % 2 == 0 {
            dev.write_raw(target, chunk)?;
        } else {
            // a blob with an odd tail still writes whole words
            let mut padded = [0u8; CHUNK_LEN];
            padded[..chunk.len()].copy_from_slice(chunk);
            dev.write_raw(target, &padded[..chunk.len() + 1])?;
        }

        addr += chunk.len() as u32;
    }

    update_segment_table(dev, start, blob.len() as u32)?;

    asr_command(dev, cmd::ASR_ENABLE)
}

fn update_segment_table<P: HbiPort>(
    dev: &mut VprocDevice<P>,
    start: u32,
    size: u32,
) -> Result<()> {
    let count = dev.read_reg(regmap::ASR_SEG_COUNT)?;
    let last = count.wrapping_sub(1);

    let last_addr = dev.read_u32(regmap::ASR_SEG_ADDR_TABLE + regmap::ASR_SEG_STRIDE * last)?;

    if last_addr == start {
        // the last segment is this grammar's window; resize it in place
        dev.write_u32(regmap::ASR_SEG_SIZE_TABLE + regmap::ASR_SEG_STRIDE * last, size)?;
        log::debug!("updated segment {} to {} bytes", last, size);
    } else {
        let next = last.wrapping_add(1);
        dev.write_u32(regmap::ASR_SEG_SIZE_TABLE + regmap::ASR_SEG_STRIDE * next, size)?;
        dev.write_u32(regmap::ASR_SEG_ADDR_TABLE + regmap::ASR_SEG_STRIDE * next, start)?;
        dev.write_reg(regmap::ASR_SEG_COUNT, next + 1)?;
        log::debug!("created segment {} at 0x{:08X}", next, start);
    }
    Ok(())
}

/// Issue an ASR enable/disable command and wait out the busy sentinel
fn asr_command<P: HbiPort>(dev: &mut VprocDevice<P>, opcode: u16) -> Result<()> {
    dev.write_reg(regmap::HOST_CMD, opcode)?;
    dev.write_reg(regmap::HOST_SW_FLAGS, ASR_NOTIFY)?;

    for _ in 0..POLL_BOUND {
        if dev.read_reg(regmap::HOST_CMD)? != ASR_BUSY {
            return Ok(());
        }
        dev.delay_ms(POLL_DELAY_MS);
    }
    log::warn!("ASR command 0x{:04X} still busy after {} polls", opcode, POLL_BOUND);
    Err(Error::Resource)
}
