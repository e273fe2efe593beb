//! Firmware image encoding
//!
//! Turns S-record source into a stream of pre-framed HBI write commands the
//! image loader can push into the boot ROM unmodified. Data runs are
//! addressed through the extended (page 255) window: each run opens with a
//! direct write of its 4-byte base address to the window base register,
//! followed by a paged write whose length byte is reserved and patched once
//! the run's size is known. Blocks are fixed-size and padded with no-op
//! pairs; a run that continues across a block boundary is resumed with the
//! continuation opcode instead of a full header.

use alloc::vec::Vec;

use super::srec::{self, Record};
use crate::device::DeviceEndian;
use crate::error::{Error, Result};
use crate::hbi::opcodes;
use crate::image::{ImageHeader, ImageType};
use crate::regmap;

/// Extended window span covered by one base address
const WINDOW_LEN: u32 = 256;

/// Patched length byte flag: set on the first write of a run, clear on
/// continuation writes
const NEW_COMMAND: u8 = 0x80;

/// Firmware block sizes accepted by the boot ROM, in 16-bit words
pub fn is_valid_firmware_block_size(words: u16) -> bool {
    matches!(words, 16 | 32 | 64 | 128)
}

/// Compile S-record firmware source into a loadable image
///
/// `block_words` is the transport block size in words and must satisfy
/// [`is_valid_firmware_block_size`]. `device_code` is recorded in the image
/// header. Source without a termination record is [`Error::Incomplete`].
pub fn compile_firmware(source: &str, block_words: u16, device_code: u16) -> Result<Vec<u8>> {
    if !is_valid_firmware_block_size(block_words) {
        return Err(Error::InvalidArgument);
    }

    let mut enc = Encoder::new(block_words as usize * 2);
    for line in source.lines() {
        match srec::parse_line(line)? {
            Record::Data { address, data } => enc.push_record(address, &data)?,
            Record::Termination { entry } => {
                enc.finish(entry);
                break;
            }
            Record::Skipped => {}
        }
    }
    if !enc.done {
        log::error!("firmware source has no termination record");
        return Err(Error::Incomplete);
    }

    let header = ImageHeader {
        major: 0,
        minor: 0,
        image_type: ImageType::Firmware,
        endian: DeviceEndian::Big,
        device_code,
        block_words,
        body_len: enc.body.len() as u32,
    };

    let mut out = Vec::with_capacity(header.encode().len() + enc.body.len());
    out.extend_from_slice(&header.encode());
    out.extend_from_slice(&enc.body);
    Ok(out)
}

struct Encoder {
    block_len: usize,
    body: Vec<u8>,
    block: Vec<u8>,
    /// Index of the reserved length byte of the open run, within `block`
    len_index: Option<usize>,
    /// Open run resumed with the continuation opcode
    cont: bool,
    /// Data bytes in the open run
    run_len: usize,
    /// Address the next data byte must have to continue the run
    next_addr: Option<u32>,
    base_addr: u32,
    done: bool,
}

impl Encoder {
    fn new(block_len: usize) -> Self {
        let mut block = Vec::with_capacity(block_len);
        // the whole stream runs in the extended address window
        block.extend_from_slice(&opcodes::select_page(opcodes::EXTENDED_PAGE));
        Self {
            block_len,
            body: Vec::new(),
            block,
            len_index: None,
            cont: false,
            run_len: 0,
            next_addr: None,
            base_addr: 0,
            done: false,
        }
    }

    fn push_record(&mut self, address: u32, data: &[u8]) -> Result<()> {
        if self.next_addr != Some(address) {
            self.patch_run_len();
            // a new run needs a full window header plus at least one word
            if self.block.len() >= self.block_len - 10 {
                self.pad_and_flush();
            }
            self.open_window(address);
        }

        for &byte in data {
            if self.run_len > 255 {
                log::error!("write run exceeds the single-access payload limit");
                return Err(Error::InvalidArgument);
            }

            let next = self.next_addr.unwrap_or(address);
            let window_crossed = next - self.base_addr >= WINDOW_LEN;
            if self.block.len() >= self.block_len || window_crossed {
                self.patch_run_len();
                if window_crossed {
                    // the run crossed the window; re-emit the base address
                    if self.block.len() >= self.block_len - 8 {
                        self.pad_and_flush();
                    }
                    self.open_window(next);
                } else {
                    self.flush();
                    self.block.push(opcodes::CONT_PAGED_WRITE);
                    self.cont = true;
                    self.len_index = Some(self.block.len());
                    self.block.push(0);
                }
            }

            self.block.push(byte);
            self.run_len += 1;
            self.next_addr = Some(next + 1);
        }
        Ok(())
    }

    fn finish(&mut self, entry: u32) {
        self.patch_run_len();
        // the exec-register write needs select page + offset command + address
        if self.block.len() > self.block_len - 8 {
            self.pad_and_flush();
        }

        // write the entry address into the firmware exec register
        self.block
            .extend_from_slice(&opcodes::select_page(((regmap::FWR_EXEC >> 8) as u8) - 1));
        self.block.extend_from_slice(&opcodes::paged_write(
            ((regmap::FWR_EXEC & 0xFF) >> 1) as u8,
            1,
        ));
        self.block.extend_from_slice(&entry.to_be_bytes());

        self.pad_and_flush();
        self.done = true;
    }

    /// Emit the direct-address-window header for a run starting at `address`
    fn open_window(&mut self, address: u32) {
        self.base_addr = address & !(WINDOW_LEN - 1);

        self.block.extend_from_slice(&opcodes::direct_write(
            ((regmap::PAGE255_BASE & 0xFF) >> 1) as u8,
            1,
        ));
        self.block.extend_from_slice(&self.base_addr.to_be_bytes());
        self.block.push(((address & 0xFF) >> 1) as u8);
        self.len_index = Some(self.block.len());
        self.block.push(0);

        self.next_addr = Some(address);
    }

    /// Patch the reserved length byte of the open run, if any
    fn patch_run_len(&mut self) {
        if let Some(index) = self.len_index.take() {
            let count = ((self.run_len >> 1) as u8).wrapping_sub(1);
            self.block[index] = if self.cont { count } else { NEW_COMMAND | count };
            self.cont = false;
        }
        self.run_len = 0;
    }

    fn pad_and_flush(&mut self) {
        while self.block.len() < self.block_len {
            self.block.push(opcodes::NO_OP);
        }
        self.flush();
    }

    fn flush(&mut self) {
        self.body.extend_from_slice(&self.block);
        self.block.clear();
    }
}
