//! hbiflash-dummy - In-memory Vproc device emulator
//!
//! This crate provides a dummy port that emulates an HBI-attached voice
//! processor in memory: it interprets the framed wire protocol against a
//! paged register file and a sparse extended-window memory, and emulates
//! the host-command mailbox, boot-mode transitions and the ASR segment
//! table. It's useful for testing and development without real hardware.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;

use hbiflash_core::error::{Error, Result};
use hbiflash_core::hbi::opcodes;
use hbiflash_core::port::{HbiPort, PortFeatures};
use hbiflash_core::regmap;

/// Boot-mode confirmation value posted after a reset
const BOOT_READY: u16 = 0xD3D3;

/// Register file size: pages 0x00-0xFF of 256 bytes each
const REG_SPACE: usize = 0x1_0000;

/// Configuration for the emulated device
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Device starts with an application firmware running
    pub app_running: bool,
    /// Host software flags stay busy forever (commands never accepted)
    pub hold_busy: bool,
    /// Result posted for a flash-init command
    pub flash_init_response: u16,
    /// Result posted for a save-to-flash command
    pub save_response: u16,
    /// Result posted for an erase command
    pub erase_response: u16,
    /// Result posted for a load-complete command
    pub conclude_response: u16,
    /// Result posted for a start-firmware command
    pub start_response: u16,
    /// ASR segment window start address
    pub asr_seg_addr: u32,
    /// ASR segment window end address
    pub asr_max_addr: u32,
    /// Initial number of ASR segment table entries
    pub seg_count: u16,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            app_running: true,
            hold_busy: false,
            flash_init_response: 0x6000,
            save_response: 0,
            erase_response: 0x6000,
            conclude_response: 0,
            start_response: 0,
            asr_seg_addr: 0x0004_0000,
            asr_max_addr: 0x0005_0000,
            seg_count: 1,
        }
    }
}

/// Where paged accesses currently land
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selected {
    /// An ordinary register page (already adjusted: wire value + 1)
    Page(u8),
    /// The extended 32-bit address window
    Extended,
}

/// Emulated Vproc device
pub struct DummyVproc {
    config: DummyConfig,
    /// Register file, stored in device byte order
    regs: Vec<u8>,
    /// Extended-window memory, sparse
    ext: BTreeMap<u32, u8>,
    selected: Selected,
    /// Next extended address a continuation write resumes at
    cont_addr: u32,
    /// Read transactions per register, for poll-bound assertions
    read_counts: BTreeMap<u16, u32>,
    asr_enabled: bool,
}

impl DummyVproc {
    /// Create an emulated device with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let mut dev = Self {
            regs: vec![0u8; REG_SPACE],
            ext: BTreeMap::new(),
            selected: Selected::Page(1),
            cont_addr: 0,
            read_counts: BTreeMap::new(),
            asr_enabled: true,
            config,
        };
        if dev.config.app_running {
            dev.set_reg(regmap::CURRENT_FIRMWARE, 0x8000);
        }
        if dev.config.hold_busy {
            dev.set_reg(regmap::HOST_SW_FLAGS, 0x0001);
        }
        dev.set_reg_u32(regmap::ASR_SEG_ADDR, dev.config.asr_seg_addr);
        dev.set_reg_u32(regmap::ASR_MAX_ADDR, dev.config.asr_max_addr);
        dev.set_reg(regmap::ASR_SEG_COUNT, dev.config.seg_count);
        dev
    }

    /// Create an emulated device with default configuration
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Mutate the configuration (e.g. to change a response mid-test)
    pub fn config_mut(&mut self) -> &mut DummyConfig {
        &mut self.config
    }

    /// Read a register directly, bypassing the bus
    pub fn reg(&self, addr: u16) -> u16 {
        let i = addr as usize;
        u16::from_be_bytes([self.regs[i], self.regs[i + 1]])
    }

    /// Write a register directly, bypassing the bus and side effects
    pub fn set_reg(&mut self, addr: u16, value: u16) {
        let i = addr as usize;
        self.regs[i..i + 2].copy_from_slice(&value.to_be_bytes());
    }

    /// Read a 32-bit register directly
    pub fn reg_u32(&self, addr: u16) -> u32 {
        ((self.reg(addr) as u32) << 16) | self.reg(addr + 2) as u32
    }

    /// Write a 32-bit register directly
    pub fn set_reg_u32(&mut self, addr: u16, value: u32) {
        self.set_reg(addr, (value >> 16) as u16);
        self.set_reg(addr + 2, value as u16);
    }

    /// Extended-window memory contents; unwritten bytes read as zero
    pub fn ext_mem(&self, addr: u32, len: usize) -> Vec<u8> {
        (0..len)
            .map(|i| *self.ext.get(&(addr + i as u32)).unwrap_or(&0))
            .collect()
    }

    /// Number of read transactions issued against a register
    pub fn read_count(&self, addr: u16) -> u32 {
        *self.read_counts.get(&addr).unwrap_or(&0)
    }

    /// Whether the ASR subsystem is currently enabled
    pub fn asr_enabled(&self) -> bool {
        self.asr_enabled
    }

    /// Whether an application firmware is running
    pub fn app_running(&self) -> bool {
        self.reg(regmap::CURRENT_FIRMWARE) & 0x8000 != 0
    }

    fn write_extended(&mut self, addr: u32, data: &[u8]) {
        for (i, &b) in data.iter().enumerate() {
            self.ext.insert(addr + i as u32, b);
        }
        self.cont_addr = addr + data.len() as u32;
    }

    fn store_regs(&mut self, addr: u16, data: &[u8]) -> Result<()> {
        let start = addr as usize;
        let end = start + data.len();
        if end > self.regs.len() {
            return Err(Error::Transport);
        }
        self.regs[start..end].copy_from_slice(data);

        // mailbox and reset side effects
        let covers = |reg: u16| (start..end).contains(&(reg as usize));
        if covers(regmap::HOST_SW_FLAGS)
            && self.reg(regmap::HOST_SW_FLAGS) != 0
            && !self.config.hold_busy
        {
            self.process_host_command();
        }
        if covers(regmap::RESET_CTRL) && self.reg(regmap::RESET_CTRL) == 1 {
            self.reset_to_boot();
        }
        Ok(())
    }

    fn process_host_command(&mut self) {
        let cmd = self.reg(regmap::HOST_CMD);
        let result = match cmd {
            0x0004 => {
                // save to flash; bump the image count on success
                if self.config.save_response == 0 {
                    let count = self.reg(regmap::FWR_COUNT);
                    self.set_reg(regmap::FWR_COUNT, count + 1);
                }
                self.config.save_response
            }
            0x0008 => {
                if self.config.start_response == 0 {
                    self.set_reg(regmap::CURRENT_FIRMWARE, 0x8000);
                }
                self.config.start_response
            }
            0x0009 => self.config.erase_response,
            0x000B => self.config.flash_init_response,
            0x000D => self.config.conclude_response,
            0x800D => {
                self.asr_enabled = false;
                0
            }
            0x800E => {
                self.asr_enabled = true;
                0
            }
            other => {
                log::debug!("dummy: unhandled host command 0x{:04X}", other);
                0
            }
        };
        self.set_reg(regmap::CMD_PARAM_RESULT, result);
        self.set_reg(regmap::HOST_CMD, 0);
        self.set_reg(regmap::HOST_SW_FLAGS, 0);
    }

    fn reset_to_boot(&mut self) {
        let cur = self.reg(regmap::CURRENT_FIRMWARE);
        self.set_reg(regmap::CURRENT_FIRMWARE, cur & !0x8000);
        self.set_reg(regmap::CMD_PARAM_RESULT, BOOT_READY);
        self.set_reg(regmap::RESET_CTRL, 0);
    }

    fn select(&mut self, wire_page: u8) {
        self.selected = if wire_page == opcodes::EXTENDED_PAGE {
            Selected::Extended
        } else {
            // the wire carries page minus one
            Selected::Page(wire_page + 1)
        };
    }

    /// Interpret a stream of framed write commands
    fn interpret(&mut self, tx: &[u8]) -> Result<()> {
        let mut i = 0;
        while i < tx.len() {
            let op = tx[i];
            if op == opcodes::NO_OP {
                i += 1;
                continue;
            }
            let arg = *tx.get(i + 1).ok_or(Error::Transport)?;

            match op {
                opcodes::SELECT_PAGE => {
                    self.select(arg);
                    i += 2;
                }
                opcodes::CONT_PAGED_WRITE => {
                    let len = (arg as usize + 1) * 2;
                    let data = tx.get(i + 2..i + 2 + len).ok_or(Error::Transport)?.to_vec();
                    self.write_extended(self.cont_addr, &data);
                    i += 2 + len;
                }
                op if op & opcodes::DIRECT_ACCESS != 0 => {
                    let offset = op & 0x7F;
                    let len = ((arg & 0x7F) as usize + 1) * 2;
                    if arg & opcodes::WRITE_FLAG == 0 {
                        // read header in a write stream: nothing to do
                        i += 2;
                        continue;
                    }
                    let data = tx.get(i + 2..i + 2 + len).ok_or(Error::Transport)?.to_vec();
                    self.store_regs((offset as u16) << 1, &data)?;
                    i += 2 + len;
                }
                offset => {
                    let len = ((arg & 0x7F) as usize + 1) * 2;
                    if arg & opcodes::WRITE_FLAG == 0 {
                        i += 2;
                        continue;
                    }
                    let data = tx.get(i + 2..i + 2 + len).ok_or(Error::Transport)?.to_vec();
                    match self.selected {
                        Selected::Extended => {
                            let base = self.reg_u32(regmap::PAGE255_BASE);
                            let addr = (base & !0xFF) | ((offset as u32) << 1);
                            self.write_extended(addr, &data);
                        }
                        Selected::Page(page) => {
                            let addr = ((page as u16) << 8) | ((offset as u16) << 1);
                            self.store_regs(addr, &data)?;
                        }
                    }
                    i += 2 + len;
                }
            }
        }
        Ok(())
    }

    /// Decode a read header and fill `rx` from the addressed memory
    fn read_into(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<()> {
        if tx.len() < 2 {
            return Err(Error::Transport);
        }

        if tx[0] == opcodes::SELECT_PAGE {
            if tx.len() < 4 {
                return Err(Error::Transport);
            }
            self.select(tx[1]);
            let offset = tx[2];
            match self.selected {
                Selected::Extended => {
                    let base = self.reg_u32(regmap::PAGE255_BASE);
                    let addr = (base & !0xFF) | ((offset as u32) << 1);
                    let data = self.ext_mem(addr, rx.len());
                    rx.copy_from_slice(&data);
                }
                Selected::Page(page) => {
                    let addr = ((page as u16) << 8) | ((offset as u16) << 1);
                    self.fetch_regs(addr, rx)?;
                }
            }
        } else if tx[0] & opcodes::DIRECT_ACCESS != 0 {
            let addr = ((tx[0] & 0x7F) as u16) << 1;
            self.fetch_regs(addr, rx)?;
        } else {
            return Err(Error::Transport);
        }
        Ok(())
    }

    fn fetch_regs(&mut self, addr: u16, rx: &mut [u8]) -> Result<()> {
        let start = addr as usize;
        let end = start + rx.len();
        if end > self.regs.len() {
            return Err(Error::Transport);
        }
        rx.copy_from_slice(&self.regs[start..end]);
        *self.read_counts.entry(addr).or_insert(0) += 1;
        Ok(())
    }
}

impl HbiPort for DummyVproc {
    fn features(&self) -> PortFeatures {
        PortFeatures::FULL_DUPLEX
    }

    fn write(&mut self, tx: &[u8]) -> Result<()> {
        self.interpret(tx)
    }

    fn exchange(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<()> {
        self.read_into(tx, rx)
    }

    fn delay_ms(&mut self, _ms: u32) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_write_and_read_back() {
        let mut dev = DummyVproc::new_default();
        // direct write of one word to register 0x000E
        dev.write(&[0x87, 0x80, 0xAB, 0xCD]).unwrap();
        assert_eq!(dev.reg(0x000E), 0xABCD);

        let mut rx = [0u8; 2];
        dev.exchange(&[0x87, 0x00], &mut rx).unwrap();
        assert_eq!(rx, [0xAB, 0xCD]);
        assert_eq!(dev.read_count(0x000E), 1);
    }

    #[test]
    fn test_paged_write_lands_on_adjusted_page() {
        let mut dev = DummyVproc::new_default();
        // select wire page 2 = device page 3, write a word at offset 0
        dev.write(&[0xFE, 0x02, 0x00, 0x80, 0x12, 0x34]).unwrap();
        assert_eq!(dev.reg(0x0300), 0x1234);
    }

    #[test]
    fn test_extended_window_write() {
        let mut dev = DummyVproc::new_default();
        // base address 0x00012300 into the window base register
        dev.write(&[0x86, 0x81, 0x00, 0x01, 0x23, 0x00]).unwrap();
        // select the extended page, write two words at offset 0x20
        dev.write(&[0xFE, 0xFF, 0x20, 0x81, 1, 2, 3, 4]).unwrap();
        assert_eq!(dev.ext_mem(0x0001_2340, 4), vec![1, 2, 3, 4]);
        // a continuation write resumes where the last one ended
        dev.write(&[0xFB, 0x00, 5, 6]).unwrap();
        assert_eq!(dev.ext_mem(0x0001_2344, 2), vec![5, 6]);
    }

    #[test]
    fn test_noop_filler_skipped() {
        let mut dev = DummyVproc::new_default();
        dev.write(&[0xFF, 0xFF, 0x87, 0x80, 0x00, 0x01, 0xFF, 0xFF]).unwrap();
        assert_eq!(dev.reg(0x000E), 0x0001);
    }

    #[test]
    fn test_reset_to_boot_side_effect() {
        let mut dev = DummyVproc::new_default();
        assert!(dev.app_running());
        // write 1 to the reset control register (offset 0x14 >> 1 = 0x0A)
        dev.write(&[0x8A, 0x80, 0x00, 0x01]).unwrap();
        assert!(!dev.app_running());
        assert_eq!(dev.reg(regmap::CMD_PARAM_RESULT), 0xD3D3);
    }

    #[test]
    fn test_host_command_mailbox() {
        let mut dev = DummyVproc::new_default();
        dev.set_reg(regmap::HOST_CMD, 0x000B);
        // notify: write 1 to the flags register (offset 0x06 >> 1 = 0x03)
        dev.write(&[0x83, 0x80, 0x00, 0x01]).unwrap();
        assert_eq!(dev.reg(regmap::HOST_CMD), 0);
        assert_eq!(dev.reg(regmap::CMD_PARAM_RESULT), 0x6000);
    }

    #[test]
    fn test_truncated_stream_rejected() {
        let mut dev = DummyVproc::new_default();
        assert_eq!(dev.write(&[0x87, 0x80, 0xAB]), Err(Error::Transport));
    }
}
