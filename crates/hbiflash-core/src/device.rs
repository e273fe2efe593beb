//! Register access
//!
//! [`VprocDevice`] wraps a bus port together with the configured device
//! byte order and provides the word-oriented register access everything
//! else is built on. Values cross the API in host order; the conversion to
//! and from device order happens symmetrically on every write and read.

use crate::error::{Error, Result};
use crate::hbi::frame::{self, Access, MAX_ACCESS_LEN, MAX_HEADER_LEN};
use crate::port::HbiPort;

/// Byte order of 16-bit words on the device side of the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceEndian {
    /// Most significant byte first (the Vproc default)
    #[default]
    Big,
    /// Least significant byte first
    Little,
}

/// A device handle: a bus port plus the device byte order
///
/// All register traffic is funnelled through one handle; the device has a
/// single page-select and command/result register pair, so accesses must
/// not be interleaved.
pub struct VprocDevice<P> {
    port: P,
    endian: DeviceEndian,
}

impl<P: HbiPort> VprocDevice<P> {
    /// Create a handle with the default (big-endian) device byte order
    pub fn new(port: P) -> Self {
        Self::with_endian(port, DeviceEndian::Big)
    }

    /// Create a handle with an explicit device byte order
    pub fn with_endian(port: P, endian: DeviceEndian) -> Self {
        Self { port, endian }
    }

    /// The configured device byte order
    pub fn endian(&self) -> DeviceEndian {
        self.endian
    }

    /// Direct access to the underlying port
    ///
    /// Used by the image loader to stream pre-framed body chunks.
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Consume the handle and return the port
    pub fn into_port(self) -> P {
        self.port
    }

    /// Delay on the port's clock
    pub fn delay_ms(&mut self, ms: u32) {
        self.port.delay_ms(ms);
    }

    /// Write `words` (host order) starting at register `addr`
    pub fn write_words(&mut self, addr: u16, words: &[u16]) -> Result<()> {
        let size = words.len() * 2;
        if size == 0 || size > MAX_ACCESS_LEN {
            log::warn!(
                "write of {} bytes at 0x{:04X} exceeds the {}-byte access limit",
                size,
                addr,
                MAX_ACCESS_LEN
            );
            return Err(Error::InvalidArgument);
        }

        let hdr = frame::encode_header(addr, Access::Write, size)?;
        let mut buf = [0u8; MAX_HEADER_LEN + MAX_ACCESS_LEN];
        buf[..hdr.len()].copy_from_slice(hdr.as_bytes());
        for (chunk, word) in buf[hdr.len()..hdr.len() + size]
            .chunks_exact_mut(2)
            .zip(words)
        {
            chunk.copy_from_slice(&self.to_device(*word));
        }

        self.port.write(&buf[..hdr.len() + size])
    }

    /// Read `out.len()` words (host order) starting at register `addr`
    pub fn read_words(&mut self, addr: u16, out: &mut [u16]) -> Result<()> {
        let size = out.len() * 2;
        if size == 0 || size > MAX_ACCESS_LEN {
            return Err(Error::InvalidArgument);
        }

        let hdr = frame::encode_header(addr, Access::Read, size)?;
        let mut raw = [0u8; MAX_ACCESS_LEN];
        self.port.exchange(hdr.as_bytes(), &mut raw[..size])?;
        for (word, chunk) in out.iter_mut().zip(raw[..size].chunks_exact(2)) {
            *word = self.from_device([chunk[0], chunk[1]]);
        }

        Ok(())
    }

    /// Read a single 16-bit register
    pub fn read_reg(&mut self, addr: u16) -> Result<u16> {
        let mut word = [0u16; 1];
        self.read_words(addr, &mut word)?;
        Ok(word[0])
    }

    /// Write a single 16-bit register
    pub fn write_reg(&mut self, addr: u16, value: u16) -> Result<()> {
        self.write_words(addr, &[value])
    }

    /// Read a 32-bit register (two words, high word first)
    pub fn read_u32(&mut self, addr: u16) -> Result<u32> {
        let mut words = [0u16; 2];
        self.read_words(addr, &mut words)?;
        Ok(((words[0] as u32) << 16) | words[1] as u32)
    }

    /// Write a 32-bit register (two words, high word first)
    pub fn write_u32(&mut self, addr: u16, value: u32) -> Result<()> {
        self.write_words(addr, &[(value >> 16) as u16, value as u16])
    }

    /// Write an already device-ordered payload starting at register `addr`
    ///
    /// The bytes pass through unmodified; only the command header is added.
    /// Used for grammar blob blocks, whose byte order is defined by the
    /// blob format itself.
    pub fn write_raw(&mut self, addr: u16, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() || bytes.len() > MAX_ACCESS_LEN || bytes.len() % 2 != 0 {
            return Err(Error::InvalidArgument);
        }

        let hdr = frame::encode_header(addr, Access::Write, bytes.len())?;
        let mut buf = [0u8; MAX_HEADER_LEN + MAX_ACCESS_LEN];
        buf[..hdr.len()].copy_from_slice(hdr.as_bytes());
        buf[hdr.len()..hdr.len() + bytes.len()].copy_from_slice(bytes);

        self.port.write(&buf[..hdr.len() + bytes.len()])
    }

    fn to_device(&self, word: u16) -> [u8; 2] {
        match self.endian {
            DeviceEndian::Big => word.to_be_bytes(),
            DeviceEndian::Little => word.to_le_bytes(),
        }
    }

    fn from_device(&self, bytes: [u8; 2]) -> u16 {
        match self.endian {
            DeviceEndian::Big => u16::from_be_bytes(bytes),
            DeviceEndian::Little => u16::from_le_bytes(bytes),
        }
    }
}
