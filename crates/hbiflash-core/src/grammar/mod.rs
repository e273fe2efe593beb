//! Grammar binary format
//!
//! A grammar blob packs trigger and command acoustic models with their
//! parameter blobs behind a fixed 64-byte header. The header is stored
//! twice back-to-back at the start of the blob; parameter blobs are 4-byte
//! aligned and the command model is 16-byte aligned.

pub mod loader;

use crate::error::{Error, Result};

/// Length of one grammar header copy in bytes
pub const HEADER_LEN: usize = 64;

/// Offset of the first section: two header copies
pub const BLOB_BASE_OFFSET: u32 = 2 * HEADER_LEN as u32;

/// Length of the description field in bytes
pub const DESCRIPTION_LEN: usize = 32;

/// The fixed grammar header
///
/// Offsets are absolute within the blob; a zero offset/size pair means the
/// section is absent. Offsets, sizes and the version are big-endian on
/// disk; the two counters are little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrammarHeader {
    /// Offset of the trigger acoustic model
    pub trigger_model_offset: u32,
    /// Size of the trigger acoustic model
    pub trigger_model_size: u32,
    /// Offset of the command acoustic model
    pub command_model_offset: u32,
    /// Size of the command acoustic model
    pub command_model_size: u32,
    /// Free-form description, zero-padded
    pub description: [u8; DESCRIPTION_LEN],
    /// Grammar format version
    pub version: u32,
    /// Number of trigger phrases
    pub num_triggers: i16,
    /// Number of command phrases
    pub num_commands: i16,
    /// Offset of the trigger parameter blob
    pub trigger_param_offset: u32,
    /// Offset of the command parameter blob
    pub command_param_offset: u32,
}

impl GrammarHeader {
    /// Encode one header copy
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(&self.trigger_model_offset.to_be_bytes());
        out[4..8].copy_from_slice(&self.trigger_model_size.to_be_bytes());
        out[8..12].copy_from_slice(&self.command_model_offset.to_be_bytes());
        out[12..16].copy_from_slice(&self.command_model_size.to_be_bytes());
        out[16..48].copy_from_slice(&self.description);
        out[48..52].copy_from_slice(&self.version.to_be_bytes());
        out[52..54].copy_from_slice(&self.num_triggers.to_le_bytes());
        out[54..56].copy_from_slice(&self.num_commands.to_le_bytes());
        out[56..60].copy_from_slice(&self.trigger_param_offset.to_be_bytes());
        out[60..64].copy_from_slice(&self.command_param_offset.to_be_bytes());
        out
    }

    /// Parse one header copy
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(Error::BadImage);
        }
        let u32_at = |i: usize| u32::from_be_bytes([data[i], data[i + 1], data[i + 2], data[i + 3]]);
        let mut description = [0u8; DESCRIPTION_LEN];
        description.copy_from_slice(&data[16..48]);

        Ok(Self {
            trigger_model_offset: u32_at(0),
            trigger_model_size: u32_at(4),
            command_model_offset: u32_at(8),
            command_model_size: u32_at(12),
            description,
            version: u32_at(48),
            num_triggers: i16::from_le_bytes([data[52], data[53]]),
            num_commands: i16::from_le_bytes([data[54], data[55]]),
            trigger_param_offset: u32_at(56),
            command_param_offset: u32_at(60),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_round_trip() {
        let mut description = [0u8; DESCRIPTION_LEN];
        description[..5].copy_from_slice(b"hello");
        let hdr = GrammarHeader {
            trigger_model_offset: BLOB_BASE_OFFSET,
            trigger_model_size: 0x1234,
            command_model_offset: 0x1370,
            command_model_size: 0x80,
            description,
            version: 1,
            num_triggers: 0,
            num_commands: 0,
            trigger_param_offset: 0x1364,
            command_param_offset: 0x13F0,
        };
        let bytes = hdr.encode();
        assert_eq!(bytes.len(), HEADER_LEN);
        assert_eq!(GrammarHeader::parse(&bytes).unwrap(), hdr);
    }

    #[test]
    fn test_offsets_are_big_endian() {
        let hdr = GrammarHeader {
            trigger_model_offset: 0x0000_0080,
            trigger_model_size: 0,
            command_model_offset: 0,
            command_model_size: 0,
            description: [0; DESCRIPTION_LEN],
            version: 1,
            num_triggers: 0,
            num_commands: 0,
            trigger_param_offset: 0,
            command_param_offset: 0,
        };
        let bytes = hdr.encode();
        assert_eq!(&bytes[0..4], &[0x00, 0x00, 0x00, 0x80]);
        assert_eq!(&bytes[48..52], &[0x00, 0x00, 0x00, 0x01]);
    }
}
