//! Configuration record encoding
//!
//! Turns "register, value" hex pairs into fixed-size blocks of pre-framed
//! paged writes. Registers inside a block must stay contiguous within a
//! tolerance of 2 address units; a larger gap, or running out of input,
//! pads the rest of the block with no-op words and records the reduced
//! word count in the command. The device skips the no-op filler.

use alloc::vec::Vec;

use super::parse_hex_u16;
use crate::device::DeviceEndian;
use crate::error::{Error, Result};
use crate::hbi::opcodes;
use crate::image::{ImageHeader, ImageType};

/// No-op filler word
const NO_OP_WORD: u16 = 0xFFFF;

/// Largest register gap still treated as contiguous within a block
const CONTIGUOUS_TOLERANCE: u16 = 2;

/// Config block sizes accepted by the device, in 16-bit words
pub fn is_valid_config_block_size(words: u16) -> bool {
    (1..=128).contains(&words) && words.is_power_of_two()
}

struct Block {
    reg: u16,
    values: Vec<u16>,
    /// Words the command actually writes; filler beyond it is skipped
    used: usize,
}

/// Compile a configuration record source into a loadable image
///
/// Each source line is `register, value` in hex; lines starting with `;`
/// are comments. `block_words` must satisfy [`is_valid_config_block_size`].
pub fn compile_config(source: &str, block_words: u16, device_code: u16) -> Result<Vec<u8>> {
    if !is_valid_config_block_size(block_words) {
        return Err(Error::InvalidArgument);
    }
    let n = block_words as usize;

    let mut blocks: Vec<Block> = Vec::new();
    let mut open: Option<Block> = None;
    let mut prev_reg: Option<u16> = None;

    for line in source.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        let (reg, value) = parse_entry(line)?;

        // a gap inside an open block becomes a hole: pad and start over
        if let (Some(block), Some(prev)) = (open.as_mut(), prev_reg) {
            if reg.wrapping_sub(prev) > CONTIGUOUS_TOLERANCE {
                block.used = block.values.len();
                block.values.resize(n, NO_OP_WORD);
                blocks.push(open.take().unwrap());
            }
        }

        let block = open.get_or_insert_with(|| Block {
            reg,
            values: Vec::with_capacity(n),
            used: n,
        });
        block.values.push(value);
        if block.values.len() == n {
            blocks.push(open.take().unwrap());
        }
        prev_reg = Some(reg);
    }

    // input ended inside a block: pad it like a hole
    if let Some(mut block) = open.take() {
        block.used = block.values.len();
        block.values.resize(n, NO_OP_WORD);
        blocks.push(block);
    }

    let mut body = Vec::with_capacity(blocks.len() * 2 * (n + 2));
    for block in &blocks {
        let page = (block.reg >> 8) as u8;
        let offset = ((block.reg & 0xFF) >> 1) as u8;
        body.extend_from_slice(&opcodes::select_page(page.wrapping_sub(1)));
        body.extend_from_slice(&opcodes::paged_write(offset, block.used as u8 - 1));
        for value in &block.values {
            body.extend_from_slice(&value.to_be_bytes());
        }
    }

    let header = ImageHeader {
        major: 0,
        minor: 0,
        image_type: ImageType::Config,
        endian: DeviceEndian::Big,
        device_code,
        // the loader streams whole framed blocks: command words included
        block_words: block_words + 2,
        body_len: body.len() as u32,
    };

    let mut out = Vec::with_capacity(12 + body.len());
    out.extend_from_slice(&header.encode());
    out.extend_from_slice(&body);
    Ok(out)
}

fn parse_entry(line: &str) -> Result<(u16, u16)> {
    let mut fields = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty());
    let reg = parse_hex_u16(fields.next().ok_or(Error::InvalidArgument)?)?;
    let value = parse_hex_u16(fields.next().ok_or(Error::InvalidArgument)?)?;
    Ok((reg, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::HEADER_LEN;

    #[test]
    fn test_full_block_layout() {
        let source = "0x0300, 0x0001\n0x0302, 0x0002\n0x0304, 0x0003\n0x0306, 0x0004\n";
        let image = compile_config(source, 4, 38051).unwrap();

        let header = ImageHeader::parse(&image).unwrap();
        assert_eq!(header.image_type, ImageType::Config);
        assert_eq!(header.block_words, 6);
        assert_eq!(header.body_len, 12);

        let body = &image[HEADER_LEN..];
        // select page 3 (wire 2), offset 0, 4 words
        assert_eq!(&body[..4], &[0xFE, 0x02, 0x00, 0x80 | 3]);
        assert_eq!(
            &body[4..12],
            &[0x00, 0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0x04]
        );
    }

    #[test]
    fn test_register_gap_pads_and_splits() {
        // gap of 6 after the second entry: hole
        let source = "0x0300, 0x0001\n0x0302, 0x0002\n0x0308, 0x0003\n";
        let image = compile_config(source, 4, 38051).unwrap();
        let body = &image[HEADER_LEN..];

        // first block: reduced count of 2 words, remainder no-op filler
        assert_eq!(&body[..4], &[0xFE, 0x02, 0x00, 0x80 | 1]);
        assert_eq!(
            &body[4..12],
            &[0x00, 0x01, 0x00, 0x02, 0xFF, 0xFF, 0xFF, 0xFF]
        );
        // second block starts at the new register with one word used
        assert_eq!(&body[12..16], &[0xFE, 0x02, 0x04, 0x80]);
        assert_eq!(
            &body[16..24],
            &[0x00, 0x03, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_gap_within_tolerance_is_contiguous() {
        let source = "0x0300, 0x0001\n0x0302, 0x0002\n";
        let image = compile_config(source, 2, 38051).unwrap();
        let body = &image[HEADER_LEN..];
        assert_eq!(body.len(), 8);
        assert_eq!(&body[..4], &[0xFE, 0x02, 0x00, 0x80 | 1]);
    }

    #[test]
    fn test_trailing_partial_block_padded() {
        let source = "0x0300, 0x00AA\n";
        let image = compile_config(source, 4, 38051).unwrap();
        let body = &image[HEADER_LEN..];

        assert_eq!(&body[..4], &[0xFE, 0x02, 0x00, 0x80]);
        assert_eq!(
            &body[4..12],
            &[0x00, 0xAA, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let source = "; config record\n\n0x0300, 0x0001\n";
        let image = compile_config(source, 1, 38051).unwrap();
        assert_eq!(ImageHeader::parse(&image).unwrap().body_len, 6);
    }

    #[test]
    fn test_compile_is_idempotent() {
        let source = "0x0300, 0x0001\n0x0302, 0x0002\n0x0400, 0x0003\n";
        assert_eq!(
            compile_config(source, 4, 38051).unwrap(),
            compile_config(source, 4, 38051).unwrap()
        );
    }

    #[test]
    fn test_invalid_block_size_rejected() {
        assert_eq!(compile_config("", 3, 38051), Err(Error::InvalidArgument));
        assert_eq!(compile_config("", 256, 38051), Err(Error::InvalidArgument));
    }
}
