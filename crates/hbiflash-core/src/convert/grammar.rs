//! Grammar image packing
//!
//! Builds the grammar blob the segment loader streams into the device: two
//! copies of the header, then trigger model, trigger parameters, command
//! model and command parameters with their alignment padding.

use alloc::vec::Vec;

use crate::grammar::{GrammarHeader, BLOB_BASE_OFFSET, DESCRIPTION_LEN, HEADER_LEN};

/// Source sections of a grammar image; empty slices mean absent sections
#[derive(Debug, Clone, Copy, Default)]
pub struct GrammarSources<'a> {
    /// Trigger acoustic model
    pub trigger_model: &'a [u8],
    /// Trigger model parameter blob
    pub trigger_params: &'a [u8],
    /// Command acoustic model
    pub command_model: &'a [u8],
    /// Command model parameter blob
    pub command_params: &'a [u8],
}

/// Pack grammar sections into a loadable blob
///
/// `description` is truncated to 32 bytes. Parameter blobs are aligned to 4
/// bytes behind their models; the command model itself is aligned to 16
/// bytes.
pub fn build_grammar_image(src: &GrammarSources<'_>, description: &str, version: u32) -> Vec<u8> {
    let trig_model = src.trigger_model.len() as u32;
    let trig_params = src.trigger_params.len() as u32;
    let cmd_model = src.command_model.len() as u32;
    let cmd_params = src.command_params.len() as u32;

    let pad1 = align_gap(trig_model, 4);
    let pad2 = align_gap(trig_model + pad1 + trig_params, 16);
    let pad3 = align_gap(cmd_model, 4);

    let mut header = GrammarHeader {
        trigger_model_offset: 0,
        trigger_model_size: 0,
        command_model_offset: 0,
        command_model_size: 0,
        description: [0u8; DESCRIPTION_LEN],
        version,
        num_triggers: 0,
        num_commands: 0,
        trigger_param_offset: 0,
        command_param_offset: 0,
    };

    if trig_model != 0 {
        header.trigger_model_offset = BLOB_BASE_OFFSET;
        header.trigger_model_size = trig_model;
    }
    if trig_params != 0 {
        header.trigger_param_offset = BLOB_BASE_OFFSET + trig_model + pad1;
    }
    if cmd_model != 0 {
        header.command_model_offset = BLOB_BASE_OFFSET + trig_model + pad1 + trig_params + pad2;
        header.command_model_size = cmd_model;
    }
    if cmd_params != 0 {
        header.command_param_offset =
            BLOB_BASE_OFFSET + trig_model + pad1 + trig_params + pad2 + cmd_model + pad3;
    }

    let desc = description.as_bytes();
    let len = desc.len().min(DESCRIPTION_LEN);
    header.description[..len].copy_from_slice(&desc[..len]);

    let total = BLOB_BASE_OFFSET + trig_model + pad1 + trig_params + pad2 + cmd_model + pad3
        + cmd_params;
    let mut out = Vec::with_capacity(total as usize);

    // two identical header copies lead the blob
    out.extend_from_slice(&header.encode());
    out.extend_from_slice(&header.encode());
    out.extend_from_slice(src.trigger_model);
    out.resize(out.len() + pad1 as usize, 0);
    out.extend_from_slice(src.trigger_params);
    out.resize(out.len() + pad2 as usize, 0);
    out.extend_from_slice(src.command_model);
    out.resize(out.len() + pad3 as usize, 0);
    out.extend_from_slice(src.command_params);

    out
}

fn align_gap(len: u32, align: u32) -> u32 {
    match len % align {
        0 => 0,
        rem => align - rem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_blob_layout_and_alignment() {
        let trigger_model = vec![0xAAu8; 10];
        let trigger_params = vec![0xBBu8; 7];
        let command_model = vec![0xCCu8; 5];
        let command_params = vec![0xDDu8; 3];
        let src = GrammarSources {
            trigger_model: &trigger_model,
            trigger_params: &trigger_params,
            command_model: &command_model,
            command_params: &command_params,
        };

        let blob = build_grammar_image(&src, "test grammar", 1);

        let hdr = GrammarHeader::parse(&blob).unwrap();
        assert_eq!(GrammarHeader::parse(&blob[HEADER_LEN..]).unwrap(), hdr);

        assert_eq!(hdr.trigger_model_offset, 128);
        assert_eq!(hdr.trigger_model_size, 10);
        // trigger params 4-byte aligned after the 10-byte model
        assert_eq!(hdr.trigger_param_offset, 128 + 12);
        // command model 16-byte aligned after model + params
        assert_eq!(hdr.command_model_offset, 128 + 32);
        assert_eq!(hdr.command_model_size, 5);
        // command params 4-byte aligned after the command model
        assert_eq!(hdr.command_param_offset, 128 + 32 + 8);

        assert_eq!(blob.len() as u32, hdr.command_param_offset + 3);
        assert_eq!(&blob[hdr.trigger_model_offset as usize..][..10], &trigger_model[..]);
        assert_eq!(&blob[hdr.command_param_offset as usize..][..3], &command_params[..]);
        // alignment gaps are zero filled
        assert_eq!(&blob[138..140], &[0, 0]);
    }

    #[test]
    fn test_absent_sections_have_zero_offsets() {
        let trigger_model = vec![0x11u8; 8];
        let src = GrammarSources {
            trigger_model: &trigger_model,
            ..Default::default()
        };
        let blob = build_grammar_image(&src, "", 2);
        let hdr = GrammarHeader::parse(&blob).unwrap();

        assert_eq!(hdr.trigger_model_offset, 128);
        assert_eq!(hdr.command_model_offset, 0);
        assert_eq!(hdr.command_model_size, 0);
        assert_eq!(hdr.trigger_param_offset, 0);
        assert_eq!(hdr.command_param_offset, 0);
        assert_eq!(blob.len(), 128 + 8);
    }

    #[test]
    fn test_description_truncated_to_field() {
        let model = vec![0u8; 4];
        let src = GrammarSources {
            trigger_model: &model,
            ..Default::default()
        };
        let long = "a description far longer than the thirty-two byte field allows";
        let blob = build_grammar_image(&src, long, 1);
        let hdr = GrammarHeader::parse(&blob).unwrap();
        assert_eq!(&hdr.description[..], &long.as_bytes()[..32]);
    }
}
