//! Offline image compilation
//!
//! The producers of the binary formats the loaders consume: the firmware
//! encoder (S-record source), the configuration record encoder
//! ("register, value" source) and the grammar packer. All of them build the
//! body first and synthesize the header once the body length is known, so
//! output never needs a seek-back patch.
//!
//! The encoders and the on-line frame encoder in [`crate::hbi`] are
//! independent implementations of the same wire contract; compiled output
//! streams through [`crate::image::loader`] unmodified.

mod config;
mod firmware;
mod grammar;
pub mod srec;

pub use config::{compile_config, is_valid_config_block_size};
pub use firmware::{compile_firmware, is_valid_firmware_block_size};
pub use grammar::{build_grammar_image, GrammarSources};

use crate::error::{Error, Result};

/// Parse a 16-bit hex value with or without a `0x` prefix
pub fn parse_hex_u16(s: &str) -> Result<u16> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u16::from_str_radix(digits, 16).map_err(|_| Error::InvalidArgument)
}
