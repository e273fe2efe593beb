//! S-record line parsing
//!
//! Firmware source images are line-oriented hex records describing a
//! linear memory image. Only data records (S1/S2/S3) and termination
//! records (S7/S8/S9) matter to the encoder; header, count and unknown
//! lines are skipped. Checksums are carried but not verified.

use alloc::vec::Vec;

use crate::error::{Error, Result};

enum Kind {
    Data,
    Termination,
}

/// One parsed source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Data record: `data.len()` bytes at `address`
    Data {
        /// Load address of the first byte
        address: u32,
        /// Record payload
        data: Vec<u8>,
    },
    /// Termination record carrying the execution entry address
    Termination {
        /// Firmware entry address
        entry: u32,
    },
    /// Line that does not contribute to the image
    Skipped,
}

/// Parse a single source line
///
/// Lines that are not S-records, and S-record types outside data and
/// termination, come back as [`Record::Skipped`]. A data or termination
/// record that is truncated or not valid hex is [`Error::InvalidArgument`].
pub fn parse_line(line: &str) -> Result<Record> {
    let line = line.trim();
    let bytes = line.as_bytes();
    if bytes.len() < 4 || bytes[0] != b'S' {
        return Ok(Record::Skipped);
    }

    let (addr_digits, kind) = match bytes[1] {
        b'1' => (4, Kind::Data),
        b'2' => (6, Kind::Data),
        b'3' => (8, Kind::Data),
        b'7' => (8, Kind::Termination),
        b'8' => (6, Kind::Termination),
        b'9' => (4, Kind::Termination),
        _ => return Ok(Record::Skipped),
    };

    let count = hex_field(line, 2, 2)? as usize;
    let addr_bytes = addr_digits / 2;
    // count covers address, payload and one checksum byte
    let payload_len = count
        .checked_sub(addr_bytes + 1)
        .ok_or(Error::InvalidArgument)?;
    if line.len() < 4 + addr_digits + payload_len * 2 {
        return Err(Error::InvalidArgument);
    }

    let address = hex_field(line, 4, addr_digits)?;

    match kind {
        Kind::Termination => Ok(Record::Termination { entry: address }),
        Kind::Data => {
            let mut data = Vec::with_capacity(payload_len);
            for i in 0..payload_len {
                data.push(hex_field(line, 4 + addr_digits + i * 2, 2)? as u8);
            }
            Ok(Record::Data { address, data })
        }
    }
}

fn hex_field(line: &str, start: usize, digits: usize) -> Result<u32> {
    let field = line
        .get(start..start + digits)
        .ok_or(Error::InvalidArgument)?;
    u32::from_str_radix(field, 16).map_err(|_| Error::InvalidArgument)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_s3_data_record() {
        // 4-byte address 0x00000100, data DE AD BE EF
        let rec = parse_line("S30900000100DEADBEEF55").unwrap();
        assert_eq!(
            rec,
            Record::Data {
                address: 0x100,
                data: vec![0xDE, 0xAD, 0xBE, 0xEF],
            }
        );
    }

    #[test]
    fn test_s7_termination_record() {
        let rec = parse_line("S70500000400F6").unwrap();
        assert_eq!(rec, Record::Termination { entry: 0x400 });
    }

    #[test]
    fn test_header_and_unknown_lines_skipped() {
        assert_eq!(parse_line("S00F000068656C6C6F202020202000003C").unwrap(), Record::Skipped);
        assert_eq!(parse_line("S5030001FB").unwrap(), Record::Skipped);
        assert_eq!(parse_line("; comment").unwrap(), Record::Skipped);
        assert_eq!(parse_line("").unwrap(), Record::Skipped);
    }

    #[test]
    fn test_truncated_record_rejected() {
        assert_eq!(parse_line("S30900000100DEAD"), Err(Error::InvalidArgument));
    }
}
