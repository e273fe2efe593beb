//! HBI wire format
//!
//! The on-the-wire encoding of the framed command protocol: opcode bytes and
//! the 2/4-byte command header built for every register access. The offline
//! image compiler in [`crate::convert`] is an independent producer of the
//! same wire format; the two are tested against each other.

pub mod frame;
pub mod opcodes;

pub use frame::{encode_header, Access, CommandHeader, MAX_ACCESS_LEN};
