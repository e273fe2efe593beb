//! Error types for hbiflash-core
//!
//! This module provides a no_std compatible status type shared by every
//! layer of the driver. The first failure at any layer aborts the remaining
//! sequence; there is no partial-completion bookkeeping.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Driver used before initialisation
    NotInitialized,
    /// Transport or hardware failure
    Transport,
    /// Poll bound exhausted or a buffer was too small
    Resource,
    /// Invalid argument passed to a function call
    InvalidArgument,
    /// A bad reference handle was passed
    BadHandle,
    /// Image is malformed or not present on flash
    BadImage,
    /// No more space left on flash
    FlashFull,
    /// No flash connected to the device
    NoFlashPresent,
    /// The device answered a host command with an unrecognized response
    Command {
        /// Raw response code read from the command result register
        response: u16,
    },
    /// Firmware image is incompatible with the device
    IncompatibleApp,
    /// Driver is in the wrong state for the requested action
    InvalidState,
    /// Operation ended before completing
    Incomplete,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "driver not initialised"),
            Self::Transport => write!(f, "bus transport failure"),
            Self::Resource => write!(f, "poll bound exhausted or buffer too small"),
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::BadHandle => write!(f, "bad handle"),
            Self::BadImage => write!(f, "bad image"),
            Self::FlashFull => write!(f, "no space left on flash"),
            Self::NoFlashPresent => write!(f, "no flash connected to device"),
            Self::Command { response } => {
                write!(f, "host command failed with response 0x{:04X}", response)
            }
            Self::IncompatibleApp => write!(f, "firmware image incompatible with device"),
            Self::InvalidState => write!(f, "invalid state for requested action"),
            Self::Incomplete => write!(f, "operation incomplete"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
