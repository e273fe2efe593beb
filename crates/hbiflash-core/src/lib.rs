//! hbiflash-core - Core library for HBI voice-processor programming
//!
//! This crate implements the HBI framed command protocol used to configure
//! and reprogram Vproc voice-processing devices over their serial control
//! bus: register access, the privileged host-command handshake, chunked
//! image loading, grammar segment loading, and the offline image compiler
//! that produces the images the loader consumes. It is designed to be
//! `no_std` compatible for use on embedded host controllers.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable heap allocation, required by the image compiler
//!
//! # Example
//!
//! ```ignore
//! use hbiflash_core::device::VprocDevice;
//! use hbiflash_core::image::loader::{ImageLoader, SCRATCH_LEN};
//! use hbiflash_core::regmap;
//!
//! fn load<P: hbiflash_core::port::HbiPort>(port: P, image: &[u8]) {
//!     let mut dev = VprocDevice::new(port);
//!     let fw = dev.read_reg(regmap::CURRENT_FIRMWARE).unwrap();
//!     println!("current firmware register: 0x{:04X}", fw);
//!
//!     let mut scratch = [0u8; SCRATCH_LEN];
//!     let mut loader = ImageLoader::new(&mut scratch);
//!     match loader.load(&mut dev, image) {
//!         Ok(hdr) => println!("loaded {} body bytes", hdr.body_len),
//!         Err(e) => println!("load failed: {}", e),
//!     }
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "alloc")]
pub mod convert;
pub mod device;
pub mod error;
pub mod grammar;
pub mod hbi;
pub mod hostcmd;
pub mod image;
pub mod port;
pub mod regmap;

pub use error::{Error, Result};
