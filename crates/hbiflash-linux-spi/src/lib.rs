//! hbiflash-linux-spi - Linux spidev port
//!
//! This crate drives the Vproc control bus through the `/dev/spidevX.Y`
//! character device interface, where X is the bus number and Y the chip
//! select.
//!
//! # Example
//!
//! ```no_run
//! use hbiflash_linux_spi::{LinuxSpi, LinuxSpiConfig};
//! use hbiflash_core::device::VprocDevice;
//!
//! // Open with default settings (20 MHz, mode 0)
//! let spi = LinuxSpi::open_device("/dev/spidev0.0")?;
//!
//! // Or with custom settings
//! let config = LinuxSpiConfig::new("/dev/spidev0.0")
//!     .with_speed(4_000_000)  // 4 MHz
//!     .with_mode(0);
//! let spi = LinuxSpi::open(&config)?;
//!
//! let mut dev = VprocDevice::new(spi);
//! let fw = dev.read_reg(0x0028)?;
//! println!("current firmware register: 0x{:04X}", fw);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with the hbiflash CLI
//!
//! ```bash
//! # Read a register using default settings
//! hbiflash read -p linux_spi:dev=/dev/spidev0.0 -a 0x0028
//!
//! # Specify SPI speed in kHz and mode
//! hbiflash load -p linux_spi:dev=/dev/spidev0.0,spispeed=4000,mode=0 -i firmware.bin
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with spidev support enabled (`CONFIG_SPI_SPIDEV`)
//! - Read/write access to `/dev/spidevX.Y`
//! - May require adding the user to the `spi` group or udev rules

pub mod device;
pub mod error;

// Re-exports
pub use device::{mode, parse_options, LinuxSpi, LinuxSpiConfig};
pub use error::{LinuxSpiError, Result};
