//! Bus port trait definitions
//!
//! A port is the byte-transfer channel between the host controller and the
//! device: a fixed-rate serial control bus opened and closed outside the
//! core. The core depends only on this narrow interface, never on a
//! particular transport implementation.

use crate::error::Result;
use bitflags::bitflags;

bitflags! {
    /// Port capability flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PortFeatures: u32 {
        /// Reads are performed as a write transfer followed by a read transfer
        const HALF_DUPLEX = 1 << 0;
        /// Reads can clock out while the header clocks in
        const FULL_DUPLEX = 1 << 1;
    }
}

impl Default for PortFeatures {
    fn default() -> Self {
        PortFeatures::empty()
    }
}

/// Blocking byte-transfer channel to the device
///
/// Every transfer blocks until complete. The device exposes a single
/// command/result register pair, so all accesses must funnel through one
/// port serially; implementations are not required to be re-entrant.
pub trait HbiPort {
    /// Get the features supported by this port
    fn features(&self) -> PortFeatures;

    /// Write `tx` to the device in one transaction
    fn write(&mut self, tx: &[u8]) -> Result<()>;

    /// Write `tx`, then read `rx.len()` bytes within the same transaction
    fn exchange(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<()>;

    /// Delay for the specified number of milliseconds
    fn delay_ms(&mut self, ms: u32);
}

impl<T: HbiPort + ?Sized> HbiPort for &mut T {
    fn features(&self) -> PortFeatures {
        (**self).features()
    }

    fn write(&mut self, tx: &[u8]) -> Result<()> {
        (**self).write(tx)
    }

    fn exchange(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<()> {
        (**self).exchange(tx, rx)
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}

// Blanket impl for boxed ports to allow trait objects in CLI dispatch
#[cfg(feature = "alloc")]
impl HbiPort for alloc::boxed::Box<dyn HbiPort + Send> {
    fn features(&self) -> PortFeatures {
        (**self).features()
    }

    fn write(&mut self, tx: &[u8]) -> Result<()> {
        (**self).write(tx)
    }

    fn exchange(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<()> {
        (**self).exchange(tx, rx)
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}
