//! Image transport
//!
//! [`ImageLoader`] streams a compiled image into the device: it parses the
//! self-describing header, copies the body into the device block by block,
//! and for firmware concludes the load through the host command handshake.
//! Body blocks are pre-framed HBI commands and pass to the port unmodified.
//!
//! Any failure aborts the whole load; there is no partial-transfer
//! checkpoint, a retry restarts from the beginning.

use super::flash;
use super::{ImageHeader, ImageType, HEADER_LEN};
use crate::device::VprocDevice;
use crate::error::{Error, Result};
use crate::hostcmd::{self, cmd, HostCmdResponse};
use crate::port::HbiPort;

/// Scratch buffer size sufficient for the largest image block
pub const SCRATCH_LEN: usize = 256;

/// Loader progression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing loaded yet
    Idle,
    /// Header parsed and accepted
    HeaderParsed,
    /// Body blocks are being streamed
    Streaming,
    /// Firmware load-complete handshake in progress
    Concluding,
    /// Load finished successfully
    Done,
    /// Load aborted; reachable from any state
    Failed,
}

/// Streams one image into the device
///
/// The scratch buffer is caller-owned and must be at least as large as the
/// image's block size; [`SCRATCH_LEN`] always suffices for images built by
/// the compiler in [`crate::convert`].
pub struct ImageLoader<'b> {
    state: LoadState,
    scratch: &'b mut [u8],
}

impl<'b> ImageLoader<'b> {
    /// Create a loader around a caller-owned scratch buffer
    pub fn new(scratch: &'b mut [u8]) -> Self {
        Self {
            state: LoadState::Idle,
            scratch,
        }
    }

    /// Current state of the loader
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Load `image` into the device
    pub fn load<P: HbiPort>(
        &mut self,
        dev: &mut VprocDevice<P>,
        image: &[u8],
    ) -> Result<ImageHeader> {
        self.load_with(dev, image, |_, _| {})
    }

    /// Load `image`, reporting `(bytes_sent, total_bytes)` after each block
    pub fn load_with<P, F>(
        &mut self,
        dev: &mut VprocDevice<P>,
        image: &[u8],
        mut progress: F,
    ) -> Result<ImageHeader>
    where
        P: HbiPort,
        F: FnMut(usize, usize),
    {
        self.state = LoadState::Idle;
        let result = self.run(dev, image, &mut progress);
        if result.is_err() {
            self.state = LoadState::Failed;
        }
        result
    }

    fn run<P, F>(
        &mut self,
        dev: &mut VprocDevice<P>,
        image: &[u8],
        progress: &mut F,
    ) -> Result<ImageHeader>
    where
        P: HbiPort,
        F: FnMut(usize, usize),
    {
        let header = ImageHeader::parse(image)?;
        let block_len = header.block_len();
        if block_len == 0 {
            return Err(Error::BadImage);
        }
        if block_len > self.scratch.len() {
            log::error!(
                "image block size {} exceeds the {}-byte scratch buffer",
                block_len,
                self.scratch.len()
            );
            return Err(Error::Resource);
        }
        self.state = LoadState::HeaderParsed;

        let total = header.body_len as usize;
        let body = image
            .get(HEADER_LEN..HEADER_LEN + total)
            .ok_or(Error::BadImage)?;

        log::info!(
            "sending {:?} image: {} bytes in {}-byte blocks",
            header.image_type,
            total,
            block_len
        );
        self.state = LoadState::Streaming;

        let mut sent = 0;
        while sent < total {
            let chunk_len = block_len.min(total - sent);
            self.scratch[..chunk_len].copy_from_slice(&body[sent..sent + chunk_len]);

            match header.image_type {
                ImageType::Firmware => {
                    // boot mode is re-verified before every chunk
                    flash::switch_to_boot(dev)?;
                    dev.port_mut().write(&self.scratch[..chunk_len])?;
                }
                ImageType::Config => {
                    dev.port_mut().write(&self.scratch[..chunk_len])?;
                }
            }

            sent += chunk_len;
            progress(sent, total);
        }

        if header.image_type == ImageType::Firmware {
            self.state = LoadState::Concluding;
            conclude(dev)?;
        }

        self.state = LoadState::Done;
        log::info!("image loaded into device");
        Ok(header)
    }
}

/// Tell the device the firmware load is complete and check the result
fn conclude<P: HbiPort>(dev: &mut VprocDevice<P>) -> Result<()> {
    hostcmd::run_host_command(dev, cmd::LOAD_COMPLETE)?;

    let response = hostcmd::command_result(dev)?;
    match HostCmdResponse::from_raw(response) {
        Some(HostCmdResponse::Success) => Ok(()),
        Some(HostCmdResponse::IncompatibleApp) => Err(Error::IncompatibleApp),
        _ => Err(Error::Command { response }),
    }
}
