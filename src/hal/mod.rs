// CLASSIFICATION: COMMUNITY
// Filename: mod.rs · HAL
// Date Modified: 2026-10-19
// Author: Lukas Bower
//
// ─────────────────────────────────────────────────────────────
// micboot Hardware Abstraction Layer
//
// Read-only access to device memory exposed through the host's
// physical address space.  All raw pointer access lives in
// `mmio`; everything above it talks to the [`Window`] trait.
//
// ## Public API
// * [`Window`]        – volatile, bounds-checked reads by offset.
// * [`mmio::PhysMem`] – privileged handle used to build windows.
// ─────────────────────────────────────────────────────────────

#![warn(missing_docs)]

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// `/dev/mem` handle and the windows mapped from it.
pub mod mmio;

pub use mmio::{MmioWindow, PhysMem};

/// Errors raised while establishing a window.
#[derive(Debug, Error)]
pub enum HalError {
    /// The physical-memory handle could not be opened.
    #[error("Error opening file {}: {source}", .path.display())]
    Open {
        /// Handle path.
        path: PathBuf,
        /// Underlying OS error.
        source: io::Error,
    },
    /// The mapping call failed.
    #[error("Couldn't map {size} bytes at {base:#x}: {source}")]
    Map {
        /// Requested physical base.
        base: u64,
        /// Requested size in bytes.
        size: usize,
        /// Underlying OS error.
        source: io::Error,
    },
    /// Base or size was unusable before any syscall was attempted.
    #[error("invalid window request: {0}")]
    Invalid(&'static str),
}

/// Errors raised by individual window reads.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WindowError {
    /// The access would run past the end of the window.
    #[error("read of {width} bytes at {offset:#x} exceeds window of {len:#x} bytes")]
    OutOfBounds {
        /// Offset relative to the window base.
        offset: usize,
        /// Access width in bytes.
        width: usize,
        /// Window length.
        len: usize,
    },
    /// The access is not naturally aligned.
    #[error("{width}-byte read at {offset:#x} is misaligned")]
    Misaligned {
        /// Offset relative to the window base.
        offset: usize,
        /// Access width in bytes.
        width: usize,
    },
}

/// A read-only view of device memory.
///
/// Implementations must re-fetch on every call; callers rely on seeing
/// values the device writes between reads.
pub trait Window {
    /// Length of the window in bytes.
    fn len(&self) -> usize;

    /// Returns `true` for an empty window.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Volatile 8-bit read at `offset`.
    fn read8(&self, offset: usize) -> Result<u8, WindowError>;

    /// Volatile, naturally aligned 32-bit read at `offset`.
    fn read32(&self, offset: usize) -> Result<u32, WindowError>;

    /// Fill `buf` with bytes starting at `offset`, one volatile read each.
    fn read_into(&self, offset: usize, buf: &mut [u8]) -> Result<(), WindowError> {
        check_range(offset, buf.len(), self.len())?;
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = self.read8(offset + i)?;
        }
        Ok(())
    }
}

/// Bounds check shared by window implementations.
pub fn check_range(offset: usize, width: usize, len: usize) -> Result<(), WindowError> {
    match offset.checked_add(width) {
        Some(end) if end <= len => Ok(()),
        _ => Err(WindowError::OutOfBounds { offset, width, len }),
    }
}
