// CLASSIFICATION: COMMUNITY
// Filename: monitor.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Status region monitor.
//!
//! The bootloader prints progress text into a 512-byte GDDR region. The
//! monitor re-reads that region and dumps it to the console forever; an
//! operator stops it with a signal.

use log::trace;
use std::convert::Infallible;
use std::io::Write;

use super::{BootError, Pacer};
use crate::hal::Window;
use crate::utils::hexdump::render_region;

/// Live view of the status region inside a window.
pub struct StatusMonitor<'w, W: Window + ?Sized> {
    window: &'w W,
    offset: usize,
    len: usize,
}

impl<'w, W: Window + ?Sized> StatusMonitor<'w, W> {
    pub fn new(window: &'w W, offset: usize, len: usize) -> Self {
        Self { window, offset, len }
    }

    /// Fresh copy of the region, one volatile read per byte.
    pub fn snapshot(&self) -> Result<Vec<u8>, BootError> {
        let mut bytes = vec![0u8; self.len];
        self.window.read_into(self.offset, &mut bytes)?;
        Ok(bytes)
    }

    /// Read and print one frame.
    pub fn refresh<O: Write + ?Sized>(&self, out: &mut O) -> Result<(), BootError> {
        let bytes = self.snapshot()?;
        render_region(&bytes, out)?;
        out.flush()?;
        Ok(())
    }

    /// Print frames forever, pausing between them.
    ///
    /// Only returns when a read or console write fails.
    pub fn run<O, P>(&self, out: &mut O, pacer: &mut P) -> Result<Infallible, BootError>
    where
        O: Write + ?Sized,
        P: Pacer + ?Sized,
    {
        let mut frames: u64 = 0;
        loop {
            self.refresh(out)?;
            frames += 1;
            trace!("monitor: frame {frames}");
            pacer.pause();
        }
    }
}
