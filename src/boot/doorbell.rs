// CLASSIFICATION: COMMUNITY
// Filename: doorbell.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Doorbell polling.
//!
//! The bootloader on the card signals each milestone by storing a 32-bit
//! cookie at a fixed GDDR offset. The host samples that word once per
//! poll interval until it matches exactly or the timeout runs out.

use log::{debug, warn};
use std::io::{self, Write};
use thiserror::Error;

use super::Pacer;
use crate::config::TimeoutConfig;
use crate::hal::{Window, WindowError};

/// One boot milestone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doorbell {
    /// Offset of the cookie relative to the window base.
    pub offset: usize,
    pub expected: u32,
    pub label: String,
    /// Banner printed before the wait starts.
    pub waiting: String,
}

impl Doorbell {
    pub fn new(offset: usize, expected: u32, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            offset,
            expected,
            waiting: format!("Waiting for doorbell '{label}' at {offset:#x}"),
            label,
        }
    }

    /// Replace the banner printed before the wait.
    pub fn announced_as(mut self, waiting: impl Into<String>) -> Self {
        self.waiting = waiting.into();
        self
    }

    /// Sample the doorbell once.
    pub fn rung<W: Window + ?Sized>(&self, window: &W) -> Result<bool, WindowError> {
        Ok(window.read32(self.offset)? == self.expected)
    }
}

#[derive(Debug, Error)]
pub enum DoorbellError {
    #[error("timeout waiting for '{label}' after {samples} samples")]
    Timeout { label: String, samples: u32 },
    #[error("doorbell '{label}' unreadable: {source}")]
    Window { label: String, source: WindowError },
    #[error("progress output failed: {0}")]
    Output(#[from] io::Error),
}

/// Block until `bell` reads its expected value or the timeout elapses.
///
/// Samples at most `timeout.effective` times and pauses one poll interval
/// after each miss. Returns the number of samples taken on success.
pub fn wait_for_doorbell<W, O, P>(
    window: &W,
    bell: &Doorbell,
    timeout: TimeoutConfig,
    out: &mut O,
    pacer: &mut P,
) -> Result<u32, DoorbellError>
where
    W: Window + ?Sized,
    O: Write + ?Sized,
    P: Pacer + ?Sized,
{
    let mut remaining = timeout.effective;
    let mut samples = 0u32;

    while remaining > 0 {
        samples += 1;
        let rung = bell.rung(window).map_err(|source| DoorbellError::Window {
            label: bell.label.clone(),
            source,
        })?;
        if rung {
            writeln!(out, "OK: {}", bell.label)?;
            debug!("doorbell '{}' rang after {} samples", bell.label, samples);
            return Ok(samples);
        }

        out.write_all(b".")?;
        out.flush()?;

        pacer.pause();
        remaining -= 1;
    }

    writeln!(out, "FAIL: timeout")?;
    warn!(
        "doorbell '{}' at {:#x} never read {:#010x}",
        bell.label, bell.offset, bell.expected
    );
    Err(DoorbellError::Timeout {
        label: bell.label.clone(),
        samples,
    })
}
