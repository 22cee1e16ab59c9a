// CLASSIFICATION: COMMUNITY
// Filename: mod.rs · micboot boot subsystem
// Date Modified: 2026-10-19
// Author: Lukas Bower
//
// ─────────────────────────────────────────────────────────────
// micboot Boot Subsystem – Root Module
//
// Everything between "window mapped" and "operator hits ^C":
// asking the card to boot, waiting on doorbells, and dumping the
// status region.
//
// ## Current sub‑modules
// * `trigger`  – writes the boot descriptor to the control channel.
// * `doorbell` – bounded polling for milestone cookies.
// * `monitor`  – endless status region dump.
// * `sequence` – the order the above run in.
// ─────────────────────────────────────────────────────────────

use std::io;
use std::thread;
use std::time::Duration;
use thiserror::Error;

use crate::config::ConfigError;
use crate::hal::{HalError, WindowError};

/// Bounded doorbell polling.
pub mod doorbell;
/// Status region dump loop.
pub mod monitor;
/// End-to-end boot sequence.
pub mod sequence;
/// Control channel writes.
pub mod trigger;

pub use doorbell::{wait_for_doorbell, Doorbell, DoorbellError};
pub use monitor::StatusMonitor;
pub use sequence::run;
pub use trigger::{BootDescriptor, ControlChannel, TriggerError};

/// Any failure that ends a boot run.
#[derive(Debug, Error)]
pub enum BootError {
    #[error("invalid layout: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Setup(#[from] HalError),
    #[error(transparent)]
    Trigger(#[from] TriggerError),
    #[error(transparent)]
    Doorbell(#[from] DoorbellError),
    #[error("status region unreadable: {0}")]
    Window(#[from] WindowError),
    #[error("console write failed: {0}")]
    Output(#[from] io::Error),
}

impl BootError {
    /// Process exit status for this failure.
    ///
    /// Failures before the boot request is sent exit with -1, later ones
    /// with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            BootError::Config(_) | BootError::Setup(_) => -1,
            _ => 1,
        }
    }
}

/// Suspension point between samples or frames.
pub trait Pacer {
    fn pause(&mut self);
}

/// Sleeps the calling thread for a fixed interval.
#[derive(Debug, Clone, Copy)]
pub struct ThreadPacer {
    interval: Duration,
}

impl ThreadPacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Pacer for ThreadPacer {
    fn pause(&mut self) {
        thread::sleep(self.interval);
    }
}
