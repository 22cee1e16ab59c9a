// CLASSIFICATION: COMMUNITY
// Filename: config.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Boot configuration table.
//!
//! Every address, magic cookie and path the boot sequence touches lives in
//! [`BootConfig`]. The handle paths and boot images may be overridden from
//! the environment; the memory layout may not.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::boot::doorbell::Doorbell;
use crate::boot::trigger::BootDescriptor;

/// Default doorbell timeout in seconds.
pub const DEFAULT_TIMEOUT: u32 = 60;
/// Upper bound applied to any requested timeout.
pub const MAX_TIMEOUT: u32 = 60 * 5;

/// Host physical address of MIC 0's GDDR aperture.
pub const GDDR_PHYS_BASE: u64 = 0x3fc_0000_0000;
/// Bytes of GDDR mapped into the process.
pub const GDDR_WINDOW_SIZE: usize = 512 * 1024 * 1024;

/// Offset of the status region the bootloader prints into.
pub const STATUS_OFFSET: usize = 0x7a_7a70;
/// Bytes dumped from the status region per refresh.
pub const STATUS_LEN: usize = 512;
/// Cookie written by the bootloader at each milestone.
pub const STATUS_OK: u32 = 0xdead_beef;

pub const MEM_PATH: &str = "/dev/mem";
pub const CHANNEL_PATH: &str = "/sys/class/mic/mic0/state";
/// Custom Weever build that hands off to the payload below.
pub const LOADER_IMAGE: &str = "/home/joncon/barrelfish/k1om/sbin/weever";
/// Custom kernel booted in place of the stock MPSS initramfs.
pub const PAYLOAD_IMAGE: &str = "/root/micstuff/naut_setup/nautilus.bin";

/// Errors produced while validating the layout table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("window physical base must be non-zero")]
    ZeroBase,
    #[error("window size must be non-zero")]
    ZeroSize,
    #[error("{what} ends at {end:#x}, beyond the {size:#x}-byte window")]
    OutsideWindow {
        what: String,
        end: usize,
        size: usize,
    },
}

/// Boot milestones, in the order the bootloader signals them.
#[derive(Debug, Clone)]
pub struct Milestones {
    /// Bootloader is up and running.
    pub boot: Doorbell,
    /// Bootloader is about to call its loader.
    pub loader_call: Doorbell,
    /// Loader has returned control. Only waited on after the status
    /// monitor, which never exits, so this one is dormant in practice.
    pub post_loader: Doorbell,
}

impl Default for Milestones {
    fn default() -> Self {
        Self {
            boot: Doorbell::new(STATUS_OFFSET, STATUS_OK, "Weever up and running")
                .announced_as("Waiting for doorbell from Weever in GDDR range"),
            loader_call: Doorbell::new(
                STATUS_OFFSET + 4,
                STATUS_OK,
                "Weever about to call loader",
            )
            .announced_as("Waiting for doorbell from Weever after it calls the 'loader' function"),
            post_loader: Doorbell::new(
                STATUS_OFFSET + 8,
                STATUS_OK,
                "Weever after loader running",
            )
            .announced_as("Waiting for doorbell after loader"),
        }
    }
}

impl Milestones {
    pub fn iter(&self) -> impl Iterator<Item = &Doorbell> {
        [&self.boot, &self.loader_call, &self.post_loader].into_iter()
    }
}

/// Process-wide boot configuration.
#[derive(Debug, Clone)]
pub struct BootConfig {
    /// Privileged physical-memory device.
    pub mem_path: PathBuf,
    /// Card control attribute accepting the boot descriptor.
    pub channel_path: PathBuf,
    pub descriptor: BootDescriptor,
    pub phys_base: u64,
    pub window_size: usize,
    pub status_offset: usize,
    pub status_len: usize,
    pub milestones: Milestones,
    /// Pause between doorbell samples.
    pub poll_interval: Duration,
    /// Pause between status dumps.
    pub render_interval: Duration,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            mem_path: PathBuf::from(MEM_PATH),
            channel_path: PathBuf::from(CHANNEL_PATH),
            descriptor: BootDescriptor::new(LOADER_IMAGE, PAYLOAD_IMAGE),
            phys_base: GDDR_PHYS_BASE,
            window_size: GDDR_WINDOW_SIZE,
            status_offset: STATUS_OFFSET,
            status_len: STATUS_LEN,
            milestones: Milestones::default(),
            poll_interval: Duration::from_secs(1),
            render_interval: Duration::from_secs(2),
        }
    }
}

impl BootConfig {
    /// Default table with `MICBOOT_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(path) = std::env::var("MICBOOT_MEM") {
            cfg.mem_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("MICBOOT_CHANNEL") {
            cfg.channel_path = PathBuf::from(path);
        }
        if let Ok(loader) = std::env::var("MICBOOT_LOADER") {
            cfg.descriptor.loader = loader;
        }
        if let Ok(payload) = std::env::var("MICBOOT_PAYLOAD") {
            cfg.descriptor.payload = payload;
        }
        cfg
    }

    /// Check that every offset dereferenced later lies inside the window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.phys_base == 0 {
            return Err(ConfigError::ZeroBase);
        }
        if self.window_size == 0 {
            return Err(ConfigError::ZeroSize);
        }
        let status_end = self.status_offset.saturating_add(self.status_len);
        if status_end > self.window_size {
            return Err(ConfigError::OutsideWindow {
                what: "status region".into(),
                end: status_end,
                size: self.window_size,
            });
        }
        for bell in self.milestones.iter() {
            let end = bell.offset.saturating_add(4);
            if end > self.window_size {
                return Err(ConfigError::OutsideWindow {
                    what: format!("doorbell '{}'", bell.label),
                    end,
                    size: self.window_size,
                });
            }
        }
        Ok(())
    }
}

/// Doorbell timeout as requested on the command line and as applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    pub requested: u32,
    pub effective: u32,
}

impl TimeoutConfig {
    /// Values above [`MAX_TIMEOUT`] are reduced to it, never rejected.
    pub fn new(requested: u32) -> Self {
        Self {
            requested,
            effective: requested.min(MAX_TIMEOUT),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_clamped() {
        let t = TimeoutConfig::new(1000);
        assert_eq!(t.requested, 1000);
        assert_eq!(t.effective, 300);
        assert_eq!(TimeoutConfig::new(300).effective, 300);
        assert_eq!(TimeoutConfig::new(0).effective, 0);
        assert_eq!(TimeoutConfig::new(u32::MAX).effective, MAX_TIMEOUT);
        assert_eq!(TimeoutConfig::default().effective, DEFAULT_TIMEOUT);
    }

    #[test]
    fn default_layout_is_valid() {
        let cfg = BootConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.milestones.loader_call.offset, cfg.milestones.boot.offset + 4);
        assert_eq!(cfg.milestones.post_loader.offset, cfg.milestones.boot.offset + 8);
    }

    #[test]
    fn milestones_name_weever() {
        let m = Milestones::default();
        let labels: Vec<_> = m.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(
            labels,
            [
                "Weever up and running",
                "Weever about to call loader",
                "Weever after loader running",
            ]
        );
        assert_eq!(m.boot.waiting, "Waiting for doorbell from Weever in GDDR range");
        assert_eq!(m.post_loader.waiting, "Waiting for doorbell after loader");
    }

    #[test]
    fn default_descriptor_is_custom_image() {
        let cfg = BootConfig::default();
        assert_eq!(cfg.descriptor.loader, LOADER_IMAGE);
        assert_eq!(cfg.descriptor.payload, PAYLOAD_IMAGE);
        assert!(cfg.descriptor.payload.ends_with("nautilus.bin"));
    }

    #[test]
    fn rejects_zero_base_and_size() {
        let mut cfg = BootConfig::default();
        cfg.phys_base = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroBase));
        let mut cfg = BootConfig::default();
        cfg.window_size = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroSize));
    }

    #[test]
    fn rejects_status_region_past_window() {
        let mut cfg = BootConfig::default();
        cfg.window_size = STATUS_OFFSET + 100;
        match cfg.validate() {
            Err(ConfigError::OutsideWindow { what, end, .. }) => {
                assert_eq!(what, "status region");
                assert_eq!(end, STATUS_OFFSET + STATUS_LEN);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_doorbell_past_window() {
        let mut cfg = BootConfig::default();
        cfg.status_offset = 0;
        cfg.window_size = STATUS_OFFSET + 8;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::OutsideWindow { .. })
        ));
    }
}
