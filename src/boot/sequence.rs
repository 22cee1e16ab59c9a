// CLASSIFICATION: COMMUNITY
// Filename: sequence.rs v0.4
// Date Modified: 2026-10-19
// Author: Lukas Bower
//
// ─────────────────────────────────────────────────────────────
// micboot · Boot Sequence
//
//  1. Validate the layout table and open /dev/mem.
//  2. Map the GDDR window.
//  3. Write the boot descriptor to the control channel.
//  4. (`handshake` feature) wait for the bootloader doorbells.
//  5. Dump the status region until the process is killed.
//
// The post-loader doorbell would follow step 5 and is therefore
// never reached; [`confirm_post_loader`] is kept for callers that
// drive the steps themselves.
// ─────────────────────────────────────────────────────────────

use log::{debug, info};
use std::convert::Infallible;
use std::io::Write;

use super::doorbell::{wait_for_doorbell, Doorbell};
use super::monitor::StatusMonitor;
use super::trigger::ControlChannel;
use super::{BootError, Pacer, ThreadPacer};
use crate::config::{BootConfig, TimeoutConfig};
use crate::hal::{PhysMem, Window};

/// Run the full sequence, writing operator output to `out`.
///
/// Never returns on success; the status dump runs until the process is
/// signalled.
pub fn run<O: Write + ?Sized>(
    config: &BootConfig,
    timeout: TimeoutConfig,
    out: &mut O,
) -> Result<Infallible, BootError> {
    config.validate()?;
    info!(
        "doorbell timeout {}s (requested {}s)",
        timeout.effective, timeout.requested
    );

    let mem = PhysMem::open(&config.mem_path)?;
    writeln!(
        out,
        "Mapping MIC 0 MMIO memory range ({} bytes at {:#x})",
        config.window_size, config.phys_base
    )?;
    let window = mem.map(config.phys_base, config.window_size)?;

    boot_card(config, out)?;

    #[cfg(feature = "handshake")]
    confirm_loader(
        &window,
        config,
        timeout,
        out,
        &mut ThreadPacer::new(config.poll_interval),
    )?;

    writeln!(out, "Dump of status prints:")?;
    let monitor = StatusMonitor::new(&window, config.status_offset, config.status_len);
    monitor.run(out, &mut ThreadPacer::new(config.render_interval))
}

/// Ask the card to boot, printing `OK` or `FAIL` after the banner.
pub fn boot_card<O: Write + ?Sized>(config: &BootConfig, out: &mut O) -> Result<(), BootError> {
    let channel = ControlChannel::new(&config.channel_path);
    if let Ok(state) = channel.state() {
        debug!("card state before boot: {state}");
    }

    write!(out, "Booting PHI with custom image...")?;
    out.flush()?;
    match channel.trigger(&config.descriptor) {
        Ok(()) => {
            writeln!(out, "OK")?;
            if let Ok(state) = channel.state() {
                debug!("card state after boot request: {state}");
            }
            Ok(())
        }
        Err(err) => {
            writeln!(out, "FAIL")?;
            Err(err.into())
        }
    }
}

/// Announce and wait for a single milestone.
pub fn confirm<W, O, P>(
    window: &W,
    bell: &Doorbell,
    timeout: TimeoutConfig,
    out: &mut O,
    pacer: &mut P,
) -> Result<u32, BootError>
where
    W: Window + ?Sized,
    O: Write + ?Sized,
    P: Pacer + ?Sized,
{
    writeln!(out, "{} (timeout={}s)", bell.waiting, timeout.effective)?;
    Ok(wait_for_doorbell(window, bell, timeout, out, pacer)?)
}

/// Wait for the bootloader to come up and then to reach its loader call.
pub fn confirm_loader<W, O, P>(
    window: &W,
    config: &BootConfig,
    timeout: TimeoutConfig,
    out: &mut O,
    pacer: &mut P,
) -> Result<(), BootError>
where
    W: Window + ?Sized,
    O: Write + ?Sized,
    P: Pacer + ?Sized,
{
    confirm(window, &config.milestones.boot, timeout, out, pacer)?;
    confirm(window, &config.milestones.loader_call, timeout, out, pacer)?;
    Ok(())
}

/// Wait for the bootloader to report back after its loader ran.
pub fn confirm_post_loader<W, O, P>(
    window: &W,
    config: &BootConfig,
    timeout: TimeoutConfig,
    out: &mut O,
    pacer: &mut P,
) -> Result<u32, BootError>
where
    W: Window + ?Sized,
    O: Write + ?Sized,
    P: Pacer + ?Sized,
{
    confirm(window, &config.milestones.post_loader, timeout, out, pacer)
}
