// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v1.2
// Date Modified: 2026-10-19
// Author: Lukas Bower

//! CLI module for micboot. Exports the argument parser and main entry.

pub mod args;

use env_logger::Env;
use log::LevelFilter;
use std::convert::Infallible;
use std::io;

use crate::boot::{self, BootError, DoorbellError};
use crate::cli::args::{build_cli, timeout_from};
use crate::config::BootConfig;

/// Initialise `env_logger`; `RUST_LOG` overrides the `warn` default.
pub fn init_logging() {
    let mut builder =
        env_logger::Builder::from_env(Env::default().default_filter_or(LevelFilter::Warn.as_str()));
    builder.format_timestamp_millis();
    let _ = builder.try_init();
}

/// Entry point for the CLI. Parses arguments, loads config and runs the
/// boot sequence on stdout.
pub fn run() -> anyhow::Result<Infallible> {
    let matches = build_cli().get_matches();
    let timeout = timeout_from(&matches);
    let config = BootConfig::from_env();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    Ok(boot::run(&config, timeout, &mut out)?)
}

/// Exit status for an error returned by [`run`].
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<BootError>()
        .map_or(1, BootError::exit_code)
}

/// Line printed on stderr for an error returned by [`run`].
///
/// A doorbell timeout has already been reported on stdout, so it only gets
/// a bare `Exiting`.
pub fn report(err: &anyhow::Error) -> String {
    match err.downcast_ref::<BootError>() {
        Some(BootError::Doorbell(DoorbellError::Timeout { .. })) => "Exiting".to_string(),
        _ => format!("Error: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::HalError;

    #[test]
    fn exit_code_follows_boot_error() {
        let setup = anyhow::Error::from(BootError::from(HalError::Invalid("x")));
        assert_eq!(exit_code(&setup), -1);
        assert_eq!(exit_code(&anyhow::anyhow!("other")), 1);
    }

    #[test]
    fn doorbell_timeout_reports_exiting() {
        let timeout = anyhow::Error::from(BootError::from(DoorbellError::Timeout {
            label: "Weever up and running".into(),
            samples: 3,
        }));
        assert_eq!(report(&timeout), "Exiting");
        assert_eq!(exit_code(&timeout), 1);

        let setup = anyhow::Error::from(BootError::from(HalError::Invalid("no window")));
        assert_eq!(report(&setup), "Error: invalid window request: no window");
    }
}
