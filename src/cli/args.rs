// CLASSIFICATION: COMMUNITY
// Filename: args.rs v1.1
// Date Modified: 2026-10-19
// Author: Lukas Bower

use clap::{Arg, ArgMatches, Command};

use crate::config::{TimeoutConfig, DEFAULT_TIMEOUT, MAX_TIMEOUT};

/// Builds and returns the CLI argument parser for micboot.
pub fn build_cli() -> Command {
    Command::new("micboot")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Boot MIC 0 with a custom image and watch its GDDR status region")
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .help(format!(
                    "Doorbell timeout in seconds [default: {DEFAULT_TIMEOUT}, max: {MAX_TIMEOUT}]"
                ))
                .value_parser(parse_timeout)
                .allow_negative_numbers(true)
                .required(false),
        )
}

/// Accept any decimal count. Values past `u32::MAX` saturate, and negative
/// counts wrap to an out-of-range value; both are clamped later like any
/// other large value.
pub fn parse_timeout(raw: &str) -> Result<u32, String> {
    let trimmed = raw.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{raw}' is not a number of seconds"));
    }
    if negative && digits.bytes().any(|b| b != b'0') {
        return Ok(u32::MAX);
    }
    Ok(digits.parse::<u32>().unwrap_or(u32::MAX))
}

/// Timeout selected by `matches`, falling back to the default.
pub fn timeout_from(matches: &ArgMatches) -> TimeoutConfig {
    let requested = matches
        .get_one::<u32>("timeout")
        .copied()
        .unwrap_or(DEFAULT_TIMEOUT);
    TimeoutConfig::new(requested)
}
