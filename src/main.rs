// CLASSIFICATION: COMMUNITY
// Filename: main.rs v1.2
// Date Modified: 2026-10-19
// Author: Lukas Bower

//! Entry point for the micboot binary.

use micboot::cli;

fn main() {
    cli::init_logging();
    if let Err(err) = cli::run() {
        eprintln!("{}", cli::report(&err));
        std::process::exit(cli::exit_code(&err));
    }
}
