//! Lockspool: hold a user's mail spool lock on behalf of another program.
//!
//! This is the main entry point for the `lockspool` CLI. It parses arguments,
//! sets up logging, runs the hold-lock command, and maps errors to exit codes.

mod cli;
mod commands;

use cli::Cli;
use lockspool::{exit_codes, logging};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    if let Err(err) = logging::init() {
        eprintln!("Warning: {}", err);
    }

    match commands::run(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            eprintln!("lockspool: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
