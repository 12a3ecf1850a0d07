//! CLI argument parsing for lockspool.
//!
//! Uses clap derive macros for declarative argument definitions.
//! The hold-lock implementation is in the `commands` module.

use clap::Parser;
use std::path::PathBuf;

/// Lockspool: hold a user's mail spool lock for another program.
///
/// Prints `1` once the lock is held (or `0` if it could not be acquired),
/// keeps it until standard input is closed, then releases it.
#[derive(Parser, Debug)]
#[command(name = "lockspool")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// User whose spool to lock (default: the invoking user; others require root).
    pub user: Option<String>,

    /// Path to a YAML configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Spool directory, overriding the configuration file.
    #[arg(long, value_name = "DIR")]
    pub spool_dir: Option<PathBuf>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_without_user() {
        let cli = Cli::try_parse_from(["lockspool"]).unwrap();
        assert!(cli.user.is_none());
        assert!(cli.config.is_none());
        assert!(cli.spool_dir.is_none());
    }

    #[test]
    fn parse_user_and_overrides() {
        let cli = Cli::try_parse_from([
            "lockspool",
            "--config",
            "/etc/lockspool.yaml",
            "--spool-dir",
            "/var/spool/mail",
            "alice",
        ])
        .unwrap();

        assert_eq!(cli.user.as_deref(), Some("alice"));
        assert_eq!(cli.config, Some(PathBuf::from("/etc/lockspool.yaml")));
        assert_eq!(cli.spool_dir, Some(PathBuf::from("/var/spool/mail")));
    }

    #[test]
    fn parse_rejects_extra_users() {
        assert!(Cli::try_parse_from(["lockspool", "alice", "bob"]).is_err());
    }
}
