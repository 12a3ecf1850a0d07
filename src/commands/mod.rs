//! The hold-lock command.
//!
//! The parent program starts `lockspool`, reads one status line from its
//! stdout (`1` = locked, `0` = failed), and closes its stdin when it is done
//! with the mailbox. Termination signals release the lock too.

mod signals;

use crate::cli::Cli;
use lockspool::config::Config;
use lockspool::error::{LockSpoolError, Result};
use lockspool::locks::{LockSlot, Locker, SpoolLock};
use nix::unistd::{self, Uid, User};
use std::io::{self, Read, Write};
use std::sync::Arc;
use tracing::debug;

/// The account whose spool is locked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub name: String,
    pub uid: Uid,
}

/// Run lockspool with parsed arguments.
pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let recipient = resolve_recipient(cli.user.as_deref(), unistd::getuid())?;

    let slot = Arc::new(LockSlot::new());
    signals::spawn_watcher(Arc::clone(&slot))?;

    let locker = Locker::new(config, slot);
    let lock = match locker.acquire(&recipient.name, recipient.uid) {
        Ok(lock) => lock,
        Err(e) => {
            let _ = report_status(&mut io::stdout().lock(), false);
            return Err(e);
        }
    };

    hold(lock, io::stdin().lock(), io::stdout().lock())
}

/// Load the configuration file (if any) and apply command-line overrides.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(spool_dir) = &cli.spool_dir {
        config.spool_dir = spool_dir.clone();
        config.validate()?;
    }

    Ok(config)
}

/// Find the account to lock for.
///
/// Without a name the account of `real_uid` is used. Naming an account is
/// reserved to root so users cannot hold each other's mailboxes hostage.
pub fn resolve_recipient(requested: Option<&str>, real_uid: Uid) -> Result<Recipient> {
    let lookup_failed =
        |e: nix::Error| LockSpoolError::UserError(format!("failed to read user database: {}", e));

    let user = match requested {
        Some(name) => {
            if !real_uid.is_root() {
                return Err(LockSpoolError::UserError(
                    "you must be root to lock someone else".to_string(),
                ));
            }
            User::from_name(name)
                .map_err(lookup_failed)?
                .ok_or_else(|| LockSpoolError::UserError(format!("no such user '{}'", name)))?
        }
        None => User::from_uid(real_uid).map_err(lookup_failed)?.ok_or_else(|| {
            LockSpoolError::UserError(format!("no passwd entry for uid {}", real_uid))
        })?,
    };

    Ok(Recipient {
        name: user.name,
        uid: user.uid,
    })
}

fn report_status<W: Write>(output: &mut W, locked: bool) -> io::Result<()> {
    writeln!(output, "{}", if locked { 1 } else { 0 })?;
    output.flush()
}

/// Announce the lock, wait for end of input, then release.
fn hold<R: Read, W: Write>(lock: SpoolLock, mut input: R, mut output: W) -> Result<()> {
    report_status(&mut output, true).map_err(|e| {
        LockSpoolError::UserError(format!("failed to report lock status: {}", e))
    })?;

    debug!(path = %lock.path().display(), "holding lock until stdin closes");
    wait_for_eof(&mut input);

    lock.release()
}

/// Consume input until end-of-file or a read error.
fn wait_for_eof<R: Read>(input: &mut R) {
    let mut buf = [0u8; 512];
    loop {
        match input.read(&mut buf) {
            Ok(0) => return,
            Ok(_) => continue,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => return,
        }
    }
}
