//! Release the spool lock when the process is told to terminate.
//!
//! Termination signals are blocked in every thread and collected by a
//! dedicated watcher with `sigwait(2)`, so the release runs as ordinary code
//! rather than inside an async-signal handler.

use lockspool::error::{LockSpoolError, Result};
use lockspool::exit_codes;
use lockspool::locks::LockSlot;
use nix::sys::signal::{SigSet, Signal};
use std::sync::Arc;
use std::thread;
use tracing::{error, warn};

const TERMINATION_SIGNALS: [Signal; 4] = [
    Signal::SIGHUP,
    Signal::SIGINT,
    Signal::SIGQUIT,
    Signal::SIGTERM,
];

/// Block termination signals and start the watcher thread.
///
/// Must run before any other thread is spawned so they inherit the mask.
pub(crate) fn spawn_watcher(slot: Arc<LockSlot>) -> Result<()> {
    let mut signals = SigSet::empty();
    for signal in TERMINATION_SIGNALS {
        signals.add(signal);
    }
    signals.thread_block().map_err(|e| {
        LockSpoolError::UserError(format!("failed to block termination signals: {}", e))
    })?;

    thread::Builder::new()
        .name("signal-watcher".to_string())
        .spawn(move || match signals.wait() {
            Ok(signal) => {
                warn!(signal = ?signal, "terminating; releasing spool lock");
                if let Err(e) = slot.release() {
                    error!(error = %e, "failed to release lock");
                }
                std::process::exit(exit_codes::SIGNAL_BASE + signal as i32);
            }
            Err(e) => error!(error = %e, "signal watcher stopped"),
        })
        .map_err(|e| {
            LockSpoolError::UserError(format!("failed to start signal watcher: {}", e))
        })?;

    Ok(())
}
