//! Lockspool: crash-safe advisory locking for mail spool directories.
//!
//! A delivery agent locks a recipient's mailbox by exclusively creating
//! `<spool>/<user>.lock`. The spool may be world-writable, so the lock path
//! can hold planted symbolic links, directories or locks abandoned by crashed
//! processes; [`Locker`] handles all of them without ever letting two writers
//! hold the same lock.
//!
//! ```no_run
//! use lockspool::{Config, LockSlot, Locker};
//! use nix::unistd::Uid;
//! use std::sync::Arc;
//!
//! let locker = Locker::new(Config::default(), Arc::new(LockSlot::new()));
//! let lock = locker.acquire("alice", Uid::from_raw(1000))?;
//! // ... append to /var/mail/alice ...
//! lock.release()?;
//! # Ok::<(), lockspool::LockSpoolError>(())
//! ```

pub mod config;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod locks;
pub mod logging;
pub mod privilege;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use error::{LockSpoolError, Result};
pub use locks::{LockSlot, Locker, SpoolLock, TrustMode};
