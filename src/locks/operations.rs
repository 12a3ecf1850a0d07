//! Lock acquisition.

use super::backoff::{Sleeper, ThreadSleeper, backoff_delay};
use super::guard::SpoolLock;
use super::slot::LockSlot;
use super::types::{TrustMode, lock_path};
use crate::config::Config;
use crate::error::{LockSpoolError, Result};
use crate::fs::{FileIdentity, TriageOutcome, create_locked, open_existing, quarantine, symlink_owner};
use crate::privilege::{Credentials, PrivilegeGuard, ProcessCredentials};
use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};
use nix::unistd::Uid;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Failed attempts tolerated in a root-only spool before giving up.
const TRUSTED_RETRIES: u32 = 10;

/// Failed attempts tolerated in a world-writable spool before giving up.
const UNTRUSTED_RETRIES: u32 = 11;

/// First attempt at which an existing entry is checked for abandonment.
const STALE_CHECK_ATTEMPT: u32 = 10;

/// Acquires per-recipient locks in a spool directory.
///
/// The credentials and sleeper are injectable so the acquisition loops can be
/// driven without root privileges or real waiting.
pub struct Locker<C = ProcessCredentials, S = ThreadSleeper> {
    config: Config,
    slot: Arc<LockSlot>,
    credentials: C,
    sleeper: S,
}

impl Locker {
    /// A locker using the process's real credentials and real sleeping.
    pub fn new(config: Config, slot: Arc<LockSlot>) -> Self {
        Self::with_parts(config, slot, ProcessCredentials, ThreadSleeper)
    }
}

impl<C: Credentials, S: Sleeper> Locker<C, S> {
    pub fn with_parts(config: Config, slot: Arc<LockSlot>, credentials: C, sleeper: S) -> Self {
        Self {
            config,
            slot,
            credentials,
            sleeper,
        }
    }

    pub fn slot(&self) -> &Arc<LockSlot> {
        &self.slot
    }

    #[cfg(test)]
    pub(crate) fn credentials(&self) -> &C {
        &self.credentials
    }

    #[cfg(test)]
    pub(crate) fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Classify the spool directory by its permission bits.
    ///
    /// # Returns
    ///
    /// * `Ok(TrustMode)` - The spool's trust mode
    /// * `Err(LockSpoolError::DirectoryUnavailable)` - The spool cannot be stat'd
    pub fn trust_mode(&self) -> Result<TrustMode> {
        let spool_dir = &self.config.spool_dir;
        fs::metadata(spool_dir)
            .map(|meta| TrustMode::from_metadata(&meta))
            .map_err(|source| {
                error!(path = %spool_dir.display(), error = %source, "spool directory unavailable");
                LockSpoolError::DirectoryUnavailable {
                    path: spool_dir.clone(),
                    source,
                }
            })
    }

    /// Acquire the spool lock for `recipient`, whose account has uid `uid`.
    ///
    /// Blocks with exponential backoff while the lock is contended. The
    /// effective uid on return equals the effective uid on entry.
    ///
    /// # Returns
    ///
    /// * `Ok(SpoolLock)` - The lock is held until released or dropped
    /// * `Err(LockSpoolError::InvalidRecipient)` - `recipient` is not a single path component
    /// * `Err(LockSpoolError::AlreadyHeld)` - This process already holds a spool lock
    /// * `Err(LockSpoolError::DirectoryUnavailable)` - The spool cannot be stat'd
    /// * `Err(LockSpoolError::AcquisitionExhausted)` - Every attempt failed
    /// * `Err(LockSpoolError::PrivilegeSwitchFailed)` - The effective uid could not be switched
    pub fn acquire(&self, recipient: &str, uid: Uid) -> Result<SpoolLock> {
        let path = lock_path(&self.config.spool_dir, recipient)?;
        if let Some(held) = self.slot.current() {
            return Err(LockSpoolError::AlreadyHeld(held));
        }

        let mode = self.trust_mode()?;
        debug!(path = %path.display(), %mode, "acquiring spool lock");

        let file = match mode {
            TrustMode::Trusted => self.acquire_trusted(&path)?,
            TrustMode::Untrusted => self.acquire_untrusted(&path, uid)?,
        };

        Ok(SpoolLock::new(path, file, Arc::clone(&self.slot)))
    }

    /// Only the privileged owner can contend for the lock, so a persistent
    /// entry is load or misconfiguration, never an attack: retry, don't evict.
    fn acquire_trusted(&self, path: &Path) -> Result<Flock<File>> {
        let mut attempt = 0;
        loop {
            let err = match self.slot.fill_with(path, || create_locked(path))? {
                Ok(lock) => return Ok(lock),
                Err(e) => e,
            };

            if attempt >= TRUSTED_RETRIES {
                return Err(self.exhausted(path, attempt + 1, err));
            }

            debug!(path = %path.display(), attempt, error = %err, "lock busy");
            self.sleeper.sleep(backoff_delay(attempt));
            attempt += 1;
        }
    }

    /// Any user can create entries at the lock path. Everything touching it
    /// runs as the recipient; planted links are evicted and an entry that has
    /// not changed since before the first attempt is quarantined as abandoned.
    fn acquire_untrusted(&self, path: &Path, uid: Uid) -> Result<Flock<File>> {
        let mut privilege = PrivilegeGuard::narrow(&self.credentials, uid)?;
        let baseline = FileIdentity::of_entry(path).ok();

        let mut attempt = 0;
        let mut evictions = 0;
        loop {
            if evictions < self.config.link_eviction_limit
                && let Some(owner) = symlink_owner(path)
            {
                evictions += 1;
                warn!(path = %path.display(), owner = owner.as_raw(), "removing symbolic link at lock path");
                if let Err(e) = privilege.as_user(owner, || fs::remove_file(path))? {
                    debug!(path = %path.display(), error = %e, "cannot remove symbolic link");
                }
                continue;
            }

            let err = match self.slot.fill_with(path, || create_locked(path))? {
                Ok(lock) => {
                    if let Err(e) = privilege.restore() {
                        let _ = self.slot.release();
                        return Err(e);
                    }
                    return Ok(lock);
                }
                Err(e) => e,
            };

            if attempt >= UNTRUSTED_RETRIES {
                let exhausted = self.exhausted(path, attempt + 1, err);
                privilege.restore()?;
                return Err(exhausted);
            }

            if attempt >= STALE_CHECK_ATTEMPT {
                self.evict_if_abandoned(path, baseline.as_ref(), &mut privilege)?;
            }

            debug!(path = %path.display(), attempt, error = %err, "lock busy");
            self.sleeper.sleep(backoff_delay(attempt));
            attempt += 1;
        }
    }

    /// Quarantine the entry at `path` if it is the same file that was there
    /// before the first attempt and nobody holds a `flock` on it.
    ///
    /// Only privilege failures are errors; anything else leaves the entry for
    /// the next attempt.
    fn evict_if_abandoned(
        &self,
        path: &Path,
        baseline: Option<&FileIdentity>,
        privilege: &mut PrivilegeGuard<'_, C>,
    ) -> Result<()> {
        let Some(baseline) = baseline else {
            return Ok(());
        };
        let Ok(file) = open_existing(path) else {
            return Ok(());
        };
        let (Ok(opened), Ok(current)) = (FileIdentity::of_file(&file), FileIdentity::of_entry(path))
        else {
            return Ok(());
        };

        if !opened.same_file(&current) || !opened.same_file(baseline) {
            debug!(path = %path.display(), "lock changed since first attempt; treating as held");
            return Ok(());
        }

        let _probe = match Flock::lock(file, FlockArg::LockSharedNonblock) {
            Ok(probe) => Some(probe),
            Err((_, Errno::EWOULDBLOCK)) => {
                debug!(path = %path.display(), "lock is held by a live process");
                return Ok(());
            }
            Err(_) => None,
        };

        let spool_dir = &self.config.spool_dir;
        let prefix = &self.config.quarantine_prefix;
        let outcome = privilege.as_user(opened.owner(), || quarantine(path, spool_dir, prefix))?;
        match outcome {
            TriageOutcome::Removed => {
                warn!(path = %path.display(), owner = opened.uid, "removed abandoned lock")
            }
            TriageOutcome::Quarantined(_) => {}
            TriageOutcome::Failed => {
                warn!(path = %path.display(), "abandoned lock could not be removed")
            }
        }
        Ok(())
    }

    fn exhausted(&self, path: &Path, attempts: u32, source: io::Error) -> LockSpoolError {
        error!(path = %path.display(), attempts, error = %source, "lock not acquired");
        LockSpoolError::AcquisitionExhausted {
            path: path.to_path_buf(),
            attempts,
            source,
        }
    }
}
