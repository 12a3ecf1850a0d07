//! Process-wide record of the held spool lock.

use crate::error::{LockSpoolError, Result};
use crate::fs::FileIdentity;
use nix::fcntl::Flock;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::warn;

#[derive(Debug, Clone)]
struct HeldLock {
    path: PathBuf,
    identity: Option<FileIdentity>,
}

/// Single slot naming the lock file this process holds.
///
/// A process holds at most one recipient's lock. The slot is shared (via
/// `Arc`) between the [`Locker`](super::Locker) that fills it, the
/// [`SpoolLock`](super::SpoolLock) guard, and anything else that must be
/// able to release the lock on an exit path the guard does not see, such as
/// a signal handler thread.
#[derive(Debug, Default)]
pub struct LockSlot {
    held: Mutex<Option<HeldLock>>,
}

impl LockSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, Option<HeldLock>> {
        self.held.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    /// Path of the held lock, if any.
    pub fn current(&self) -> Option<PathBuf> {
        self.state().as_ref().map(|held| held.path.clone())
    }

    pub fn is_held(&self) -> bool {
        self.state().is_some()
    }

    /// Run `create` with the slot locked and record the lock file it returns.
    ///
    /// A concurrent [`release`](Self::release) waits until the new file is
    /// recorded, so a lock created by this process is never missed on the way
    /// out. `create` is not called when the slot is already taken.
    ///
    /// # Returns
    ///
    /// * `Ok(Ok(file))` - The lock file was created and is now held
    /// * `Ok(Err(e))` - `create` failed; the slot stays empty
    /// * `Err(LockSpoolError::AlreadyHeld)` - This process already holds a lock
    pub(crate) fn fill_with<F>(&self, path: &Path, create: F) -> Result<io::Result<Flock<File>>>
    where
        F: FnOnce() -> io::Result<Flock<File>>,
    {
        let mut state = self.state();
        if let Some(held) = state.as_ref() {
            return Err(LockSpoolError::AlreadyHeld(held.path.clone()));
        }

        let file = match create() {
            Ok(file) => file,
            Err(e) => return Ok(Err(e)),
        };
        *state = Some(HeldLock {
            path: path.to_path_buf(),
            identity: FileIdentity::of_file(&file).ok(),
        });
        Ok(Ok(file))
    }

    /// Unlink the held lock file and clear the slot.
    ///
    /// Returns `Ok(false)` when nothing was unlinked: the slot was empty, the
    /// file is already gone, or the path now names a different file (in which
    /// case it belongs to someone else and is left alone).
    pub fn release(&self) -> io::Result<bool> {
        let Some(held) = self.state().take() else {
            return Ok(false);
        };

        if let Some(expected) = held.identity {
            match FileIdentity::of_entry(&held.path) {
                Ok(current) if current.same_inode(&expected) => {}
                Ok(_) => {
                    warn!(
                        path = %held.path.display(),
                        "lock path no longer names our lock file; leaving it in place"
                    );
                    return Ok(false);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
                Err(e) => return Err(e),
            }
        }

        match fs::remove_file(&held.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}
