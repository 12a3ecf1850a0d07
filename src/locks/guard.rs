//! RAII guard for a held spool lock.

use super::slot::LockSlot;
use crate::error::{LockSpoolError, Result};
use nix::fcntl::Flock;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// A held spool lock.
///
/// Owns the exclusively created, `flock`-ed lock file. When dropped, the lock
/// file is unlinked through the process-wide [`LockSlot`]. If deletion fails
/// during drop, a warning is logged but no panic occurs.
pub struct SpoolLock {
    path: PathBuf,
    /// Kept open to hold the flock.
    _file: Flock<File>,
    slot: Arc<LockSlot>,
    released: bool,
}

impl SpoolLock {
    /// Wrap a lock file already recorded in `slot`.
    pub(super) fn new(path: PathBuf, file: Flock<File>, slot: Arc<LockSlot>) -> Self {
        Self {
            path,
            _file: file,
            slot,
            released: false,
        }
    }

    /// Get the path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock, reporting unlink errors instead of logging them.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.slot
            .release()
            .map(|_| ())
            .map_err(|source| LockSpoolError::ReleaseFailed {
                path: self.path.clone(),
                source,
            })
    }
}

impl fmt::Debug for SpoolLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpoolLock")
            .field("path", &self.path)
            .field("released", &self.released)
            .finish()
    }
}

impl Drop for SpoolLock {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = self.slot.release()
        {
            warn!(path = %self.path.display(), error = %e, "failed to release lock");
        }
    }
}
