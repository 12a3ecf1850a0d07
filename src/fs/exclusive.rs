//! Exclusive create-with-lock.
//!
//! The lock file is created with `O_CREAT | O_EXCL` (`create_new`), which is
//! the only serialization primitive between competing processes. An advisory
//! `flock(LOCK_EX)` is then taken on the fresh descriptor so that other
//! lockers probing an existing entry can tell a live holder from a leftover.

use nix::fcntl::{Flock, FlockArg, OFlag};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

/// Lock files are readable and writable by their owner only.
const LOCK_FILE_MODE: u32 = 0o600;

/// Create `path` exclusively and hold an advisory exclusive lock on it.
///
/// Fails with `AlreadyExists` if any entry (file, directory, link) is present
/// at `path`. The returned handle keeps the `flock` until dropped.
pub fn create_locked(path: &Path) -> io::Result<Flock<File>> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(LOCK_FILE_MODE)
        .custom_flags((OFlag::O_NOFOLLOW | OFlag::O_CLOEXEC).bits())
        .open(path)?;

    match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
        Ok(lock) => Ok(lock),
        Err((_file, errno)) => {
            // Nobody else can know this inode yet; a failure here means the
            // filesystem does not support flock, so do not leave the entry behind.
            let _ = fs::remove_file(path);
            Err(io::Error::from(errno))
        }
    }
}
