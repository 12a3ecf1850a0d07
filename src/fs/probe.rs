//! Inspection of directory entries at a lock path.

use nix::fcntl::OFlag;
use nix::unistd::Uid;
use std::fs::{self, File, Metadata, OpenOptions};
use std::io;
use std::os::unix::fs::{MetadataExt, OpenOptionsExt};
use std::path::Path;

/// World-write permission bit.
const S_IWOTH: u32 = 0o002;

/// Identity of a directory entry as seen by `stat(2)`.
///
/// `ctime` has one-second granularity, so two entries created within the same
/// second on a reused inode compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileIdentity {
    pub dev: u64,
    pub ino: u64,
    pub ctime: i64,
    pub uid: u32,
}

impl FileIdentity {
    pub fn from_metadata(meta: &Metadata) -> Self {
        Self {
            dev: meta.dev(),
            ino: meta.ino(),
            ctime: meta.ctime(),
            uid: meta.uid(),
        }
    }

    /// `lstat` the entry at `path`.
    pub fn of_entry(path: &Path) -> io::Result<Self> {
        fs::symlink_metadata(path).map(|meta| Self::from_metadata(&meta))
    }

    /// `fstat` an open file.
    pub fn of_file(file: &File) -> io::Result<Self> {
        file.metadata().map(|meta| Self::from_metadata(&meta))
    }

    /// Same device and inode.
    pub fn same_inode(&self, other: &FileIdentity) -> bool {
        self.dev == other.dev && self.ino == other.ino
    }

    /// Same device, inode and change time.
    pub fn same_file(&self, other: &FileIdentity) -> bool {
        self.same_inode(other) && self.ctime == other.ctime
    }

    pub fn owner(&self) -> Uid {
        Uid::from_raw(self.uid)
    }
}

/// Whether directory metadata grants write permission to everyone.
pub fn is_world_writable(meta: &Metadata) -> bool {
    meta.mode() & S_IWOTH == S_IWOTH
}

/// Owner of the symbolic link at `path`, or `None` if `path` is not a link.
///
/// Detection goes through `readlink(2)` so the link is never followed.
pub fn symlink_owner(path: &Path) -> Option<Uid> {
    fs::read_link(path).ok()?;
    let meta = fs::symlink_metadata(path).ok()?;
    meta.file_type()
        .is_symlink()
        .then(|| Uid::from_raw(meta.uid()))
}

/// Open an existing entry read-only for inspection.
///
/// Refuses symbolic links and does not block on FIFOs.
pub fn open_existing(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .custom_flags((OFlag::O_NOFOLLOW | OFlag::O_NONBLOCK | OFlag::O_CLOEXEC).bits())
        .open(path)
}
