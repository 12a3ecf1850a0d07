//! Lock path and trust mode.

use crate::error::{LockSpoolError, Result};
use crate::fs::is_world_writable;
use std::fmt;
use std::fs::Metadata;
use std::path::{Path, PathBuf};

/// Suffix shared with every other program that locks mailboxes in the spool.
pub const LOCK_SUFFIX: &str = ".lock";

/// Who can create entries in the spool directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustMode {
    /// Only the privileged owner can write the spool.
    Trusted,
    /// The spool is world-writable; any entry may be hostile.
    Untrusted,
}

impl TrustMode {
    pub fn from_metadata(meta: &Metadata) -> Self {
        if is_world_writable(meta) {
            TrustMode::Untrusted
        } else {
            TrustMode::Trusted
        }
    }
}

impl fmt::Display for TrustMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrustMode::Trusted => write!(f, "trusted"),
            TrustMode::Untrusted => write!(f, "untrusted"),
        }
    }
}

/// `<spool_dir>/<recipient>.lock`.
///
/// The recipient must be a single, non-empty path component.
pub fn lock_path(spool_dir: &Path, recipient: &str) -> Result<PathBuf> {
    if !is_valid_recipient(recipient) {
        return Err(LockSpoolError::InvalidRecipient(recipient.to_string()));
    }
    Ok(spool_dir.join(format!("{}{}", recipient, LOCK_SUFFIX)))
}

fn is_valid_recipient(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\0')
}
