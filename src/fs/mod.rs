//! Filesystem primitives for spool locking.
//!
//! Everything here operates on a single directory entry and never follows a
//! symbolic link at the final path component: the spool may be writable by
//! the users whose mail it holds.

mod exclusive;
mod probe;
mod quarantine;

pub use exclusive::create_locked;
pub use probe::{FileIdentity, is_world_writable, open_existing, symlink_owner};
pub use quarantine::{TriageOutcome, quarantine};
