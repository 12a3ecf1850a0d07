//! Spool locking.
//!
//! A recipient's mailbox is locked by creating `<spool>/<recipient>.lock`
//! with **create_new** semantics (exclusive create) and holding an advisory
//! `flock` on it. Two regimes exist, chosen from the spool directory's mode:
//!
//! - **Trusted** (not world-writable): only the privileged owner creates lock
//!   files. Contention is retried with exponential backoff; nothing is evicted.
//! - **Untrusted** (world-writable): any local user can plant entries at the
//!   lock path. The locker narrows its effective uid to the recipient, removes
//!   planted symbolic links, and on the final retry quarantines an entry that
//!   has not changed since before the first attempt.
//!
//! Backoff between attempts is `2^attempt` seconds.
//!
//! # Release
//!
//! The held lock is recorded in a process-wide [`LockSlot`]. Dropping the
//! [`SpoolLock`] guard or calling [`LockSlot::release`] from any other exit
//! path unlinks the file exactly once.

mod backoff;
mod guard;
mod operations;
mod slot;
mod types;


pub use backoff::{Sleeper, ThreadSleeper, backoff_delay};
pub use guard::SpoolLock;
pub use operations::Locker;
pub use slot::LockSlot;
pub use types::{LOCK_SUFFIX, TrustMode, lock_path};
