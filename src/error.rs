//! Error types for lockspool.
//!
//! Uses thiserror for derive macros. Every variant carries the path or uid
//! involved so a failed delivery can be diagnosed from the log line alone.

use crate::exit_codes;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for spool locking operations.
#[derive(Error, Debug)]
pub enum LockSpoolError {
    /// User provided invalid arguments or configuration.
    #[error("{0}")]
    UserError(String),

    /// Recipient name is not usable as a single path component.
    #[error("invalid recipient name '{0}'")]
    InvalidRecipient(String),

    /// The spool directory could not be stat'd.
    #[error("spool directory '{}' is unavailable: {source}", path.display())]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Every attempt to create the lock file failed.
    #[error("{}: lock not acquired after {attempts} attempts: {source}", path.display())]
    AcquisitionExhausted {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: io::Error,
    },

    /// The effective uid could not be switched to or restored from `uid`.
    #[error("failed to switch effective uid to {uid}: {source}")]
    PrivilegeSwitchFailed {
        uid: u32,
        #[source]
        source: nix::Error,
    },

    /// The held lock file could not be unlinked.
    #[error("failed to release lock '{}': {source}", path.display())]
    ReleaseFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// This process already holds a spool lock.
    #[error("a spool lock is already held at '{}'", .0.display())]
    AlreadyHeld(PathBuf),
}

impl LockSpoolError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LockSpoolError::UserError(_) => exit_codes::USER_ERROR,
            LockSpoolError::InvalidRecipient(_) => exit_codes::USER_ERROR,
            LockSpoolError::DirectoryUnavailable { .. } => exit_codes::LOCK_FAILURE,
            LockSpoolError::AcquisitionExhausted { .. } => exit_codes::LOCK_FAILURE,
            LockSpoolError::AlreadyHeld(_) => exit_codes::LOCK_FAILURE,
            LockSpoolError::ReleaseFailed { .. } => exit_codes::LOCK_FAILURE,
            LockSpoolError::PrivilegeSwitchFailed { .. } => exit_codes::PRIVILEGE_FAILURE,
        }
    }
}

/// Result type alias for lockspool operations.
pub type Result<T> = std::result::Result<T, LockSpoolError>;

#[cfg(test)]
mod tests {
    use super::*;
    use nix::errno::Errno;

    #[test]
    fn user_error_has_correct_exit_code() {
        let err = LockSpoolError::UserError("bad argument".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);

        let err = LockSpoolError::InvalidRecipient("../etc".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn lock_errors_have_correct_exit_code() {
        let err = LockSpoolError::AcquisitionExhausted {
            path: PathBuf::from("/var/mail/alice.lock"),
            attempts: 11,
            source: io::Error::from(io::ErrorKind::AlreadyExists),
        };
        assert_eq!(err.exit_code(), exit_codes::LOCK_FAILURE);

        let err = LockSpoolError::DirectoryUnavailable {
            path: PathBuf::from("/var/mail"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(err.exit_code(), exit_codes::LOCK_FAILURE);

        let err = LockSpoolError::AlreadyHeld(PathBuf::from("/var/mail/bob.lock"));
        assert_eq!(err.exit_code(), exit_codes::LOCK_FAILURE);
    }

    #[test]
    fn privilege_error_has_correct_exit_code() {
        let err = LockSpoolError::PrivilegeSwitchFailed {
            uid: 1000,
            source: Errno::EPERM,
        };
        assert_eq!(err.exit_code(), exit_codes::PRIVILEGE_FAILURE);
    }

    #[test]
    fn error_messages_name_the_path() {
        let err = LockSpoolError::AcquisitionExhausted {
            path: PathBuf::from("/var/mail/alice.lock"),
            attempts: 11,
            source: io::Error::from(io::ErrorKind::AlreadyExists),
        };
        let message = err.to_string();
        assert!(message.starts_with("/var/mail/alice.lock: lock not acquired after 11 attempts"));

        let err = LockSpoolError::InvalidRecipient("a/b".to_string());
        assert_eq!(err.to_string(), "invalid recipient name 'a/b'");
    }
}
