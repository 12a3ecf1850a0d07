//! Exit code constants for the lockspool CLI.
//!
//! - 0: Lock was acquired, held, and released
//! - 1: User error (bad args, unknown user, bad config)
//! - 2: Lock acquisition failure
//! - 3: Effective uid could not be switched or restored
//!
//! A process ended by a termination signal exits with `128 + signo`.

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, unknown user, invalid recipient or config.
pub const USER_ERROR: i32 = 1;

/// Lock acquisition failure: attempts exhausted or spool directory unusable.
pub const LOCK_FAILURE: i32 = 2;

/// Privilege failure: the effective uid could not be switched or restored.
pub const PRIVILEGE_FAILURE: i32 = 3;

/// Base added to a signal number when exiting because of that signal.
pub const SIGNAL_BASE: i32 = 128;
