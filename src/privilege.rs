//! Effective-uid switching.
//!
//! Work on attacker-writable spool entries is done under the uid of the user
//! the lock belongs to, never under the base (usually root) identity. The
//! [`PrivilegeGuard`] makes that scoped: it switches on creation and always
//! switches back.

use crate::error::{LockSpoolError, Result};
use nix::errno::Errno;
use nix::unistd::{self, Uid};
use tracing::error;

/// Capability to read and set the process's effective uid.
pub trait Credentials {
    fn effective_uid(&self) -> Uid;

    fn set_effective_uid(&self, uid: Uid) -> nix::Result<()>;
}

/// The calling process's real credentials (`geteuid`/`seteuid`).
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCredentials;

impl Credentials for ProcessCredentials {
    fn effective_uid(&self) -> Uid {
        unistd::geteuid()
    }

    fn set_effective_uid(&self, uid: Uid) -> nix::Result<()> {
        unistd::seteuid(uid)
    }
}

/// Switch the effective uid, verifying that the switch took effect.
fn switch_to<C: Credentials + ?Sized>(credentials: &C, uid: Uid) -> Result<()> {
    if credentials.effective_uid() == uid {
        return Ok(());
    }

    let failed = |source| LockSpoolError::PrivilegeSwitchFailed {
        uid: uid.as_raw(),
        source,
    };
    credentials.set_effective_uid(uid).map_err(failed)?;
    if credentials.effective_uid() != uid {
        return Err(failed(Errno::EPERM));
    }
    Ok(())
}

/// Scoped narrowing of the effective uid.
///
/// Restores the base uid (the effective uid when the guard was created) on
/// [`restore`](Self::restore) or on drop. A failed restore during drop aborts
/// the process rather than continue with the wrong identity.
pub struct PrivilegeGuard<'a, C: Credentials + ?Sized> {
    credentials: &'a C,
    base: Uid,
    target: Uid,
    restored: bool,
}

impl<'a, C: Credentials + ?Sized> PrivilegeGuard<'a, C> {
    /// Switch the effective uid to `target`.
    pub fn narrow(credentials: &'a C, target: Uid) -> Result<Self> {
        let guard = Self {
            credentials,
            base: credentials.effective_uid(),
            target,
            restored: false,
        };
        switch_to(credentials, target)?;
        Ok(guard)
    }

    pub fn base(&self) -> Uid {
        self.base
    }

    pub fn target(&self) -> Uid {
        self.target
    }

    /// Run `f` as `uid`, then return to the narrowed identity.
    ///
    /// Goes through the base identity in both directions: an unprivileged
    /// effective uid may not switch directly to another unprivileged one.
    pub fn as_user<T>(&mut self, uid: Uid, f: impl FnOnce() -> T) -> Result<T> {
        switch_to(self.credentials, self.base)?;
        switch_to(self.credentials, uid)?;
        let out = f();
        switch_to(self.credentials, self.base)?;
        switch_to(self.credentials, self.target)?;
        Ok(out)
    }

    /// Switch back to the base identity.
    pub fn restore(mut self) -> Result<()> {
        self.restored = true;
        switch_to(self.credentials, self.base)
    }
}

impl<C: Credentials + ?Sized> Drop for PrivilegeGuard<'_, C> {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(e) = switch_to(self.credentials, self.base) {
            error!(base = self.base.as_raw(), error = %e, "cannot restore effective uid");
            std::process::abort();
        }
    }
}
