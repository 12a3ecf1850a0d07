use crate::locks::Sleeper;
use crate::privilege::Credentials;
use nix::errno::Errno;
use nix::unistd::Uid;
use std::os::unix::fs::PermissionsExt;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tempfile::TempDir;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poison| poison.into_inner())
}

/// Create a scratch spool directory with the given permission bits.
pub(crate) fn spool_dir(mode: u32) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    std::fs::set_permissions(temp_dir.path(), std::fs::Permissions::from_mode(mode)).unwrap();
    temp_dir
}

type SwitchHook = Box<dyn Fn(u32) + Send + Sync>;

/// Credentials that only record switches instead of calling `seteuid`.
///
/// Filesystem operations in tests still run as the test user. An optional
/// hook runs after every recorded switch with the new uid, which lets a test
/// act at a precise point of an acquisition.
pub(crate) struct RecordingCredentials {
    current: Mutex<Uid>,
    switches: Mutex<Vec<u32>>,
    deny: Option<Uid>,
    hook: Option<SwitchHook>,
}

impl RecordingCredentials {
    pub(crate) fn new(effective: u32) -> Self {
        Self {
            current: Mutex::new(Uid::from_raw(effective)),
            switches: Mutex::new(Vec::new()),
            deny: None,
            hook: None,
        }
    }

    pub(crate) fn with_hook(effective: u32, hook: impl Fn(u32) + Send + Sync + 'static) -> Self {
        Self {
            hook: Some(Box::new(hook)),
            ..Self::new(effective)
        }
    }

    /// Like `new`, but any switch to `denied` fails with `EPERM`.
    pub(crate) fn denying(effective: u32, denied: u32) -> Self {
        Self {
            deny: Some(Uid::from_raw(denied)),
            ..Self::new(effective)
        }
    }

    pub(crate) fn switches(&self) -> Vec<u32> {
        lock(&self.switches).clone()
    }
}

impl Credentials for RecordingCredentials {
    fn effective_uid(&self) -> Uid {
        *lock(&self.current)
    }

    fn set_effective_uid(&self, uid: Uid) -> nix::Result<()> {
        if self.deny == Some(uid) {
            return Err(Errno::EPERM);
        }
        lock(&self.switches).push(uid.as_raw());
        *lock(&self.current) = uid;
        if let Some(hook) = &self.hook {
            hook(uid.as_raw());
        }
        Ok(())
    }
}

type SleepHook = Box<dyn Fn(usize) + Send + Sync>;

/// Sleeper that records requested delays and returns immediately.
///
/// An optional hook runs on every sleep with the zero-based sleep index, which
/// lets a test change the spool between attempts.
#[derive(Default)]
pub(crate) struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
    hook: Option<SleepHook>,
}

impl RecordingSleeper {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_hook(hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        Self {
            delays: Mutex::new(Vec::new()),
            hook: Some(Box::new(hook)),
        }
    }

    pub(crate) fn delays(&self) -> Vec<Duration> {
        lock(&self.delays).clone()
    }

    /// Recorded delays in whole seconds.
    pub(crate) fn delay_secs(&self) -> Vec<u64> {
        self.delays().iter().map(Duration::as_secs).collect()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, delay: Duration) {
        let index = {
            let mut delays = lock(&self.delays);
            delays.push(delay);
            delays.len() - 1
        };
        if let Some(hook) = &self.hook {
            hook(index);
        }
    }
}

/// `2^n` seconds for `n` in `0..count`.
pub(crate) fn doubling_secs(count: u32) -> Vec<u64> {
    (0..count).map(|n| 1u64 << n).collect()
}
