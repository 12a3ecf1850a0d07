//! Config struct definition and default implementation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for spool locking.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding per-recipient mailboxes and their `.lock` files.
    /// Read but never created.
    #[serde(default = "default_spool_dir")]
    pub spool_dir: PathBuf,

    /// Filename prefix for quarantined spool items that could not be removed.
    #[serde(default = "default_quarantine_prefix")]
    pub quarantine_prefix: String,

    /// Maximum symlinks evicted from the lock path during one acquisition.
    #[serde(default = "default_link_eviction_limit")]
    pub link_eviction_limit: u32,
}

fn default_spool_dir() -> PathBuf {
    PathBuf::from("/var/mail")
}

fn default_quarantine_prefix() -> String {
    "mail".to_string()
}

fn default_link_eviction_limit() -> u32 {
    16
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spool_dir: default_spool_dir(),
            quarantine_prefix: default_quarantine_prefix(),
            link_eviction_limit: default_link_eviction_limit(),
        }
    }
}
