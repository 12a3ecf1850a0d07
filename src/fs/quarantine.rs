//! Bad-item triage for spool entries that block lock creation.
//!
//! An entry is removed when possible. Entries that cannot be unlinked (for
//! example non-empty directories) are renamed to a fresh unique name in the
//! spool directory so they stop blocking and remain available for inspection.
//! Failures are not errors: the next locking attempt meets the same entry and
//! tries again.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Random characters appended to the quarantine prefix.
const QUARANTINE_RAND_CHARS: usize = 10;

/// What triage did with an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriageOutcome {
    /// The entry was unlinked.
    Removed,
    /// The entry was renamed to the contained path.
    Quarantined(PathBuf),
    /// Neither removal nor rename worked; the entry is still in place.
    Failed,
}

/// Remove or quarantine the entry at `path`.
///
/// Quarantine names are `<spool_dir>/<prefix>` followed by random characters.
pub fn quarantine(path: &Path, spool_dir: &Path, prefix: &str) -> TriageOutcome {
    let unlink_error = match fs::remove_file(path) {
        Ok(()) => return TriageOutcome::Removed,
        Err(e) => e,
    };

    let is_dir = fs::symlink_metadata(path)
        .map(|meta| meta.is_dir())
        .unwrap_or(false);

    let placeholder = match tempfile::Builder::new()
        .prefix(prefix)
        .rand_bytes(QUARANTINE_RAND_CHARS)
        .tempfile_in(spool_dir)
    {
        Ok(file) => file.into_temp_path(),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "cannot reserve quarantine name");
            return TriageOutcome::Failed;
        }
    };
    let target = placeholder.to_path_buf();

    if is_dir {
        // rename(2) cannot replace a regular file with a directory.
        if let Err(e) = placeholder.close() {
            debug!(path = %target.display(), error = %e, "cannot clear quarantine placeholder");
            return TriageOutcome::Failed;
        }
        if let Err(e) = fs::rename(path, &target) {
            debug!(path = %path.display(), error = %e, "cannot quarantine directory");
            return TriageOutcome::Failed;
        }
    } else {
        if let Err(e) = fs::rename(path, &target) {
            debug!(
                path = %path.display(),
                unlink_error = %unlink_error,
                error = %e,
                "cannot quarantine spool item"
            );
            // Dropping the placeholder removes it.
            return TriageOutcome::Failed;
        }
        // The placeholder path now names the quarantined item.
        let _ = placeholder.keep();
    }

    warn!(
        "nasty spool item {} renamed to {}",
        path.display(),
        target.display()
    );
    TriageOutcome::Quarantined(target)
}
