//! Process-wide record of which stored files are original uploads.
//!
//! Membership means "original" (long retention). Anything absent, including
//! conversion outputs and names that were never uploaded, is treated as derived.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use crate::metrics::ORIGINAL_FILES_TRACKED;

/// Concurrency-safe set of original filenames.
///
/// Every operation holds the lock only for the set mutation itself; callers
/// must not perform filesystem or process I/O while a guard is live, and the
/// API never hands one out.
#[derive(Debug, Default)]
pub struct FileRegistry {
    originals: Mutex<HashSet<String>>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // A panic while holding the lock cannot leave the set half-mutated.
        self.originals
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records `name` as an original upload.
    pub fn mark_original(&self, name: &str) {
        let mut originals = self.lock();
        if originals.insert(name.to_string()) {
            ORIGINAL_FILES_TRACKED.set(originals.len() as i64);
        }
    }

    pub fn is_original(&self, name: &str) -> bool {
        self.lock().contains(name)
    }

    /// Drops `name` from the registry. Returns whether it was present.
    pub fn forget(&self, name: &str) -> bool {
        let mut originals = self.lock();
        let removed = originals.remove(name);
        if removed {
            ORIGINAL_FILES_TRACKED.set(originals.len() as i64);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
