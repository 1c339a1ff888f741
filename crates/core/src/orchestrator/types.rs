//! Types for the request orchestrator.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::format::{content_type, extension_of, MediaKind};
use crate::storage::Storage;

/// A successfully stored upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredUpload {
    /// Unique stored name, `<base>_<millis>.<ext>`.
    pub name: String,
    /// Lowercased extension.
    pub extension: String,
    pub kind: MediaKind,
    pub size_bytes: u64,
}

/// A derived output ready to be sent to the client.
///
/// Owns the file on disk: dropping the value deletes it. The original upload
/// is untouched, so it can be converted again while it is retained.
#[derive(Debug)]
pub struct ConvertedFile {
    path: PathBuf,
    download_name: String,
    content_type: &'static str,
    kind: MediaKind,
}

impl ConvertedFile {
    pub(crate) fn new(path: PathBuf, kind: MediaKind) -> Self {
        let download_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = content_type(&extension_of(&download_name));
        Self {
            path,
            download_name,
            content_type,
            kind,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name offered to the client.
    pub fn download_name(&self) -> &str {
        &self.download_name
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    /// Media kind of the input this was converted from.
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Opens the output for streaming.
    pub async fn open(&self) -> std::io::Result<tokio::fs::File> {
        tokio::fs::File::open(&self.path).await
    }
}

/// Removal runs on the blocking pool when a runtime is available, inline otherwise.
impl Drop for ConvertedFile {
    fn drop(&mut self) {
        let path = std::mem::take(&mut self.path);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || remove_converted(&path));
            }
            Err(_) => remove_converted(&path),
        }
    }
}

fn remove_converted(path: &Path) {
    match Storage::remove_if_exists_blocking(path) {
        Ok(true) => debug!("Removed converted file {}", path.display()),
        // Already reclaimed by the sweeper.
        Ok(false) => {}
        Err(e) => warn!("Error during cleanup of {}: {}", path.display(), e),
    }
}
