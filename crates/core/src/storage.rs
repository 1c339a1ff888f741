//! Flat upload directory shared by uploads and conversion outputs.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::io;
use std::path::{Path, PathBuf};

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").unwrap());

/// The storage directory. Filenames are the only key; there is no index.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub async fn exists(&self, name: &str) -> bool {
        tokio::fs::try_exists(self.path_for(name))
            .await
            .unwrap_or(false)
    }

    /// Removes `path`, treating an already missing file as success.
    ///
    /// Returns whether a file was actually deleted.
    pub async fn remove_if_exists(path: &Path) -> io::Result<bool> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Blocking variant of [`Storage::remove_if_exists`], for use in `Drop`.
    pub fn remove_if_exists_blocking(path: &Path) -> io::Result<bool> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Base name used when an upload's name has nothing before its extension.
pub const PLACEHOLDER_BASE: &str = "upload";

/// Reduces a client supplied filename to one safe path component.
///
/// Directory parts are dropped and anything outside `[A-Za-z0-9._-]` becomes `_`.
/// Leading dots are stripped so the result is never hidden or relative. A name
/// that was only an extension (`.png`) gets the base [`PLACEHOLDER_BASE`].
pub fn sanitize_filename(filename: &str) -> String {
    let last = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned = UNSAFE_CHARS.replace_all(last.trim(), "_");
    let trimmed = cleaned.trim_start_matches('.');

    if trimmed.len() < cleaned.len() && !trimmed.is_empty() && !trimmed.contains('.') {
        format!("{}.{}", PLACEHOLDER_BASE, trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Whether `name` is a single plain path component that can be looked up in storage.
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Builds the stored name `<base>_<millis>.<ext>` for an upload.
pub fn unique_name(filename: &str, millis: i64) -> String {
    match filename.rsplit_once('.') {
        Some((base, ext)) => format!("{}_{}.{}", base, millis, ext),
        None => format!("{}_{}", filename, millis),
    }
}
