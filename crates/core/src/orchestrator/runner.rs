//! Conversion orchestrator implementation.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use crate::converter::{output_path_for, Backends};
use crate::format::{extension_of, is_uploadable, media_kind, MediaKind};
use crate::metrics::{CONVERSIONS_TOTAL, CONVERSION_DURATION, UPLOADS_TOTAL};
use crate::registry::FileRegistry;
use crate::storage::{is_plain_name, sanitize_filename, unique_name, Storage};

use super::error::OrchestratorError;
use super::types::{ConvertedFile, StoredUpload};

/// Attempts at finding a free stored name before giving up.
const NAME_ATTEMPTS: i64 = 16;

/// Coordinates upload and convert requests over storage, registry and backends.
pub struct ConversionOrchestrator {
    storage: Storage,
    registry: Arc<FileRegistry>,
    backends: Backends,
    max_upload_bytes: u64,
}

impl ConversionOrchestrator {
    pub fn new(
        storage: Storage,
        registry: Arc<FileRegistry>,
        backends: Backends,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            storage,
            registry,
            backends,
            max_upload_bytes,
        }
    }

    pub fn registry(&self) -> &Arc<FileRegistry> {
        &self.registry
    }

    /// Validate and store an upload, registering it as an original.
    ///
    /// The size check happens after the bytes are on disk; an oversized upload
    /// is removed again and leaves no registry entry behind.
    pub async fn accept_upload(
        &self,
        filename: &str,
        data: &[u8],
    ) -> Result<StoredUpload, OrchestratorError> {
        let sanitized = sanitize_filename(filename);
        if !is_uploadable(&sanitized) {
            UPLOADS_TOTAL.with_label_values(&["unsupported_type"]).inc();
            debug!("Rejected upload {:?}: unsupported file type", filename);
            return Err(OrchestratorError::UnsupportedFileType {
                filename: filename.to_string(),
            });
        }

        let (name, path) = match self.store_new(&sanitized, data).await {
            Ok(stored) => stored,
            Err(e) => {
                UPLOADS_TOTAL.with_label_values(&["error"]).inc();
                error!("Failed to store upload {}: {}", sanitized, e);
                return Err(e.into());
            }
        };
        self.registry.mark_original(&name);

        let size_bytes = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                self.discard_original(&name, &path).await;
                UPLOADS_TOTAL.with_label_values(&["error"]).inc();
                return Err(e.into());
            }
        };

        if size_bytes > self.max_upload_bytes {
            self.discard_original(&name, &path).await;
            UPLOADS_TOTAL.with_label_values(&["too_large"]).inc();
            warn!(
                "Rejected upload {}: {} bytes exceeds limit of {}",
                name, size_bytes, self.max_upload_bytes
            );
            return Err(OrchestratorError::FileTooLarge {
                size_bytes,
                limit_bytes: self.max_upload_bytes,
            });
        }

        let extension = extension_of(&name);
        let kind = media_kind(&extension);
        UPLOADS_TOTAL.with_label_values(&["accepted"]).inc();
        info!("Stored {} upload {} ({} bytes)", kind, name, size_bytes);

        Ok(StoredUpload {
            name,
            extension,
            kind,
            size_bytes,
        })
    }

    /// Convert a stored original into `target_format`.
    ///
    /// Validation failures touch nothing on disk. A backend failure discards the
    /// original together with any partial output, so the client must upload again.
    pub async fn convert(
        &self,
        name: &str,
        target_format: &str,
    ) -> Result<ConvertedFile, OrchestratorError> {
        if !is_plain_name(name) {
            return Err(OrchestratorError::InvalidFileName {
                name: name.to_string(),
            });
        }

        let input = self.storage.path_for(name);
        if !self.storage.exists(name).await {
            debug!("Convert requested for missing original {}", name);
            return Err(OrchestratorError::OriginalMissing {
                name: name.to_string(),
            });
        }

        let target = target_format.trim().to_ascii_lowercase();
        let kind = media_kind(&extension_of(name));
        let backend = match self.backends.for_kind(kind) {
            Some(backend) if kind.accepts_target(&target) => backend,
            _ => return Err(OrchestratorError::UnsupportedConversion { kind, target }),
        };

        let started = Instant::now();
        let result = backend.convert(&input, &target).await;
        CONVERSION_DURATION
            .with_label_values(&[kind.as_str()])
            .observe(started.elapsed().as_secs_f64());

        match result {
            Ok(output) => {
                CONVERSIONS_TOTAL
                    .with_label_values(&[kind.as_str(), "success"])
                    .inc();
                info!(
                    "Converted {} to {} in {:?}",
                    name,
                    target,
                    started.elapsed()
                );
                Ok(ConvertedFile::new(output, kind))
            }
            Err(e) => {
                CONVERSIONS_TOTAL
                    .with_label_values(&[kind.as_str(), "failed"])
                    .inc();
                error!("Error during conversion of {} to {}: {}", name, target, e);
                self.discard_after_failure(name, &input, &target, kind).await;
                Err(e.into())
            }
        }
    }

    /// Writes `data` under a fresh unique name, never overwriting an existing file.
    async fn store_new(
        &self,
        sanitized: &str,
        data: &[u8],
    ) -> std::io::Result<(String, std::path::PathBuf)> {
        let millis = Utc::now().timestamp_millis();

        for attempt in 0..NAME_ATTEMPTS {
            let name = unique_name(sanitized, millis + attempt);
            let path = self.storage.path_for(&name);

            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            };

            let written = async {
                file.write_all(data).await?;
                file.flush().await
            }
            .await;

            if let Err(e) = written {
                drop(file);
                let _ = Storage::remove_if_exists(&path).await;
                return Err(e);
            }

            return Ok((name, path));
        }

        Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("no free name for {}", sanitized),
        ))
    }

    async fn discard_original(&self, name: &str, path: &Path) {
        if let Err(e) = Storage::remove_if_exists(path).await {
            warn!("Error during cleanup of {}: {}", path.display(), e);
        }
        self.registry.forget(name);
    }

    async fn discard_after_failure(&self, name: &str, input: &Path, target: &str, kind: MediaKind) {
        self.discard_original(name, input).await;

        let partial = output_path_for(input, target);
        match Storage::remove_if_exists(&partial).await {
            Ok(true) => debug!("Removed partial {} output {}", kind, partial.display()),
            Ok(false) => {}
            Err(e) => warn!("Error during cleanup of {}: {}", partial.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockTranscoder};
    use tempfile::TempDir;

    fn orchestrator(dir: &TempDir, transcoder: Arc<MockTranscoder>) -> ConversionOrchestrator {
        ConversionOrchestrator::new(
            Storage::new(dir.path()),
            Arc::new(FileRegistry::new()),
            Backends::with_transcoder(transcoder),
            1024 * 1024,
        )
    }

    fn stored_files(dir: &TempDir) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_accept_upload_registers_original() {
        let dir = TempDir::new().unwrap();
        let orch = orchestrator(&dir, Arc::new(MockTranscoder::new()));

        let stored = orch.accept_upload("holiday.PNG", &fixtures::rgba_png(4, 4)).await.unwrap();

        assert!(stored.name.starts_with("holiday_"));
        assert!(stored.name.ends_with(".PNG"));
        assert_eq!(stored.extension, "png");
        assert_eq!(stored.kind, MediaKind::Image);
        assert!(orch.registry().is_original(&stored.name));
        assert!(dir.path().join(&stored.name).exists());
    }

    #[tokio::test]
    async fn test_accept_upload_rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let orch = orchestrator(&dir, Arc::new(MockTranscoder::new()));

        for name in ["notes.txt", "archive", "image.gif"] {
            let err = orch.accept_upload(name, b"data").await.unwrap_err();
            assert!(matches!(err, OrchestratorError::UnsupportedFileType { .. }));
        }
        assert!(stored_files(&dir).is_empty());
        assert!(orch.registry().is_empty());
    }

    #[tokio::test]
    async fn test_extension_only_names_are_accepted() {
        let dir = TempDir::new().unwrap();
        let orch = orchestrator(&dir, Arc::new(MockTranscoder::new()));

        let image = orch.accept_upload(".png", &fixtures::rgba_png(2, 2)).await.unwrap();
        assert!(image.name.starts_with("upload_"));
        assert!(image.name.ends_with(".png"));
        assert_eq!(image.kind, MediaKind::Image);

        let audio = orch.accept_upload("..mp3", b"ID3").await.unwrap();
        assert!(audio.name.starts_with("upload_"));
        assert!(audio.name.ends_with(".mp3"));
        assert_eq!(audio.kind, MediaKind::Audio);

        assert!(orch.registry().is_original(&image.name));
        assert!(orch.registry().is_original(&audio.name));
        assert_eq!(stored_files(&dir).len(), 2);
    }

    #[tokio::test]
    async fn test_same_name_uploads_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let orch = orchestrator(&dir, Arc::new(MockTranscoder::new()));

        let a = orch.accept_upload("song.wav", b"one").await.unwrap();
        let b = orch.accept_upload("song.wav", b"two").await.unwrap();

        assert_ne!(a.name, b.name);
        assert_eq!(std::fs::read(dir.path().join(&a.name)).unwrap(), b"one");
        assert_eq!(std::fs::read(dir.path().join(&b.name)).unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_convert_rejects_cross_kind_target_without_side_effects() {
        let dir = TempDir::new().unwrap();
        let transcoder = Arc::new(MockTranscoder::new());
        let orch = orchestrator(&dir, transcoder.clone());
        let stored = orch.accept_upload("voice.wav", b"riff").await.unwrap();

        let err = orch.convert(&stored.name, "mp4").await.unwrap_err();

        assert!(matches!(
            err,
            OrchestratorError::UnsupportedConversion {
                kind: MediaKind::Audio,
                ..
            }
        ));
        assert!(dir.path().join(&stored.name).exists());
        assert!(orch.registry().is_original(&stored.name));
        assert!(transcoder.recorded_jobs().is_empty());
    }

    #[tokio::test]
    async fn test_convert_rejects_path_components() {
        let dir = TempDir::new().unwrap();
        let orch = orchestrator(&dir, Arc::new(MockTranscoder::new()));

        for name in ["../secret.png", "a/b.png", ".."] {
            let err = orch.convert(name, "jpg").await.unwrap_err();
            assert!(matches!(err, OrchestratorError::InvalidFileName { .. }));
        }
    }

    #[tokio::test]
    async fn test_convert_audio_keeps_original() {
        let dir = TempDir::new().unwrap();
        let transcoder = Arc::new(MockTranscoder::new());
        let orch = orchestrator(&dir, transcoder.clone());
        let stored = orch.accept_upload("voice.wav", b"riff").await.unwrap();

        let converted = orch.convert(&stored.name, "OGG").await.unwrap();

        assert!(converted.download_name().ends_with(".ogg"));
        assert_eq!(converted.content_type(), "audio/ogg");
        assert!(converted.path().exists());
        assert!(dir.path().join(&stored.name).exists());
        assert_eq!(transcoder.recorded_jobs()[0].profile.format, "ogg");
    }

    #[tokio::test]
    async fn test_convert_failure_discards_original_and_partial_output() {
        let dir = TempDir::new().unwrap();
        let transcoder = Arc::new(MockTranscoder::new());
        transcoder.set_leave_partial_output(true);
        let orch = orchestrator(&dir, transcoder.clone());
        let stored = orch.accept_upload("clip.mp4", b"ftyp").await.unwrap();

        transcoder.fail_next("Invalid data found when processing input");
        let err = orch.convert(&stored.name, "mkv").await.unwrap_err();

        assert!(matches!(err, OrchestratorError::Conversion(_)));
        assert!(err
            .to_string()
            .contains("Invalid data found when processing input"));
        assert!(stored_files(&dir).is_empty());
        assert!(!orch.registry().is_original(&stored.name));
    }
}
