//! Audio and video converters driven by an external transcoder.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use super::error::ConverterError;
use super::traits::{Converter, Transcoder};
use super::types::{find_profile, output_path_for, EncodeProfile, TranscodeJob};
use super::types::{AUDIO_PROFILES, VIDEO_PROFILES};
use crate::format::{AUDIO_FORMATS, VIDEO_FORMATS};

/// Converts audio or video files with one fixed encode profile per target.
pub struct MediaConverter {
    name: &'static str,
    formats: &'static [&'static str],
    profiles: &'static [EncodeProfile],
    transcoder: Arc<dyn Transcoder>,
}

impl MediaConverter {
    /// Video backend: mp4, mkv, avi, mov, and audio extraction to mp3.
    pub fn video(transcoder: Arc<dyn Transcoder>) -> Self {
        Self {
            name: "video",
            formats: VIDEO_FORMATS,
            profiles: VIDEO_PROFILES,
            transcoder,
        }
    }

    /// Audio backend: mp3, wav, ogg, m4a.
    pub fn audio(transcoder: Arc<dyn Transcoder>) -> Self {
        Self {
            name: "audio",
            formats: AUDIO_FORMATS,
            profiles: AUDIO_PROFILES,
            transcoder,
        }
    }

    /// Profile used for `target_format`, if this backend supports it.
    pub fn profile(&self, target_format: &str) -> Option<EncodeProfile> {
        find_profile(self.profiles, target_format)
    }
}

#[async_trait]
impl Converter for MediaConverter {
    fn name(&self) -> &str {
        self.name
    }

    fn supported_formats(&self) -> &'static [&'static str] {
        self.formats
    }

    async fn convert(
        &self,
        input: &Path,
        target_format: &str,
    ) -> Result<PathBuf, ConverterError> {
        let profile =
            self.profile(target_format)
                .ok_or_else(|| ConverterError::UnsupportedFormat {
                    format: target_format.to_ascii_lowercase(),
                    supported: self.formats,
                })?;

        if !input.exists() {
            return Err(ConverterError::InputNotFound {
                path: input.to_path_buf(),
            });
        }

        self.transcoder.version().await?;

        let job = TranscodeJob {
            input_path: input.to_path_buf(),
            output_path: output_path_for(input, profile.format),
            profile,
        };

        self.transcoder.transcode(&job).await?;
        info!(
            "{} conversion via {} produced {}",
            self.name,
            self.transcoder.name(),
            job.output_path.display()
        );

        Ok(job.output_path)
    }
}
