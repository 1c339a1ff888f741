//! Selection of a conversion backend by media kind.

use std::sync::Arc;

use super::config::ConverterConfig;
use super::ffmpeg::FfmpegTranscoder;
use super::media::MediaConverter;
use super::raster::ImageConverter;
use super::traits::{Converter, Transcoder};
use crate::format::MediaKind;

/// The image, video and audio converters.
#[derive(Clone)]
pub struct Backends {
    image: Arc<dyn Converter>,
    video: Arc<dyn Converter>,
    audio: Arc<dyn Converter>,
}

impl Backends {
    pub fn new(
        image: Arc<dyn Converter>,
        video: Arc<dyn Converter>,
        audio: Arc<dyn Converter>,
    ) -> Self {
        Self {
            image,
            video,
            audio,
        }
    }

    /// Image codec library for stills, one shared transcoder for audio and video.
    pub fn with_transcoder(transcoder: Arc<dyn Transcoder>) -> Self {
        Self::new(
            Arc::new(ImageConverter::new()),
            Arc::new(MediaConverter::video(Arc::clone(&transcoder))),
            Arc::new(MediaConverter::audio(transcoder)),
        )
    }

    /// Production wiring backed by the ffmpeg executable.
    pub fn ffmpeg(config: ConverterConfig) -> Self {
        Self::with_transcoder(Arc::new(FfmpegTranscoder::new(config)))
    }

    /// Returns the converter responsible for `kind`.
    pub fn for_kind(&self, kind: MediaKind) -> Option<Arc<dyn Converter>> {
        match kind {
            MediaKind::Image => Some(Arc::clone(&self.image)),
            MediaKind::Video => Some(Arc::clone(&self.video)),
            MediaKind::Audio => Some(Arc::clone(&self.audio)),
            MediaKind::Other => None,
        }
    }
}
