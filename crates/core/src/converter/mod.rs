//! Converter module for transforming uploaded files into a target format.
//!
//! Three backends share the [`Converter`] contract: input path plus target
//! format in, output path (or a typed [`ConverterError`]) out.
//!
//! - [`ImageConverter`] decodes and re-encodes stills with the `image` crate,
//!   flattening transparency onto white for jpeg targets.
//! - [`MediaConverter::video`] and [`MediaConverter::audio`] look up a static
//!   [`EncodeProfile`] for the target and hand it to a [`Transcoder`].
//! - [`FfmpegTranscoder`] is the production transcoder, running `ffmpeg` as a
//!   child process.
//!
//! # Example
//!
//! ```ignore
//! use convertino_core::converter::{Backends, ConverterConfig};
//! use convertino_core::format::MediaKind;
//!
//! let backends = Backends::ffmpeg(ConverterConfig::default());
//! let video = backends.for_kind(MediaKind::Video).unwrap();
//! let output = video.convert(Path::new("uploads/clip_1700000000000.mkv"), "mp4").await?;
//! ```

mod backends;
mod config;
mod error;
mod ffmpeg;
mod media;
mod raster;
mod traits;
mod types;

pub use backends::Backends;
pub use config::ConverterConfig;
pub use error::ConverterError;
pub use ffmpeg::FfmpegTranscoder;
pub use media::MediaConverter;
pub use raster::ImageConverter;
pub use traits::{Converter, Transcoder};
pub use types::{
    find_profile, output_path_for, EncodeProfile, TranscodeJob, AUDIO_PROFILES, VIDEO_PROFILES,
};
