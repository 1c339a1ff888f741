//! Types for the converter module.

use std::path::{Path, PathBuf};

/// Codec selection for one target format.
///
/// Profiles are plain data: the transcoder turns them into command-line flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeProfile {
    /// Target extension this profile produces.
    pub format: &'static str,
    /// Strip the video track (`-vn`).
    pub drop_video: bool,
    /// Video codec, `copy` for stream copy.
    pub video_codec: Option<&'static str>,
    /// Audio codec, `copy` for stream copy.
    pub audio_codec: Option<&'static str>,
}

impl EncodeProfile {
    const fn video(format: &'static str, video: &'static str, audio: &'static str) -> Self {
        Self {
            format,
            drop_video: false,
            video_codec: Some(video),
            audio_codec: Some(audio),
        }
    }

    const fn audio_only(format: &'static str, audio: &'static str) -> Self {
        Self {
            format,
            drop_video: true,
            video_codec: None,
            audio_codec: Some(audio),
        }
    }

    /// Codec selection flags in ffmpeg syntax.
    pub fn codec_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.drop_video {
            args.push("-vn".to_string());
        }
        if let Some(codec) = self.video_codec {
            args.extend(["-c:v".to_string(), codec.to_string()]);
        }
        if let Some(codec) = self.audio_codec {
            args.extend(["-c:a".to_string(), codec.to_string()]);
        }
        args
    }

    /// Whether both tracks are copied without re-encoding.
    pub fn is_stream_copy(&self) -> bool {
        self.video_codec == Some("copy") && self.audio_codec == Some("copy")
    }
}

/// Encode profiles for video inputs, one per target.
pub const VIDEO_PROFILES: &[EncodeProfile] = &[
    EncodeProfile::video("mp4", "libx264", "aac"),
    EncodeProfile::video("mkv", "copy", "copy"),
    EncodeProfile::video("avi", "mpeg4", "libmp3lame"),
    EncodeProfile::video("mov", "libx264", "aac"),
    EncodeProfile::audio_only("mp3", "libmp3lame"),
];

/// Encode profiles for audio inputs, one per target.
pub const AUDIO_PROFILES: &[EncodeProfile] = &[
    EncodeProfile::audio_only("mp3", "libmp3lame"),
    EncodeProfile::audio_only("wav", "pcm_s16le"),
    EncodeProfile::audio_only("ogg", "libvorbis"),
    EncodeProfile::audio_only("m4a", "aac"),
];

/// Looks up the profile for `format` (case-insensitive) in a profile table.
pub fn find_profile(profiles: &'static [EncodeProfile], format: &str) -> Option<EncodeProfile> {
    profiles
        .iter()
        .find(|p| p.format.eq_ignore_ascii_case(format))
        .copied()
}

/// A single invocation of the external transcoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeJob {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub profile: EncodeProfile,
}

/// Computes where a conversion of `input` to `target_format` is written.
///
/// The input's extension is replaced by the target. When that would point back
/// at the input itself the stem gets a `_converted` suffix, so deleting the
/// derived file never removes the original.
pub fn output_path_for(input: &Path, target_format: &str) -> PathBuf {
    let target = target_format.to_ascii_lowercase();
    let same_extension = input
        .extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(&target));
    if !same_extension {
        return input.with_extension(&target);
    }

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{}_converted.{}", stem, target))
}
