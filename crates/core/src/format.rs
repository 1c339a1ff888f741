//! File extension classification and allow-lists.
//!
//! Every decision about which backend handles a file is driven by the
//! lowercased extension of its name. `mp3` appears in both the video and the
//! audio lists: a video can be downmixed to an audio-only mp3, while an mp3
//! upload is itself classified as audio.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Image extensions accepted for upload and as image targets.
pub const IMAGE_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Video extensions accepted for upload and as video targets.
pub const VIDEO_FORMATS: &[&str] = &["mp4", "mkv", "avi", "mov", "mp3"];

/// Audio extensions accepted for upload and as audio targets.
pub const AUDIO_FORMATS: &[&str] = &["mp3", "wav", "ogg", "m4a"];

/// Coarse media classification of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
    Other,
}

impl MediaKind {
    /// Returns the kind name used in logs, metrics and API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
            MediaKind::Other => "other",
        }
    }

    /// Target formats a file of this kind may be converted to.
    pub fn target_formats(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Image => IMAGE_FORMATS,
            MediaKind::Audio => AUDIO_FORMATS,
            MediaKind::Video => VIDEO_FORMATS,
            MediaKind::Other => &[],
        }
    }

    /// Whether `target` (compared case-insensitively) is a valid target for this kind.
    pub fn accepts_target(&self, target: &str) -> bool {
        let target = target.to_ascii_lowercase();
        self.target_formats().contains(&target.as_str())
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the lowercased suffix after the last '.', or an empty string.
pub fn extension_of(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Classifies an extension. Precedence is image, then audio, then video.
pub fn media_kind(extension: &str) -> MediaKind {
    let extension = extension.to_ascii_lowercase();
    let ext = extension.as_str();
    if IMAGE_FORMATS.contains(&ext) {
        MediaKind::Image
    } else if AUDIO_FORMATS.contains(&ext) {
        MediaKind::Audio
    } else if VIDEO_FORMATS.contains(&ext) {
        MediaKind::Video
    } else {
        MediaKind::Other
    }
}

/// Whether `filename` has an extension contained in `allow_list`.
pub fn is_allowed(filename: &str, allow_list: &[&str]) -> bool {
    if !filename.contains('.') {
        return false;
    }
    let ext = extension_of(filename);
    allow_list.contains(&ext.as_str())
}

/// Whether `filename` can be uploaded at all.
pub fn is_uploadable(filename: &str) -> bool {
    is_allowed(filename, IMAGE_FORMATS)
        || is_allowed(filename, VIDEO_FORMATS)
        || is_allowed(filename, AUDIO_FORMATS)
}

/// MIME type sent with a converted download.
pub fn content_type(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("photo.PNG"), "png");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("noext"), "");
        assert_eq!(extension_of("trailing."), "");
    }

    #[test]
    fn test_media_kind_classification() {
        assert_eq!(media_kind("png"), MediaKind::Image);
        assert_eq!(media_kind("JPEG"), MediaKind::Image);
        assert_eq!(media_kind("wav"), MediaKind::Audio);
        assert_eq!(media_kind("mkv"), MediaKind::Video);
        assert_eq!(media_kind("mov"), MediaKind::Video);
        assert_eq!(media_kind("pdf"), MediaKind::Other);
        assert_eq!(media_kind(""), MediaKind::Other);
    }

    #[test]
    fn test_mp3_classifies_as_audio() {
        assert_eq!(media_kind("mp3"), MediaKind::Audio);
        assert!(MediaKind::Video.accepts_target("mp3"));
        assert!(MediaKind::Audio.accepts_target("mp3"));
    }

    #[test]
    fn test_unrecognized_names_are_rejected_everywhere() {
        for name in ["README", "notes.txt", "binary.exe", ".hidden", "photo."] {
            assert_eq!(media_kind(&extension_of(name)), MediaKind::Other);
            assert!(!is_allowed(name, IMAGE_FORMATS));
            assert!(!is_allowed(name, VIDEO_FORMATS));
            assert!(!is_allowed(name, AUDIO_FORMATS));
            assert!(!is_uploadable(name));
        }
    }

    #[test]
    fn test_is_allowed_is_case_insensitive() {
        assert!(is_allowed("Holiday.JPG", IMAGE_FORMATS));
        assert!(!is_allowed("Holiday.JPG", AUDIO_FORMATS));
        assert!(is_uploadable("clip.MoV"));
    }

    #[test]
    fn test_target_formats_cross_kind() {
        assert!(!MediaKind::Audio.accepts_target("mp4"));
        assert!(!MediaKind::Image.accepts_target("mp3"));
        assert!(!MediaKind::Video.accepts_target("wav"));
        assert!(MediaKind::Image.accepts_target("WEBP"));
        assert!(MediaKind::Other.target_formats().is_empty());
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type("jpg"), "image/jpeg");
        assert_eq!(content_type("M4A"), "audio/mp4");
        assert_eq!(content_type("xyz"), "application/octet-stream");
    }
}
