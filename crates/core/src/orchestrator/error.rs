//! Error types for the request orchestrator.

use thiserror::Error;

use crate::converter::ConverterError;
use crate::format::MediaKind;

/// Errors surfaced to the caller of an upload or convert operation.
///
/// Display strings are the user-facing messages.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Extension outside the image, video and audio allow-lists.
    #[error("Unsupported file type.")]
    UnsupportedFileType { filename: String },

    /// Upload exceeded the size limit and was discarded.
    #[error("File size exceeds the {} limit.", describe_limit(*.limit_bytes))]
    FileTooLarge { size_bytes: u64, limit_bytes: u64 },

    /// The stored original no longer exists.
    #[error("Original file not found. Please upload again.")]
    OriginalMissing { name: String },

    /// Target format does not belong to the input's media kind.
    #[error("Unsupported conversion.")]
    UnsupportedConversion { kind: MediaKind, target: String },

    /// Name is not a single plain path component.
    #[error("Invalid file name: {name}")]
    InvalidFileName { name: String },

    /// The backend failed; the original has been discarded.
    #[error("Error during conversion: {0}")]
    Conversion(#[from] ConverterError),

    /// Storage I/O failed.
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
}

const MIB: u64 = 1024 * 1024;

/// Whole megabytes, rounded up; plain bytes below one megabyte.
fn describe_limit(limit_bytes: u64) -> String {
    if limit_bytes < MIB {
        format!("{} bytes", limit_bytes)
    } else {
        format!("{} MB", limit_bytes.div_ceil(MIB))
    }
}

impl OrchestratorError {
    /// Whether the request itself was at fault (as opposed to a backend or storage failure).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Conversion(_) | Self::Io(_))
    }

    /// Whether the request referred to a file that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::OriginalMissing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_large_message() {
        let err = OrchestratorError::FileTooLarge {
            size_bytes: 200 * 1024 * 1024,
            limit_bytes: 100 * 1024 * 1024,
        };
        assert_eq!(err.to_string(), "File size exceeds the 100 MB limit.");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_too_large_message_for_small_limits() {
        let err = OrchestratorError::FileTooLarge {
            size_bytes: 1001,
            limit_bytes: 1000,
        };
        assert_eq!(err.to_string(), "File size exceeds the 1000 bytes limit.");

        let err = OrchestratorError::FileTooLarge {
            size_bytes: 3 * MIB,
            limit_bytes: MIB + 1,
        };
        assert_eq!(err.to_string(), "File size exceeds the 2 MB limit.");
    }

    #[test]
    fn test_conversion_error_includes_diagnostic() {
        let err: OrchestratorError = ConverterError::conversion_failed("moov atom not found").into();
        assert_eq!(
            err.to_string(),
            "Error during conversion: Conversion failed: moov atom not found"
        );
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_original_missing_is_not_found() {
        let err = OrchestratorError::OriginalMissing {
            name: "x.png".to_string(),
        };
        assert!(err.is_not_found());
        assert!(err.is_client_error());
    }
}
