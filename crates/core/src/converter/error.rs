//! Error types for the converter module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during conversion.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// Requested target format is not produced by this backend.
    #[error("Unsupported format: {format}. Must be one of {supported:?}")]
    UnsupportedFormat {
        format: String,
        supported: &'static [&'static str],
    },

    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Input could not be parsed by the image codec.
    #[error("Failed to decode input: {reason}")]
    DecodeError { reason: String },

    /// The external transcoder is missing or failed its version probe.
    #[error("Transcoder unavailable at {path}: {reason}")]
    BackendUnavailable { path: PathBuf, reason: String },

    /// Conversion process failed. `details` carries the backend's diagnostic output.
    #[error("Conversion failed: {details}")]
    ConversionFailed { details: String },

    /// I/O error during conversion.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Blocking worker failed before producing a result.
    #[error("Internal converter error: {0}")]
    Internal(String),
}

impl ConverterError {
    /// Creates a new conversion failed error with diagnostic output.
    pub fn conversion_failed(details: impl Into<String>) -> Self {
        Self::ConversionFailed {
            details: details.into(),
        }
    }

    /// Creates a new backend unavailable error.
    pub fn backend_unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was raised before any backend work started.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat { .. } | Self::InputNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_failed_includes_diagnostic() {
        let err = ConverterError::conversion_failed("Unknown encoder 'libfoo'");
        assert_eq!(err.to_string(), "Conversion failed: Unknown encoder 'libfoo'");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_unsupported_format_lists_supported() {
        let err = ConverterError::UnsupportedFormat {
            format: "gif".to_string(),
            supported: &["png", "jpg"],
        };
        let message = err.to_string();
        assert!(message.contains("gif"));
        assert!(message.contains("png"));
        assert!(err.is_validation());
    }
}
