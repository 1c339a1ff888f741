//! Trait definitions for the converter module.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::ConverterError;
use super::types::TranscodeJob;

/// A conversion backend for one media kind.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    /// Returns the target formats this backend can produce.
    fn supported_formats(&self) -> &'static [&'static str];

    /// Converts `input` to `target_format`, returning the path of the written output.
    ///
    /// Fails with `UnsupportedFormat` or `InputNotFound` before doing any work.
    async fn convert(&self, input: &Path, target_format: &str)
        -> Result<PathBuf, ConverterError>;

    /// Whether `target_format` (case-insensitive) is produced by this backend.
    fn supports(&self, target_format: &str) -> bool {
        self.supported_formats()
            .iter()
            .any(|f| f.eq_ignore_ascii_case(target_format))
    }
}

/// An out-of-process transcoding capability.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Returns the name of this transcoder implementation.
    fn name(&self) -> &str;

    /// Probes the transcoder, returning its version banner.
    ///
    /// Fails with `BackendUnavailable` when the capability is missing.
    async fn version(&self) -> Result<String, ConverterError>;

    /// Runs one encode. Fails with `ConversionFailed` carrying the diagnostic output.
    async fn transcode(&self, job: &TranscodeJob) -> Result<(), ConverterError>;
}
