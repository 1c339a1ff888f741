//! Mock transcoder for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::converter::{ConverterError, TranscodeJob, Transcoder};

/// Mock implementation of the Transcoder trait.
///
/// Provides controllable behavior for testing:
/// - Track transcode jobs for assertions
/// - Simulate an absent transcoder (failed version probe)
/// - Simulate a failing encode, optionally leaving a partial output behind
///
/// A successful job copies the input bytes to the output path.
///
/// # Example
///
/// ```rust,ignore
/// use convertino_core::testing::MockTranscoder;
///
/// let transcoder = Arc::new(MockTranscoder::new());
/// transcoder.fail_next("Unknown encoder 'libx264'");
///
/// let backends = Backends::with_transcoder(transcoder.clone());
/// // ... run a conversion ...
/// assert_eq!(transcoder.recorded_jobs().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTranscoder {
    jobs: Arc<Mutex<Vec<TranscodeJob>>>,
    version_probes: Arc<AtomicUsize>,
    unavailable: Arc<AtomicBool>,
    next_failure: Arc<Mutex<Option<String>>>,
    leave_partial_output: Arc<AtomicBool>,
}

impl MockTranscoder {
    /// Create a new mock transcoder that succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// All jobs passed to `transcode`, including failed ones.
    pub fn recorded_jobs(&self) -> Vec<TranscodeJob> {
        self.jobs.lock().map(|j| j.clone()).unwrap_or_default()
    }

    /// Number of version probes performed.
    pub fn version_probes(&self) -> usize {
        self.version_probes.load(Ordering::SeqCst)
    }

    /// Make the version probe fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make the next transcode fail with `diagnostic`.
    pub fn fail_next(&self, diagnostic: impl Into<String>) {
        if let Ok(mut next) = self.next_failure.lock() {
            *next = Some(diagnostic.into());
        }
    }

    /// Write a truncated output file before failing.
    pub fn set_leave_partial_output(&self, leave: bool) {
        self.leave_partial_output.store(leave, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn version(&self) -> Result<String, ConverterError> {
        self.version_probes.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ConverterError::backend_unavailable(
                "mock-ffmpeg",
                "executable not found",
            ));
        }
        Ok("mock version 1.0".to_string())
    }

    async fn transcode(&self, job: &TranscodeJob) -> Result<(), ConverterError> {
        if let Ok(mut jobs) = self.jobs.lock() {
            jobs.push(job.clone());
        }

        let failure = self.next_failure.lock().ok().and_then(|mut f| f.take());
        if let Some(diagnostic) = failure {
            if self.leave_partial_output.load(Ordering::SeqCst) {
                tokio::fs::write(&job.output_path, b"partial").await?;
            }
            return Err(ConverterError::conversion_failed(diagnostic));
        }

        tokio::fs::copy(&job.input_path, &job.output_path).await?;
        Ok(())
    }
}
