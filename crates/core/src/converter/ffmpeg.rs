//! FFmpeg-based transcoder implementation.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::debug;

use super::config::ConverterConfig;
use super::error::ConverterError;
use super::traits::Transcoder;
use super::types::TranscodeJob;

/// Runs the `ffmpeg` executable as a child process.
pub struct FfmpegTranscoder {
    config: ConverterConfig,
}

impl FfmpegTranscoder {
    /// Creates a new FFmpeg transcoder with the given configuration.
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Creates a transcoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ConverterConfig::default())
    }

    /// Builds ffmpeg arguments for a job.
    fn build_args(&self, job: &TranscodeJob) -> Vec<String> {
        let mut args = vec![
            "-i".to_string(),
            job.input_path.to_string_lossy().to_string(),
        ];

        args.extend(job.profile.codec_args());

        args.extend([
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
        ]);

        // Overwrite output
        args.push("-y".to_string());

        args.push(job.output_path.to_string_lossy().to_string());

        args
    }

    fn spawn_error(&self, e: std::io::Error) -> ConverterError {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConverterError::backend_unavailable(&self.config.ffmpeg_path, "executable not found")
        } else {
            ConverterError::backend_unavailable(&self.config.ffmpeg_path, e.to_string())
        }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn version(&self) -> Result<String, ConverterError> {
        let output = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(ConverterError::backend_unavailable(
                &self.config.ffmpeg_path,
                format!("version probe exited with code {:?}", output.status.code()),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().to_string())
    }

    async fn transcode(&self, job: &TranscodeJob) -> Result<(), ConverterError> {
        let start = Instant::now();
        let args = self.build_args(job);
        debug!("Running {} {}", self.config.ffmpeg_path.display(), args.join(" "));

        let output = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let details = if stderr.is_empty() {
                format!("FFmpeg exited with code: {:?}", output.status.code())
            } else {
                stderr
            };
            return Err(ConverterError::conversion_failed(details));
        }

        if !job.output_path.exists() {
            return Err(ConverterError::conversion_failed("Output file not created"));
        }

        debug!(
            "FFmpeg wrote {} in {} ms",
            job.output_path.display(),
            start.elapsed().as_millis()
        );
        Ok(())
    }
}
