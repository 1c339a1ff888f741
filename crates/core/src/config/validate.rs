use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Upload directory and size limit are usable
/// - Retention thresholds and sweep interval are coherent
/// - FFmpeg path is set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.storage.upload_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.upload_dir cannot be empty".to_string(),
        ));
    }

    if config.storage.max_upload_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "storage.max_upload_bytes must be greater than 0".to_string(),
        ));
    }

    if config.retention.sweep_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "retention.sweep_interval_secs must be greater than 0".to_string(),
        ));
    }

    if config.retention.derived_max_age_secs > config.retention.original_max_age_secs {
        return Err(ConfigError::ValidationError(format!(
            "retention.derived_max_age_secs ({}) cannot exceed retention.original_max_age_secs ({})",
            config.retention.derived_max_age_secs, config.retention.original_max_age_secs
        )));
    }

    if config.converter.ffmpeg_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "converter.ffmpeg_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
