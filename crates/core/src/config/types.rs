use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::converter::ConverterConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub converter: ConverterConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Upload storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Flat directory holding both uploads and conversion outputs.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Uploads larger than this are discarded after being saved.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_upload_bytes() -> u64 {
    100 * 1024 * 1024 // 100 MB
}

/// Retention thresholds for the background sweeper
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetentionConfig {
    /// Maximum age of an uploaded original before it is reclaimed.
    #[serde(default = "default_original_max_age")]
    pub original_max_age_secs: u64,
    /// Maximum age of any file not registered as original.
    #[serde(default = "default_derived_max_age")]
    pub derived_max_age_secs: u64,
    /// Delay between sweep cycles.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            original_max_age_secs: default_original_max_age(),
            derived_max_age_secs: default_derived_max_age(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl RetentionConfig {
    pub fn original_max_age(&self) -> Duration {
        Duration::from_secs(self.original_max_age_secs)
    }

    pub fn derived_max_age(&self) -> Duration {
        Duration::from_secs(self.derived_max_age_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

fn default_original_max_age() -> u64 {
    600 // 10 minutes
}

fn default_derived_max_age() -> u64 {
    60
}

fn default_sweep_interval() -> u64 {
    120
}
