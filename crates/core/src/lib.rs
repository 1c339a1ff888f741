pub mod config;
pub mod converter;
pub mod format;
pub mod metrics;
pub mod orchestrator;
pub mod registry;
pub mod storage;
pub mod sweeper;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError, RetentionConfig, ServerConfig, StorageConfig,
};
pub use converter::{Backends, Converter, ConverterConfig, ConverterError, Transcoder};
pub use format::MediaKind;
pub use orchestrator::{ConversionOrchestrator, ConvertedFile, OrchestratorError, StoredUpload};
pub use registry::FileRegistry;
pub use storage::Storage;
pub use sweeper::{RetentionSweeper, SweepReport};
