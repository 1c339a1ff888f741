use std::sync::Arc;
use convertino_core::{Config, ConversionOrchestrator};

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: Arc<ConversionOrchestrator>,
}

impl AppState {
    pub fn new(config: Config, orchestrator: Arc<ConversionOrchestrator>) -> Self {
        Self {
            config,
            orchestrator,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn orchestrator(&self) -> &ConversionOrchestrator {
        self.orchestrator.as_ref()
    }
}
