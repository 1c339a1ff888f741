//! Request orchestrator for uploads and conversions.
//!
//! Ties the storage directory, the original-file registry and the conversion
//! backends together:
//! - **Upload**: validate the extension, store under a unique name, register as
//!   original, then enforce the size limit
//! - **Convert**: check the original still exists and the target fits its media
//!   kind, dispatch to the backend and hand back a [`ConvertedFile`] that deletes
//!   itself once dropped

mod error;
mod runner;
mod types;

pub use error::OrchestratorError;
pub use runner::ConversionOrchestrator;
pub use types::{ConvertedFile, StoredUpload};
