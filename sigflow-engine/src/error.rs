//! Error types for the engine crate.

use sigflow_core::config::ConfigError;
use thiserror::Error;

pub use crate::stream::StreamError;

/// Errors surfaced by the source facades.
///
/// Stream cancellation is not in here: the worker treats it as its normal exit.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("source is running; stop it before re-initializing")]
    Busy,
}
