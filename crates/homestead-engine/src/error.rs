//! Error types for the engine binary.

use homestead_core::{ConfigError, FarmsteadError};

/// Errors that can abort the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration could not be loaded.
    #[error("configuration error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The farmstead failed to build or run.
    #[error("farmstead error: {source}")]
    Farmstead {
        /// The underlying farmstead error.
        #[from]
        source: FarmsteadError,
    },
}
