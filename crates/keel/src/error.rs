//! Application error types.

use thiserror::Error;

use keel_config::ConfigError;
use keel_telemetry::TelemetryError;

/// Errors returned by keel commands.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded or failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging could not be set up.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// The validated configuration could not be rendered.
    #[error("failed to render configuration: {0}")]
    Render(#[from] serde_json::Error),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for keel commands.
pub type AppResult<T> = Result<T, AppError>;
