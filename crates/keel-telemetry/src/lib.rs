//! Logging setup for keel.
//!
//! This crate turns the `log` section of a validated configuration into a
//! ready-to-use `tracing` subscriber:
//!
//! - **stdout**: message-only lines
//! - **file**: `[timestamp] LEVEL: message` lines, rotated by size
//! - **JSON**: one object per line, to either destination
//!
//! Level names follow the usual `DEBUG`, `INFO`, `WARN`, `ERROR`,
//! `CRITICAL` spelling; unknown names fall back to `CRITICAL`.
//!
//! # Example
//!
//! ```rust,ignore
//! use keel_telemetry::{init_logging, LogConfig};
//!
//! let config = LogConfig::from_settings("stdout", "INFO");
//! let _guard = init_logging(&config)?;
//!
//! tracing::info!("starting");
//! ```
//!
//! The [`RotatingFileWriter`] is also usable on its own as an
//! [`std::io::Write`] sink.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;
pub mod rotate;

pub use config::{LogConfig, LogConfigBuilder, LogFormat, LogLevel, LogTarget};
pub use error::TelemetryError;
pub use logging::{init_logging, BracketFormat, LoggingGuard};
pub use rotate::RotatingFileWriter;

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
