//! keel: validated configuration, logging setup, and log rotation.
//!
//! The binary has three commands:
//!
//! - `keel check`: load the configuration file, validate it against
//!   [`app::schema`], and print it with defaults filled in
//! - `keel run`: the same, then set up logging from the `log` section and run
//!   the application work
//! - `keel pipe`: copy stdin into size-rotated log files
//!
//! Configuration errors are reported before logging is initialized and end
//! the process with a failure status.

#![warn(missing_docs)]

pub mod app;
pub mod cli;
pub mod error;
pub mod pipe;

pub use cli::{Cli, Command};
pub use error::{AppError, AppResult};

/// Version of the keel binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
