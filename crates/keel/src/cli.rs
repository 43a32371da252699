//! Command-line arguments.

use std::fmt;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use keel_telemetry::rotate::DEFAULT_MAX_BYTES;

/// Default prefix for environment variable overrides.
pub const DEFAULT_ENV_PREFIX: &str = "KEEL";

/// Default `keel pipe` line template.
pub const DEFAULT_PIPE_FORMAT: &str = "[{timestamp}]: {message}";

/// Validate configuration files, set up logging, and rotate piped logs.
#[derive(Parser, Debug)]
#[command(name = "keel", version = crate::VERSION, about)]
pub struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate the configuration and print it with defaults applied
    Check(ConfigArgs),
    /// Validate the configuration, set up logging, and run
    Run(ConfigArgs),
    /// Copy stdin into a size-rotated log file
    Pipe(PipeArgs),
}

/// Arguments shared by commands that load the configuration file.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to configuration file (YAML, JSON or TOML)
    #[arg(short, long, default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Deployment environment
    #[arg(short, long, value_enum)]
    pub environment: Environment,

    /// Reject configuration keys the schema does not declare
    #[arg(long)]
    pub strict: bool,

    /// Prefix of environment variables overriding configuration values,
    /// e.g. KEEL__MYSQL__PORT=3307
    #[arg(long, default_value = DEFAULT_ENV_PREFIX)]
    pub env_prefix: String,
}

/// Deployment environment.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Production.
    Prod,
    /// Staging.
    Stg,
    /// Quality assurance.
    Qa,
    /// Development.
    Dev,
}

impl Environment {
    /// Short name as given on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prod => "prod",
            Self::Stg => "stg",
            Self::Qa => "qa",
            Self::Dev => "dev",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments for `keel pipe`.
#[derive(Args, Debug, Clone)]
pub struct PipeArgs {
    /// Log file path
    #[arg(short, long)]
    pub log: PathBuf,

    /// Bytes per log file before rotating (0 disables rotation)
    #[arg(short, long, default_value_t = DEFAULT_MAX_BYTES)]
    pub bytes: u64,

    /// Number of rotated files kept
    #[arg(short, long, default_value_t = 9)]
    pub number: usize,

    /// Prefix each line with a timestamp
    #[arg(short, long)]
    pub timestamp: bool,

    /// Also echo every line to stdout
    #[arg(short, long)]
    pub show: bool,

    /// Timestamp format (strftime), used with --timestamp
    #[arg(short, long, default_value = "%Y-%m-%d %H:%M:%S %z")]
    pub datefmt: String,

    /// Line template with {timestamp} and {message} placeholders, used with
    /// --timestamp
    #[arg(short, long, default_value = DEFAULT_PIPE_FORMAT)]
    pub format: String,
}

fn default_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_default()
        .join(".config.yaml")
}
