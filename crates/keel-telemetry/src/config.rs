//! Logging configuration.

use std::fmt;
use std::path::PathBuf;

use chrono::format::{Item, StrftimeItems};
use tracing_subscriber::filter::LevelFilter;

use crate::rotate::{DEFAULT_BACKUP_COUNT, DEFAULT_MAX_BYTES};
use crate::{TelemetryError, TelemetryResult};

/// Default timestamp format for file logs.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Named log level, as written in configuration files.
///
/// `Critical` has no direct tracing equivalent and filters at `ERROR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Debug and above.
    Debug,
    /// Info and above.
    Info,
    /// Warnings and above.
    Warn,
    /// Errors only.
    Error,
    /// Critical failures only.
    #[default]
    Critical,
}

impl LogLevel {
    /// Parse a level name, case-insensitively.
    ///
    /// Unrecognized or empty names fall back to [`LogLevel::Critical`], so a
    /// typo in the configuration silences logging rather than failing.
    ///
    /// ```
    /// use keel_telemetry::LogLevel;
    ///
    /// assert_eq!(LogLevel::from_name("debug"), LogLevel::Debug);
    /// assert_eq!(LogLevel::from_name("WARNING"), LogLevel::Warn);
    /// assert_eq!(LogLevel::from_name("verbose"), LogLevel::Critical);
    /// ```
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_uppercase().as_str() {
            "DEBUG" => Self::Debug,
            "INFO" => Self::Info,
            "WARN" | "WARNING" => Self::Warn,
            "ERROR" => Self::Error,
            _ => Self::Critical,
        }
    }

    /// The tracing filter this level maps to.
    pub fn as_level_filter(self) -> LevelFilter {
        match self {
            Self::Debug => LevelFilter::DEBUG,
            Self::Info => LevelFilter::INFO,
            Self::Warn => LevelFilter::WARN,
            Self::Error | Self::Critical => LevelFilter::ERROR,
        }
    }

    /// Upper-case level name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogTarget {
    /// Standard output.
    #[default]
    Stdout,
    /// A size-rotated file.
    File(PathBuf),
}

impl LogTarget {
    /// Interpret a `log.file` setting. `stdout`, `-` and the empty string mean
    /// standard output; anything else is a file path.
    pub fn from_setting(value: &str) -> Self {
        match value.trim() {
            "" | "-" | "stdout" => Self::Stdout,
            path => Self::File(PathBuf::from(path)),
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Plain text. On stdout only the message is printed; in files each line
    /// is prefixed with `[timestamp] LEVEL: `.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parse a format name. `json` (any case) selects JSON; anything else is
    /// text.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Destination.
    pub target: LogTarget,

    /// Minimum level.
    pub level: LogLevel,

    /// Line format.
    pub format: LogFormat,

    /// Rotate the log file once it would exceed this size. Zero disables
    /// rotation.
    pub max_bytes: u64,

    /// Number of rotated files kept.
    pub backup_count: usize,

    /// strftime format for file timestamps.
    pub date_format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            target: LogTarget::Stdout,
            level: LogLevel::default(),
            format: LogFormat::Text,
            max_bytes: DEFAULT_MAX_BYTES,
            backup_count: DEFAULT_BACKUP_COUNT,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl LogConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> LogConfigBuilder {
        LogConfigBuilder::default()
    }

    /// Build a configuration from the `log.file` and `log.level` settings.
    pub fn from_settings(file: &str, level: &str) -> Self {
        Self {
            target: LogTarget::from_setting(file),
            level: LogLevel::from_name(level),
            ..Self::default()
        }
    }

    /// Check that the configuration can be used.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::InvalidConfig` if the date format contains an
    /// unknown strftime specifier.
    pub fn validate(&self) -> TelemetryResult<()> {
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(TelemetryError::InvalidConfig(format!(
                "invalid date format: {}",
                self.date_format
            )));
        }
        Ok(())
    }
}

/// Builder for [`LogConfig`].
#[derive(Debug, Default)]
pub struct LogConfigBuilder {
    config: LogConfig,
}

impl LogConfigBuilder {
    /// Sets the destination.
    #[must_use]
    pub fn target(mut self, target: LogTarget) -> Self {
        self.config.target = target;
        self
    }

    /// Sets the destination to a file.
    #[must_use]
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.target = LogTarget::File(path.into());
        self
    }

    /// Sets the minimum level.
    #[must_use]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    /// Sets the line format.
    #[must_use]
    pub fn format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Sets the rotation threshold.
    #[must_use]
    pub fn max_bytes(mut self, max_bytes: u64) -> Self {
        self.config.max_bytes = max_bytes;
        self
    }

    /// Sets the number of rotated files kept.
    #[must_use]
    pub fn backup_count(mut self, backup_count: usize) -> Self {
        self.config.backup_count = backup_count;
        self
    }

    /// Sets the timestamp format.
    #[must_use]
    pub fn date_format(mut self, date_format: &str) -> Self {
        self.config.date_format = date_format.to_string();
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> LogConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_names() {
        assert_eq!(LogLevel::from_name("DEBUG"), LogLevel::Debug);
        assert_eq!(LogLevel::from_name("Info"), LogLevel::Info);
        assert_eq!(LogLevel::from_name("warn"), LogLevel::Warn);
        assert_eq!(LogLevel::from_name("ERROR"), LogLevel::Error);
        assert_eq!(LogLevel::from_name("CRITICAL"), LogLevel::Critical);
    }

    #[test]
    fn test_unknown_level_falls_back_to_critical() {
        assert_eq!(LogLevel::from_name(""), LogLevel::Critical);
        assert_eq!(LogLevel::from_name("TRACE"), LogLevel::Critical);
    }

    #[test]
    fn test_level_filters() {
        assert_eq!(LogLevel::Info.as_level_filter(), LevelFilter::INFO);
        assert_eq!(LogLevel::Critical.as_level_filter(), LevelFilter::ERROR);
    }

    #[test]
    fn test_target_from_setting() {
        assert_eq!(LogTarget::from_setting("stdout"), LogTarget::Stdout);
        assert_eq!(LogTarget::from_setting(""), LogTarget::Stdout);
        assert_eq!(LogTarget::from_setting("-"), LogTarget::Stdout);
        assert_eq!(
            LogTarget::from_setting("/var/log/keel.log"),
            LogTarget::File(PathBuf::from("/var/log/keel.log"))
        );
    }

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.target, LogTarget::Stdout);
        assert_eq!(config.max_bytes, 10_485_760);
        assert_eq!(config.backup_count, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_settings() {
        let config = LogConfig::from_settings("app.log", "INFO");
        assert_eq!(config.target, LogTarget::File(PathBuf::from("app.log")));
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Text);
    }

    #[test]
    fn test_format_names() {
        assert_eq!(LogFormat::from_name("json"), LogFormat::Json);
        assert_eq!(LogFormat::from_name(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::from_name("text"), LogFormat::Text);
        assert_eq!(LogFormat::from_name("yaml"), LogFormat::Text);
    }

    #[test]
    fn test_builder() {
        let config = LogConfig::builder()
            .file("/tmp/app.log")
            .level(LogLevel::Debug)
            .format(LogFormat::Json)
            .max_bytes(1024)
            .backup_count(3)
            .build();

        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.max_bytes, 1024);
        assert_eq!(config.backup_count, 3);
    }

    #[test]
    fn test_invalid_date_format() {
        let config = LogConfig::builder().date_format("%Q").build();
        assert!(matches!(
            config.validate(),
            Err(TelemetryError::InvalidConfig(_))
        ));
    }
}
