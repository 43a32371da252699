//! Application configuration schema and the `check` / `run` commands.

use std::fmt;

use keel_config::{Config, ConfigLoader, Schema, Validator, ValueKind};
use keel_telemetry::{init_logging, LogConfig, LogFormat};
use serde::Deserialize;
use tracing::{error, info};

use crate::cli::{ConfigArgs, Environment};
use crate::error::AppResult;

/// The schema every keel configuration file is validated against.
///
/// ```yaml
/// log:
///   file: stdout      # default
///   level: INFO       # default
///   format: text      # default, or json
/// mysql:
///   host: db1         # required
///   port: 3306        # required
///   user: app         # required
///   passwd: secret    # required
///   db: inventory     # required
/// ```
pub fn schema() -> Schema {
    Schema::new()
        .nested(
            "log",
            Schema::new()
                .with_default("file", "stdout")
                .with_default("level", "INFO")
                .with_default("format", "text"),
        )
        .nested(
            "mysql",
            Schema::new()
                .required("host", ValueKind::String)
                .required("port", ValueKind::Integer)
                .required("user", ValueKind::String)
                .required("passwd", ValueKind::String)
                .required("db", ValueKind::String),
        )
}

/// The `log` section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LogSettings {
    /// `stdout` or a file path.
    pub file: String,
    /// Level name.
    pub level: String,
    /// `text` or `json`.
    pub format: String,
}

impl LogSettings {
    /// Logging configuration for these settings.
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            format: LogFormat::from_name(&self.format),
            ..LogConfig::from_settings(&self.file, &self.level)
        }
    }
}

/// The `mysql` section.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct MysqlSettings {
    /// Server host name.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// User name.
    pub user: String,
    /// Password.
    pub passwd: String,
    /// Database name.
    pub db: String,
}

impl fmt::Debug for MysqlSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MysqlSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("passwd", &"<redacted>")
            .field("db", &self.db)
            .finish()
    }
}

/// Load and validate the configuration named by `args`.
///
/// Sources, later overriding earlier: a `.env` file in the working
/// directory, the configuration file, then `<PREFIX>__SECTION__KEY`
/// environment variables.
pub fn load(args: &ConfigArgs) -> AppResult<Config> {
    let schema = schema();
    let validator = Validator::new(&schema).with_strict(args.strict);

    let config = ConfigLoader::new()
        .with_dotenv()?
        .with_file(&args.config)?
        .with_env_prefix(&args.env_prefix)
        .load(&validator)?;

    Ok(config)
}

/// `keel check`: the validated configuration as pretty JSON.
pub fn check(args: &ConfigArgs) -> AppResult<String> {
    let config = load(args)?;
    Ok(serde_json::to_string_pretty(&config)?)
}

/// `keel run`: validate, set up logging, then do the work.
///
/// Configuration errors are returned before any logging is set up. Once
/// logging is live, a failure in the work itself is logged and returned.
pub fn run(args: &ConfigArgs) -> AppResult<()> {
    let config = load(args)?;
    let log: LogSettings = config.section("log")?;
    let _guard = init_logging(&log.to_log_config())?;

    info!(environment = %args.environment, "starting");
    match work(&config, args.environment) {
        Ok(()) => {
            info!("successful done");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "script failed");
            Err(e)
        }
    }
}

/// The application's work, given a validated configuration.
pub fn work(config: &Config, environment: Environment) -> AppResult<()> {
    let mysql: MysqlSettings = config.section("mysql")?;
    info!(
        environment = %environment,
        host = %mysql.host,
        port = mysql.port,
        user = %mysql.user,
        db = %mysql.db,
        "database target"
    );
    Ok(())
}
