//! Logging initialization.
//!
//! Installs a global `tracing` subscriber writing either to stdout or to a
//! size-rotated file. Writes go through a `tracing_appender` worker thread;
//! keep the returned [`LoggingGuard`] alive so pending lines are flushed on
//! exit.
//!
//! # Example
//!
//! ```rust,ignore
//! use keel_telemetry::{init_logging, LogConfig};
//!
//! let config = LogConfig::from_settings("/var/log/keel.log", "INFO");
//! let _guard = init_logging(&config)?;
//!
//! tracing::info!("starting");
//! ```

use std::fmt;
use std::fmt::Write as _;

use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::{NonBlocking, NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::{LogConfig, LogFormat, LogTarget};
use crate::error::TelemetryError;
use crate::rotate::RotatingFileWriter;
use crate::TelemetryResult;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Keeps the background log writer alive. Dropping it flushes buffered lines.
#[must_use = "dropping the guard stops the log writer"]
#[derive(Debug)]
pub struct LoggingGuard {
    _worker: WorkerGuard,
}

/// Initializes the logging subsystem.
///
/// # Arguments
///
/// * `config` - Logging configuration
///
/// # Errors
///
/// Returns `TelemetryError::InvalidConfig` if the configuration is invalid,
/// `TelemetryError::Io` if the log file cannot be opened, and
/// `TelemetryError::LoggingInit` if a global subscriber is already set.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<LoggingGuard> {
    config.validate()?;

    let filter = EnvFilter::try_new(config.level.as_level_filter().to_string())
        .map_err(|e| TelemetryError::LoggingInit(format!("Invalid log level: {e}")))?;

    let (writer, worker) = make_writer(config)?;

    tracing_subscriber::registry()
        .with(build_layer(config, writer).with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    Ok(LoggingGuard { _worker: worker })
}

fn make_writer(config: &LogConfig) -> TelemetryResult<(NonBlocking, WorkerGuard)> {
    let builder = NonBlockingBuilder::default().lossy(false);
    Ok(match &config.target {
        LogTarget::Stdout => builder.finish(std::io::stdout()),
        LogTarget::File(path) => builder.finish(RotatingFileWriter::open(
            path,
            config.max_bytes,
            config.backup_count,
        )?),
    })
}

fn build_layer(config: &LogConfig, writer: NonBlocking) -> BoxedLayer {
    match (config.format, &config.target) {
        (LogFormat::Json, _) => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .boxed(),
        (LogFormat::Text, LogTarget::Stdout) => tracing_subscriber::fmt::layer()
            .without_time()
            .with_level(false)
            .with_target(false)
            .with_ansi(false)
            .with_writer(writer)
            .boxed(),
        (LogFormat::Text, LogTarget::File(_)) => tracing_subscriber::fmt::layer()
            .event_format(BracketFormat::new(&config.date_format))
            .with_ansi(false)
            .with_writer(writer)
            .boxed(),
    }
}

/// Event format producing `[timestamp] LEVEL: message`.
#[derive(Debug, Clone)]
pub struct BracketFormat {
    date_format: String,
}

impl BracketFormat {
    /// Create a formatter using a strftime `date_format`.
    pub fn new(date_format: &str) -> Self {
        Self {
            date_format: date_format.to_string(),
        }
    }
}

impl<S, N> FormatEvent<S, N> for BracketFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let now = chrono::Local::now();
        write!(
            writer,
            "[{}] {}: ",
            now.format(&self.date_format),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_bracket_format() {
        let buffer = Buffer::default();
        let make_writer = {
            let buffer = buffer.clone();
            move || buffer.clone()
        };
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .event_format(BracketFormat::new("%Y"))
            .with_writer(make_writer)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("disk almost full");
        });

        let out = buffer.contents();
        assert!(out.starts_with('['), "unexpected output: {out}");
        assert!(out.ends_with("] WARN: disk almost full\n"), "unexpected output: {out}");
    }

    #[test]
    fn test_json_layer() {
        let buffer = Buffer::default();
        let config = LogConfig::builder().format(LogFormat::Json).build();
        let (writer, worker) = NonBlockingBuilder::default()
            .lossy(false)
            .finish(buffer.clone());
        let subscriber = tracing_subscriber::registry().with(build_layer(&config, writer));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(port = 3306, "database target");
        });
        drop(worker);

        let out = buffer.contents();
        let line: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(line["level"], "INFO");
        assert_eq!(line["fields"]["message"], "database target");
        assert_eq!(line["fields"]["port"], 3306);
    }

    #[test]
    fn test_invalid_config_rejected_before_install() {
        let config = LogConfig::builder().date_format("%Q").build();
        assert!(matches!(
            init_logging(&config),
            Err(TelemetryError::InvalidConfig(_))
        ));
    }
}
