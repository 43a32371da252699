//! `keel pipe`: write stdin into size-rotated log files.
//!
//! Lines are copied byte for byte, so input that is not valid UTF-8 passes
//! through unchanged. With `--timestamp` each line is rendered through the
//! `--format` template, where `{timestamp}` and `{message}` are substituted.

use std::io::{BufRead, Write};

use chrono::Local;
use keel_telemetry::{LogConfig, RotatingFileWriter};

use crate::cli::PipeArgs;
use crate::error::AppResult;

/// Copy `input` line by line into the log file named by `args`, echoing to
/// `echo` when `--show` is set. Returns the number of lines written.
pub fn pipe<R: BufRead, W: Write>(args: &PipeArgs, mut input: R, mut echo: W) -> AppResult<u64> {
    if args.timestamp {
        LogConfig::builder()
            .date_format(&args.datefmt)
            .build()
            .validate()?;
    }

    let mut sink = RotatingFileWriter::open(&args.log, args.bytes, args.number)?;
    let mut line = Vec::new();
    let mut record = Vec::new();
    let mut count = 0;

    loop {
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            break;
        }

        record.clear();
        let message = line.strip_suffix(b"\n").unwrap_or(&line);
        if args.timestamp {
            let timestamp = Local::now().format(&args.datefmt).to_string();
            render(&args.format, &timestamp, message, &mut record);
        } else {
            record.extend_from_slice(message);
        }
        record.push(b'\n');

        // One write per line so rotation never splits a line across files.
        sink.write_all(&record)?;
        if args.show {
            echo.write_all(&line)?;
        }
        count += 1;
    }

    sink.flush()?;
    echo.flush()?;
    tracing::debug!(lines = count, log = %args.log.display(), "pipe finished");
    Ok(count)
}

// Expand `template` into `out`. `{message}` may appear any number of times.
fn render(template: &str, timestamp: &str, message: &[u8], out: &mut Vec<u8>) {
    let stamped = template.replace("{timestamp}", timestamp);
    let mut parts = stamped.split("{message}");
    if let Some(head) = parts.next() {
        out.extend_from_slice(head.as_bytes());
    }
    for part in parts {
        out.extend_from_slice(message);
        out.extend_from_slice(part.as_bytes());
    }
}
