//! Logging setup and helpers.
//!
//! Lines look like `2026-03-01T08:00:00Z [INFO] message`. With a log file configured the file
//! always receives every line and the console only echoes when stdout is a TTY.

use std::io::Write;

use crate::config::LoggingConfig;

/// Where console output goes. The tool adapter speaks its protocol on stdout, so it logs to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    Stdout,
    Stderr,
}

/// Install the global `env_logger`.
///
/// `verbosity` (the `-v` count) overrides the configured level when non-zero.
pub fn init_logging(config: Option<&LoggingConfig>, verbosity: u8, sink: LogSink) {
    let mut builder = env_logger::Builder::new();
    let base_level = match verbosity {
        0 => config
            .map(LoggingConfig::level_filter)
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);
    builder.target(match sink {
        LogSink::Stdout => env_logger::Target::Stdout,
        LogSink::Stderr => env_logger::Target::Stderr,
    });

    let log_file = config.and_then(|c| c.file.as_ref()).and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        let echo = match sink {
            LogSink::Stdout => atty::is(atty::Stream::Stdout),
            LogSink::Stderr => atty::is(atty::Stream::Stderr),
        };
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if echo {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}

/// Escape a user-supplied string (pet names, action names) for single-line logging.
///
/// Control characters become escapes and anything past 64 characters is cut with an ellipsis.
pub fn escape_log(s: &str) -> String {
    const MAX_PREVIEW: usize = 64;
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}
