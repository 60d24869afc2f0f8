//! Tracing initialization.
//! Builds a subscriber with EnvFilter and a compact stderr layer, plus an
//! optional non-blocking file layer. Logs go to stderr so stdout stays
//! reserved for the `Renamed:`/`Moved:` lines users may script against.

use std::fmt as stdfmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt as tsfmt;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;
use tracing_subscriber::util::SubscriberInitExt;

/// Verbosity selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Quiet,
    Normal,
    Info,
    Debug,
}

impl LogLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

/// Human-friendly timestamp formatter (DD/MM/YY HH:MM:SS).
struct LocalHumanTime;

impl FormatTime for LocalHumanTime {
    fn format_time(&self, w: &mut tsfmt::format::Writer<'_>) -> stdfmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%d/%m/%y %H:%M:%S"))
    }
}

#[inline]
fn to_level_filter(lvl: LogLevel) -> LevelFilter {
    match lvl {
        LogLevel::Quiet => LevelFilter::ERROR,
        LogLevel::Normal => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
    }
}

/// Initialize tracing. Returns the appender guard when a file layer is
/// active; it must be held until shutdown to flush buffered log lines.
pub fn init_tracing(lvl: LogLevel, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level_filter = to_level_filter(lvl);
    let env_filter = EnvFilter::default().add_directive(level_filter.into());

    let stderr_layer = tsfmt::layer()
        .with_timer(LocalHumanTime)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();

    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create log directory \"{}\"", parent.display()))?;
            }
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open log file \"{}\"", path.display()))?;
        let (writer, guard) = tracing_appender::non_blocking(file);
        let file_layer = tsfmt::layer()
            .with_timer(LocalHumanTime)
            .with_target(false)
            .with_ansi(false)
            .with_writer(writer)
            .compact();
        registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
        return Ok(Some(guard));
    }

    registry().with(env_filter).with(stderr_layer).init();
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_parse_accepts_known_names() {
        assert_eq!(LogLevel::parse("quiet"), Some(LogLevel::Quiet));
        assert_eq!(LogLevel::parse(" DEBUG "), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("verbose"), None);
    }
}
