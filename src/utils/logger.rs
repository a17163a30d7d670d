//! Logging utilities
//!
//! Provides logging configuration and helpers.

use std::fmt;
use tracing::{Level, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Log level configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Level for the command line: `--verbose` wins over the configured level
    pub fn resolve(verbose: bool, configured: &str) -> Self {
        if verbose {
            LogLevel::Debug
        } else {
            Self::from_str(configured).unwrap_or(LogLevel::Info)
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_tracing_level())
    }
}

/// Filter directive limiting output to this crate
fn filter_directive(level: LogLevel) -> String {
    format!("render_tester={}", level.to_tracing_level())
}

fn subscriber<W>(level: LogLevel, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter_directive(level)))
        .with_target(false)
        .with_writer(writer)
        .compact()
        .finish()
}

/// Initialize the logger with specified level. Logs go to stderr so that
/// stdout carries only command output.
pub fn init_logger(level: LogLevel) {
    subscriber(level, std::io::stderr).init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_log_level_from_str() {
        assert_eq!(LogLevel::from_str("info"), Some(LogLevel::Info));
        assert_eq!(LogLevel::from_str("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_str("unknown"), None);
    }

    #[test]
    fn test_resolve() {
        assert_eq!(LogLevel::resolve(true, "error"), LogLevel::Debug);
        assert_eq!(LogLevel::resolve(false, "warn"), LogLevel::Warn);
        assert_eq!(LogLevel::resolve(false, "loud"), LogLevel::Info);
    }

    #[test]
    fn test_subscriber_writes_to_given_writer() {
        let buffer = Captured::default();
        let sink = buffer.clone();
        tracing::subscriber::with_default(subscriber(LogLevel::Info, move || sink.clone()), || {
            tracing::info!("engine loaded");
            tracing::debug!("payload built");
            tracing::info!(target: "other_crate", "noise");
        });

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("engine loaded"));
        assert!(!output.contains("payload built"));
        assert!(!output.contains("noise"));
    }

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive(LogLevel::Debug), "render_tester=DEBUG");
    }
}
