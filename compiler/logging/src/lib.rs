#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Logging utilities for the orchestrator.
//!
//! Two channels exist. Internal diagnostics use `tracing` and go to stderr
//! once [`init_tracing`] installed a subscriber. Records produced by plugins
//! go through [`ConsoleRLogger`], which prints them for the user with the
//! name of the plugin that emitted them.

use async_trait::async_trait;
use plugins::{Level, RLogger};

/// Installs a stderr `tracing` subscriber at `level`.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(level: tracing::Level) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

/// Parses a level name such as `info` or `DEBUG`.
pub fn parse_level(name: &str) -> Option<tracing::Level> { name.trim().parse().ok() }

/// Output stream of a console record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

/// Prints plugin log records to the console.
///
/// Lifecycle records go to stdout unprefixed, warnings to stdout with
/// `[WARN]`, errors to stderr with `[ERROR]`. Debug records are printed
/// with `[DEBUG]` only when debug output is enabled.
#[derive(Debug, Clone)]
pub struct ConsoleRLogger {
    header: String,
    debug: bool,
}

impl ConsoleRLogger {
    /// Logger whose records are prefixed with `header`. A blank header adds
    /// no prefix.
    pub fn new(header: &str, debug: bool) -> Self {
        let header = if header.trim().is_empty() { String::new() } else { format!("{}: ", header) };
        Self { header, debug }
    }

    /// Line printed for a record, and where it goes. `None` if the record is
    /// suppressed.
    pub fn render(&self, level: Level, message: &str) -> Option<(Stream, String)> {
        match level {
            Level::Debug if !self.debug => None,
            Level::Debug => Some((Stream::Stdout, format!("[DEBUG] {}{}", self.header, message))),
            Level::Lifecycle => Some((Stream::Stdout, format!("{}{}", self.header, message))),
            Level::Warn => Some((Stream::Stdout, format!("[WARN] {}{}", self.header, message))),
            Level::Error => Some((Stream::Stderr, format!("[ERROR] {}{}", self.header, message))),
        }
    }
}

#[async_trait]
impl RLogger for ConsoleRLogger {
    fn is_debug_enabled(&self) -> bool { self.debug }

    async fn log(&self, level: Level, message: &str) {
        match self.render(level, message) {
            Some((Stream::Stdout, line)) => println!("{}", line),
            Some((Stream::Stderr, line)) => eprintln!("{}", line),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let logger = ConsoleRLogger::new("json", false);
        assert_eq!(logger.render(Level::Debug, "hidden"), None);
        assert_eq!(logger.render(Level::Lifecycle, "done"), Some((Stream::Stdout, "json: done".to_string())));
        assert_eq!(logger.render(Level::Warn, "odd"), Some((Stream::Stdout, "[WARN] json: odd".to_string())));
        assert_eq!(
            logger.render(Level::Error, "broken"),
            Some((Stream::Stderr, "[ERROR] json: broken".to_string()))
        );

        let verbose = ConsoleRLogger::new("  ", true);
        assert!(verbose.is_debug_enabled());
        assert_eq!(verbose.render(Level::Debug, "detail"), Some((Stream::Stdout, "[DEBUG] detail".to_string())));
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(tracing::Level::DEBUG));
        assert_eq!(parse_level("WARN"), Some(tracing::Level::WARN));
        assert_eq!(parse_level("loud"), None);
    }

    #[tokio::test]
    async fn test_default_methods_route_through_log() {
        let logger = ConsoleRLogger::new("rrgen", false);
        logger.lifecycle("printing to stdout").await;
        logger.debug("suppressed").await;
    }
}
