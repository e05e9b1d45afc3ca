//! What happens when a plugin reports errors through its logger.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use plugins::{Level, RLogger};

/// Reaction to `ERROR` records emitted by a plugin.
///
/// Error records never break the protocol; the plugin always finishes its
/// request. The policy decides whether the run continues afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop after the first plugin that reported errors.
    #[default]
    Abort,
    /// Report the errors and go on with the next plugin.
    Ignore,
}

impl ErrorPolicy {
    /// `Ignore` when `ignore_errors` is set, `Abort` otherwise.
    pub fn from_ignore_errors(ignore_errors: bool) -> Self {
        if ignore_errors {
            ErrorPolicy::Ignore
        } else {
            ErrorPolicy::Abort
        }
    }
}

/// Forwards to another logger and counts the `ERROR` records.
pub struct ErrorCountingLogger {
    inner: Arc<dyn RLogger>,
    errors: AtomicUsize,
}

impl ErrorCountingLogger {
    /// Wraps `inner`.
    pub fn new(inner: Arc<dyn RLogger>) -> Self { Self { inner, errors: AtomicUsize::new(0) } }

    /// Number of `ERROR` records seen so far.
    pub fn error_count(&self) -> usize { self.errors.load(Ordering::Relaxed) }
}

#[async_trait]
impl RLogger for ErrorCountingLogger {
    fn is_debug_enabled(&self) -> bool { self.inner.is_debug_enabled() }

    async fn log(&self, level: Level, message: &str) {
        if level == Level::Error {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
        self.inner.log(level, message).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Lines(Mutex<Vec<String>>);

    #[async_trait]
    impl RLogger for Lines {
        fn is_debug_enabled(&self) -> bool { false }

        async fn log(&self, level: Level, message: &str) {
            self.0.lock().expect("lock should not be poisoned").push(format!("{} {}", level, message));
        }
    }

    #[tokio::test]
    async fn test_counts_only_errors() {
        let lines = Arc::new(Lines::default());
        let logger = ErrorCountingLogger::new(lines.clone());
        logger.lifecycle("start").await;
        logger.error("first").await;
        logger.warning("odd").await;
        logger.error("second").await;

        assert_eq!(logger.error_count(), 2);
        assert_eq!(lines.0.lock().expect("lock should not be poisoned").len(), 4);
    }

    #[test]
    fn test_policy_from_flag() {
        assert_eq!(ErrorPolicy::from_ignore_errors(true), ErrorPolicy::Ignore);
        assert_eq!(ErrorPolicy::from_ignore_errors(false), ErrorPolicy::Abort);
        assert_eq!(ErrorPolicy::default(), ErrorPolicy::Abort);
    }
}
