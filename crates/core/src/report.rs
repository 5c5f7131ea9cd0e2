//! Leveled progress reporting handed to pipeline components.
//!
//! Components receive an `Arc<dyn Reporter>` instead of writing to a
//! process-wide logger, so callers decide where messages go.

use std::sync::Mutex;
use tracing::Level;

/// Sink for leveled pipeline messages.
pub trait Reporter: Send + Sync {
    fn report(&self, level: Level, message: &str);

    fn debug(&self, message: &str) {
        self.report(Level::DEBUG, message);
    }

    fn info(&self, message: &str) {
        self.report(Level::INFO, message);
    }

    fn warn(&self, message: &str) {
        self.report(Level::WARN, message);
    }

    fn error(&self, message: &str) {
        self.report(Level::ERROR, message);
    }
}

/// Forwards messages to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!("{message}"),
            Level::WARN => tracing::warn!("{message}"),
            Level::INFO => tracing::info!("{message}"),
            Level::DEBUG => tracing::debug!("{message}"),
            Level::TRACE => tracing::trace!("{message}"),
        }
    }
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    messages: Mutex<Vec<(Level, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded messages, oldest first.
    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Messages recorded at exactly `level`.
    pub fn at(&self, level: Level) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, level: Level, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((level, message.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_reporter_records_levels() {
        let reporter = MemoryReporter::new();
        reporter.info("fetched");
        reporter.warn("all URLs failed");
        reporter.debug("trying");

        let messages = reporter.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], (Level::INFO, "fetched".to_string()));
        assert_eq!(reporter.at(Level::WARN), vec!["all URLs failed".to_string()]);
    }

    #[test]
    fn test_memory_reporter_empty() {
        let reporter = MemoryReporter::new();
        assert!(reporter.messages().is_empty());
        assert!(reporter.at(Level::ERROR).is_empty());
    }

    #[test]
    fn test_tracing_reporter_does_not_panic_without_subscriber() {
        let reporter = TracingReporter;
        reporter.error("render fault");
        reporter.report(Level::TRACE, "noise");
    }
}
