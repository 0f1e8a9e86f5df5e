//! Console rendering of the [`Reporter`] surface through the `log` facade.

use super::reporter::{ProgressSink, Reporter};

// ---------------------------------------------------------------------------
// ConsoleReporter
// ---------------------------------------------------------------------------

/// Renders pipeline output as `log` records, so the usual `RUST_LOG`
/// filtering applies.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for ConsoleReporter {
    fn log(&self, message: &str) {
        log::info!("{message}");
    }

    fn warn(&self, message: &str) {
        log::warn!("{message}");
    }

    fn error(&self, message: &str, cause: Option<&(dyn std::error::Error + 'static)>) {
        match cause {
            Some(err) => log::error!("{message}: {err}"),
            None => log::error!("{message}"),
        }
    }

    fn success(&self, message: &str) {
        log::info!("✔ {message}");
    }

    fn header(&self, title: &str) {
        log::info!("── {title} ──");
    }

    fn success_panel(&self, title: &str, message: &str) {
        log::info!("✔ {title}: {message}");
    }

    fn progress(&self, description: &str, max: u64) -> Box<dyn ProgressSink> {
        Box::new(ConsoleProgress {
            description: description.to_string(),
            max,
        })
    }
}

// ---------------------------------------------------------------------------
// ConsoleProgress
// ---------------------------------------------------------------------------

struct ConsoleProgress {
    description: String,
    max: u64,
}

impl ProgressSink for ConsoleProgress {
    fn advance(&self, completed: u64) {
        log::info!("{}: {completed}/{}", self.description, self.max);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
