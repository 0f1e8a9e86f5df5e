//! The [`Reporter`] and [`ProgressSink`] traits plus the no-op implementation.

// ---------------------------------------------------------------------------
// ProgressSink
// ---------------------------------------------------------------------------

/// Receives a monotonically increasing completion count for one bounded
/// operation (e.g. pages synthesized out of a known total).
///
/// `completed` is the absolute count so far, not a delta. Implementations
/// must tolerate being called from any thread.
pub trait ProgressSink: Send + Sync {
    fn advance(&self, completed: u64);
}

// ---------------------------------------------------------------------------
// Reporter
// ---------------------------------------------------------------------------

/// Object-safe observer surface for pipeline output.
///
/// Held behind an `Arc<dyn Reporter>` and shared by every component; the
/// pipeline reports terminal outcomes here instead of raising them to the
/// host.
pub trait Reporter: Send + Sync {
    /// An informational line.
    fn log(&self, message: &str);

    /// A non-fatal problem (e.g. a cleanup step that failed).
    fn warn(&self, message: &str);

    /// A failure, with the causing error when one exists.
    fn error(&self, message: &str, cause: Option<&(dyn std::error::Error + 'static)>);

    /// A positive outcome worth emphasising.
    fn success(&self, message: &str);

    /// A section header marking the start of work on one document.
    fn header(&self, title: &str);

    /// A terminal success panel (title + detail) for one document.
    fn success_panel(&self, title: &str, message: &str);

    /// Open a progress scope bounded by `max`; the returned sink receives
    /// the running completion count.
    fn progress(&self, description: &str, max: u64) -> Box<dyn ProgressSink>;
}

// Compile-time assertion: Box<dyn Reporter> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn Reporter>) {}
};

// ---------------------------------------------------------------------------
// NullReporter
// ---------------------------------------------------------------------------

/// Discards every report. Mirrors a disabled observer.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

struct NullSink;

impl ProgressSink for NullSink {
    fn advance(&self, _completed: u64) {}
}

impl Reporter for NullReporter {
    fn log(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str, _cause: Option<&(dyn std::error::Error + 'static)>) {}
    fn success(&self, _message: &str) {}
    fn header(&self, _title: &str) {}
    fn success_panel(&self, _title: &str, _message: &str) {}

    fn progress(&self, _description: &str, _max: u64) -> Box<dyn ProgressSink> {
        Box::new(NullSink)
    }
}

// ---------------------------------------------------------------------------
// RecordingReporter  (test-only)
// ---------------------------------------------------------------------------

/// One captured [`Reporter`] call.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedEvent {
    Log(String),
    Warn(String),
    Error(String),
    Success(String),
    Header(String),
    SuccessPanel(String, String),
    ProgressOpened { description: String, max: u64 },
}

/// A [`Reporter`] that records every call, including the completion counts
/// pushed into progress scopes, for test assertions.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingReporter {
    events: std::sync::Mutex<Vec<RecordedEvent>>,
    advances: std::sync::Arc<std::sync::Mutex<Vec<u64>>>,
}

#[cfg(test)]
impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Every value pushed through any progress sink, in order.
    pub fn advances(&self) -> Vec<u64> {
        self.advances.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RecordedEvent::Warn(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RecordedEvent::Error(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: RecordedEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[cfg(test)]
struct RecordingSink {
    advances: std::sync::Arc<std::sync::Mutex<Vec<u64>>>,
}

#[cfg(test)]
impl ProgressSink for RecordingSink {
    fn advance(&self, completed: u64) {
        self.advances.lock().unwrap().push(completed);
    }
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn log(&self, message: &str) {
        self.push(RecordedEvent::Log(message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.push(RecordedEvent::Warn(message.to_string()));
    }

    fn error(&self, message: &str, _cause: Option<&(dyn std::error::Error + 'static)>) {
        self.push(RecordedEvent::Error(message.to_string()));
    }

    fn success(&self, message: &str) {
        self.push(RecordedEvent::Success(message.to_string()));
    }

    fn header(&self, title: &str) {
        self.push(RecordedEvent::Header(title.to_string()));
    }

    fn success_panel(&self, title: &str, message: &str) {
        self.push(RecordedEvent::SuccessPanel(
            title.to_string(),
            message.to_string(),
        ));
    }

    fn progress(&self, description: &str, max: u64) -> Box<dyn ProgressSink> {
        self.push(RecordedEvent::ProgressOpened {
            description: description.to_string(),
            max,
        });
        Box::new(RecordingSink {
            advances: std::sync::Arc::clone(&self.advances),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_reporter_accepts_everything() {
        let r = NullReporter;
        r.log("a");
        r.warn("b");
        r.error("c", None);
        r.success("d");
        r.header("e");
        r.success_panel("f", "g");
        r.progress("h", 3).advance(1);
    }

    #[test]
    fn recording_reporter_captures_in_order() {
        let r = RecordingReporter::new();
        r.header("doc.pdf");
        r.log("2 pages");
        r.warn("slow disk");

        assert_eq!(
            r.events(),
            vec![
                RecordedEvent::Header("doc.pdf".into()),
                RecordedEvent::Log("2 pages".into()),
                RecordedEvent::Warn("slow disk".into()),
            ]
        );
    }

    #[test]
    fn recording_reporter_collects_progress_advances() {
        let r = RecordingReporter::new();
        let sink = r.progress("Synthesizing", 2);
        sink.advance(1);
        sink.advance(2);

        assert_eq!(r.advances(), vec![1, 2]);
        assert_eq!(
            r.events(),
            vec![RecordedEvent::ProgressOpened {
                description: "Synthesizing".into(),
                max: 2
            }]
        );
    }
}
