//! Observer surface for everything the pipeline wants a human to see.
//!
//! Core components never print to a terminal; they talk to a [`Reporter`].
//! [`ConsoleReporter`] renders through the `log` facade, [`NullReporter`]
//! discards everything (useful as a default in embedding contexts), and the
//! test-only `RecordingReporter` captures calls for assertions.

pub mod console;
pub mod reporter;

pub use console::ConsoleReporter;
pub use reporter::{NullReporter, ProgressSink, Reporter};

#[cfg(test)]
pub use reporter::{RecordedEvent, RecordingReporter};
