//! Fallback synthesis through the macOS `say` command.
//!
//! Unlike [`PiperTts`](crate::tts::PiperTts), `say` receives the whole
//! document as one stdin stream and writes one audio file directly — there
//! is no parts workspace and no concat step. Progress advances as each
//! page line lands on the pipe.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::exec::{CommandRunner, CommandSpec, OutputSink, StdinFeed};
use crate::report::{ProgressSink, Reporter};
use crate::tts::engine::{TtsEngine, TtsError};

// ---------------------------------------------------------------------------
// SayTts
// ---------------------------------------------------------------------------

/// Whole-stream engine backed by `/usr/bin/say`.
///
/// The voice model path is ignored — `say` uses the system voice.
pub struct SayTts {
    say_path: String,
    runner: Arc<dyn CommandRunner>,
    reporter: Arc<dyn Reporter>,
}

impl SayTts {
    pub fn new(
        say_path: impl Into<String>,
        runner: Arc<dyn CommandRunner>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            say_path: say_path.into(),
            runner,
            reporter,
        }
    }
}

#[async_trait]
impl TtsEngine for SayTts {
    async fn generate(
        &self,
        pages: &[String],
        output: &Path,
        _model: &Path,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<(), TtsError> {
        self.reporter.log("using the 'say' engine...");

        let spec = CommandSpec::new(&self.say_path)
            .arg("-o")
            .arg(output.display().to_string())
            .arg("--data-format=LEI16@22050");

        let feed = StdinFeed::new(pages.to_vec())
            .with_progress(move |written| {
                if let Some(sink) = progress {
                    sink.advance(written as u64);
                }
            });

        let reporter = &self.reporter;
        let sink = OutputSink::new().on_stderr(move |line| reporter.log(&format!("[say] {line}")));

        let code = self.runner.run(&spec, Some(feed), sink).await?;
        if code != 0 {
            return Err(TtsError::Engine { code });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
