//! The [`TtsEngine`] trait and synthesis error taxonomy.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::exec::ExecError;
use crate::report::ProgressSink;

// ---------------------------------------------------------------------------
// TtsError
// ---------------------------------------------------------------------------

/// All errors that can arise from the synthesis subsystem.
#[derive(Debug, Error)]
pub enum TtsError {
    /// The engine or concat process could not be driven at all.
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// The engine exited non-zero while synthesizing one page. Aborts the
    /// whole document — there is no per-page retry.
    #[error("synthesis failed on page {page} (exit code {code})")]
    PageSynthesis { page: usize, code: i32 },

    /// The engine reported success for a page but the output file does not
    /// exist. Propagates exactly like a non-zero exit.
    #[error("engine reported success on page {page} but wrote no output file")]
    MissingOutput { page: usize },

    /// Merging the per-page parts into one file failed.
    #[error("concatenating audio parts failed (exit code {code})")]
    Concat { code: i32 },

    /// A whole-stream engine (the fallback) exited non-zero.
    #[error("synthesis engine exited with code {code}")]
    Engine { code: i32 },

    /// Filesystem trouble in the synthesis workspace.
    #[error("i/o error in synthesis workspace: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// TtsEngine trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for document-level speech synthesis.
///
/// # Contract
///
/// - `pages` is the full, buffered page-text list in page order; blank pages
///   are the engine's to skip (they still advance progress).
/// - On success with at least one speakable page, `output` exists.
/// - On success with zero speakable pages, `output` does **not** exist and
///   no error is raised.
/// - `progress`, when supplied, receives the running page count — once per
///   page, skipped or synthesized, never exceeding `pages.len()`.
#[async_trait]
pub trait TtsEngine: Send + Sync {
    async fn generate(
        &self,
        pages: &[String],
        output: &Path,
        model: &Path,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<(), TtsError>;
}

// Compile-time assertion: Box<dyn TtsEngine> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn TtsEngine>) {}
};

// ---------------------------------------------------------------------------
// MockTts  (test-only)
// ---------------------------------------------------------------------------

/// One `generate` call seen by [`MockTts`].
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub struct MockTtsCall {
    pub pages: Vec<String>,
    pub output: std::path::PathBuf,
    pub model: std::path::PathBuf,
}

/// A test double that records calls and simulates output-file creation,
/// mirroring what a healthy engine does without spawning anything.
#[cfg(test)]
pub struct MockTts {
    create_output: bool,
    fail_code: Option<i32>,
    calls: std::sync::Mutex<Vec<MockTtsCall>>,
}

#[cfg(test)]
impl MockTts {
    /// Succeeds and writes a placeholder output file.
    pub fn succeeding() -> Self {
        Self {
            create_output: true,
            fail_code: None,
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Succeeds without writing any output — the all-pages-blank case.
    pub fn succeeding_without_output() -> Self {
        Self {
            create_output: false,
            fail_code: None,
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Always fails with [`TtsError::Engine`] and the given code.
    pub fn failing(code: i32) -> Self {
        Self {
            create_output: false,
            fail_code: Some(code),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<MockTtsCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl TtsEngine for MockTts {
    async fn generate(
        &self,
        pages: &[String],
        output: &Path,
        model: &Path,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<(), TtsError> {
        self.calls.lock().unwrap().push(MockTtsCall {
            pages: pages.to_vec(),
            output: output.to_path_buf(),
            model: model.to_path_buf(),
        });

        if let Some(code) = self.fail_code {
            return Err(TtsError::Engine { code });
        }

        if let Some(sink) = progress {
            for completed in 1..=pages.len() {
                sink.advance(completed as u64);
            }
        }

        if self.create_output {
            std::fs::write(output, b"wav content")?;
        }
        Ok(())
    }
}
