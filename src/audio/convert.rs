//! [`AudioConverter`] trait and the ffmpeg-backed implementation.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::exec::{CommandRunner, CommandSpec, ExecError, OutputSink};
use crate::report::Reporter;

// ---------------------------------------------------------------------------
// ConvertError
// ---------------------------------------------------------------------------

/// Errors from the transcoding step.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The transcoder process could not be driven at all.
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// The transcoder exited non-zero.
    #[error("transcoding failed (exit code {code})")]
    Transcode { code: i32 },
}

// ---------------------------------------------------------------------------
// AudioConverter trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for audio format conversion.
#[async_trait]
pub trait AudioConverter: Send + Sync {
    /// Convert `input` into `output`, overwriting any previous `output`.
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;
}

// Compile-time assertion: Box<dyn AudioConverter> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn AudioConverter>) {}
};

// ---------------------------------------------------------------------------
// FfmpegConverter
// ---------------------------------------------------------------------------

/// Production converter: `ffmpeg -i <input> -y <output>`.
pub struct FfmpegConverter {
    ffmpeg_path: String,
    runner: Arc<dyn CommandRunner>,
    reporter: Arc<dyn Reporter>,
}

impl FfmpegConverter {
    pub fn new(
        ffmpeg_path: impl Into<String>,
        runner: Arc<dyn CommandRunner>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            runner,
            reporter,
        }
    }
}

#[async_trait]
impl AudioConverter for FfmpegConverter {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        self.reporter.log(&format!(
            "converting {} to {}...",
            input.display(),
            output.display()
        ));

        let spec = CommandSpec::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(input.display().to_string())
            .arg("-y")
            .arg(output.display().to_string());

        let reporter = &self.reporter;
        let sink =
            OutputSink::new().on_stderr(move |line| reporter.log(&format!("[ffmpeg] {line}")));

        let code = self.runner.run(&spec, None, sink).await?;
        if code != 0 {
            return Err(ConvertError::Transcode { code });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockConverter  (test-only)
// ---------------------------------------------------------------------------

/// A test double that records conversions and writes a placeholder output
/// on success.
#[cfg(test)]
pub struct MockConverter {
    fail_code: Option<i32>,
    calls: std::sync::Mutex<Vec<(std::path::PathBuf, std::path::PathBuf)>>,
}

#[cfg(test)]
impl MockConverter {
    pub fn succeeding() -> Self {
        Self {
            fail_code: None,
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn failing(code: i32) -> Self {
        Self {
            fail_code: Some(code),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(std::path::PathBuf, std::path::PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl AudioConverter for MockConverter {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        self.calls
            .lock()
            .unwrap()
            .push((input.to_path_buf(), output.to_path_buf()));
        match self.fail_code {
            Some(code) => Err(ConvertError::Transcode { code }),
            None => {
                std::fs::write(output, b"mp3 content")
                    .map_err(|e| ConvertError::Exec(ExecError::Io(e)))?;
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
