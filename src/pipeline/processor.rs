//! The per-document orchestrator.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::audio::{AudioConverter, ConvertError};
use crate::config::StabilizeConfig;
use crate::pdf::{PdfError, PdfParser};
use crate::pipeline::state::DocumentState;
use crate::report::Reporter;
use crate::tts::{TtsEngine, TtsError};

// ---------------------------------------------------------------------------
// ProcessError
// ---------------------------------------------------------------------------

/// Terminal failures for a single document.
///
/// Every variant is caught at the [`Processor::process`] boundary and
/// converted into reporter output; none may reach the host.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The file never became readable within the stabilization budget.
    #[error("file not ready after {attempts} attempts: {}", .path.display())]
    FileNotReady { path: PathBuf, attempts: u32 },

    /// The PDF could not be opened or a page could not be extracted.
    #[error("extraction failed: {0}")]
    Extraction(#[from] PdfError),

    /// Speech synthesis failed (both engines, when a fallback is wired).
    #[error("synthesis failed: {0}")]
    Synthesis(#[from] TtsError),

    /// Synthesis succeeded but produced no audio — every page was blank.
    #[error("no audio was produced — every page was blank")]
    EmptyOutput,

    /// The WAV → MP3 transcode failed; the WAV is retained for diagnosis.
    #[error("transcoding failed: {0}")]
    Transcode(#[from] ConvertError),

    /// Unexpected runtime trouble (task join failure, unwritable output
    /// directory).
    #[error("internal error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// StabilizePolicy
// ---------------------------------------------------------------------------

/// Bounded retry policy for waiting on a newly arrived file.
///
/// The delay is injectable so tests can run with zero sleeps.
#[derive(Debug, Clone, Copy)]
pub struct StabilizePolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for StabilizePolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            delay: Duration::from_millis(500),
        }
    }
}

impl From<&StabilizeConfig> for StabilizePolicy {
    fn from(config: &StabilizeConfig) -> Self {
        Self {
            attempts: config.attempts,
            delay: Duration::from_millis(config.delay_ms),
        }
    }
}

// ---------------------------------------------------------------------------
// FileProcessor trait
// ---------------------------------------------------------------------------

/// The one operation exposed to the host: process a single file, reporting
/// the outcome only through the observer and the filesystem.
#[async_trait]
pub trait FileProcessor: Send + Sync {
    async fn process_file(&self, path: &Path);
}

// ---------------------------------------------------------------------------
// Processor
// ---------------------------------------------------------------------------

/// Drives one document through
/// `Stabilizing → Extracting → Synthesizing → Transcoding`.
///
/// Constructed with an **already resolved** model path — an unresolved
/// model is a startup precondition failure, not something this type can
/// represent.
pub struct Processor {
    parser: Arc<dyn PdfParser>,
    tts: Arc<dyn TtsEngine>,
    converter: Arc<dyn AudioConverter>,
    reporter: Arc<dyn Reporter>,
    output_dir: PathBuf,
    model_path: PathBuf,
    stabilize: StabilizePolicy,
}

impl Processor {
    pub fn new(
        parser: Arc<dyn PdfParser>,
        tts: Arc<dyn TtsEngine>,
        converter: Arc<dyn AudioConverter>,
        reporter: Arc<dyn Reporter>,
        output_dir: impl Into<PathBuf>,
        model_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            parser,
            tts,
            converter,
            reporter,
            output_dir: output_dir.into(),
            model_path: model_path.into(),
            stabilize: StabilizePolicy::default(),
        }
    }

    /// Override the file-readiness retry policy.
    pub fn with_stabilize(mut self, policy: StabilizePolicy) -> Self {
        self.stabilize = policy;
        self
    }

    /// Process one document and return its terminal state.
    ///
    /// Never panics or propagates an error; the reporter receives the full
    /// story.
    pub async fn process(&self, path: &Path) -> DocumentState {
        match self.run(path).await {
            Ok(mp3_path) => {
                self.reporter.success_panel(
                    "Success",
                    &format!("audio saved to {}", mp3_path.display()),
                );
                DocumentState::Done
            }
            Err(err) => {
                match &err {
                    ProcessError::FileNotReady { .. } => {
                        self.reporter
                            .log(&format!("could not access file: {}", path.display()));
                    }
                    ProcessError::EmptyOutput => {
                        self.reporter
                            .warn("no audio produced — document had no speakable text");
                    }
                    _ => self.reporter.error("error processing file", Some(&err)),
                }
                DocumentState::Failed
            }
        }
    }

    // -----------------------------------------------------------------------
    // Pipeline phases
    // -----------------------------------------------------------------------

    async fn run(&self, path: &Path) -> Result<PathBuf, ProcessError> {
        self.enter(DocumentState::Stabilizing);
        if !self.wait_for_file(path).await {
            return Err(ProcessError::FileNotReady {
                path: path.to_path_buf(),
                attempts: self.stabilize.attempts,
            });
        }

        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.reporter.header(&format!("Processing {display_name}"));

        self.enter(DocumentState::Extracting);
        let (total_pages, pages) = self.extract(path).await?;
        self.reporter.log(&format!("{total_pages} pages"));

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let wav_path = self.output_dir.join(format!("{stem}.wav"));
        let mp3_path = self.output_dir.join(format!("{stem}.mp3"));

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| {
                ProcessError::Internal(format!(
                    "cannot create output directory {}: {e}",
                    self.output_dir.display()
                ))
            })?;

        self.enter(DocumentState::Synthesizing);
        let progress = self.reporter.progress("Synthesizing", total_pages as u64);
        self.tts
            .generate(&pages, &wav_path, &self.model_path, Some(progress.as_ref()))
            .await?;

        // All pages blank: the engine wrote nothing, and that is not a
        // transcoder's problem.
        if !wav_path.exists() {
            return Err(ProcessError::EmptyOutput);
        }

        self.enter(DocumentState::Transcoding);
        self.converter.convert(&wav_path, &mp3_path).await?;

        if let Err(e) = tokio::fs::remove_file(&wav_path).await {
            self.reporter.warn(&format!(
                "could not remove intermediate {}: {e}",
                wav_path.display()
            ));
        }

        Ok(mp3_path)
    }

    /// Poll for read access with the configured bounded retry. The file may
    /// still be mid-copy into the watch folder; an open that succeeds is the
    /// readiness signal.
    async fn wait_for_file(&self, path: &Path) -> bool {
        for attempt in 1..=self.stabilize.attempts {
            if std::fs::File::open(path).is_ok() {
                return true;
            }
            if attempt < self.stabilize.attempts {
                tokio::time::sleep(self.stabilize.delay).await;
            }
        }
        false
    }

    /// Open the document and drain its lazy page iterator exactly once, on
    /// the blocking pool. The document resource is released before this
    /// returns.
    async fn extract(&self, path: &Path) -> Result<(usize, Vec<String>), ProcessError> {
        let parser = Arc::clone(&self.parser);
        let path = path.to_path_buf();

        let extracted = tokio::task::spawn_blocking(move || -> Result<(usize, Vec<String>), PdfError> {
            let parsed = parser.parse(&path)?;
            let total_pages = parsed.total_pages;
            let pages = parsed.pages.collect::<Result<Vec<String>, PdfError>>()?;
            Ok((total_pages, pages))
        })
        .await
        .map_err(|e| ProcessError::Internal(e.to_string()))?;

        Ok(extracted?)
    }

    fn enter(&self, state: DocumentState) {
        self.reporter.log(&format!("[{}]", state.label()));
    }
}

#[async_trait]
impl FileProcessor for Processor {
    async fn process_file(&self, path: &Path) {
        let _ = self.process(path).await;
    }
}

// ---------------------------------------------------------------------------
// MockFileProcessor  (test-only)
// ---------------------------------------------------------------------------

/// Records the paths handed to it; used to test the directory monitor.
#[cfg(test)]
#[derive(Default)]
pub struct MockFileProcessor {
    calls: std::sync::Mutex<Vec<PathBuf>>,
}

#[cfg(test)]
impl MockFileProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn processed(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl FileProcessor for MockFileProcessor {
    async fn process_file(&self, path: &Path) {
        self.calls.lock().unwrap().push(path.to_path_buf());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MockConverter;
    use crate::pdf::MockParser;
    use crate::report::{RecordedEvent, RecordingReporter};
    use crate::tts::MockTts;
    use tempfile::{tempdir, TempDir};

    struct Fixture {
        parser: Arc<MockParser>,
        tts: Arc<MockTts>,
        converter: Arc<MockConverter>,
        reporter: Arc<RecordingReporter>,
        processor: Processor,
        dir: TempDir,
    }

    /// No real sleeps in tests: three attempts, zero delay.
    fn fast_policy() -> StabilizePolicy {
        StabilizePolicy {
            attempts: 3,
            delay: Duration::ZERO,
        }
    }

    fn fixture(parser: MockParser, tts: MockTts, converter: MockConverter) -> Fixture {
        let dir = tempdir().expect("temp dir");
        let parser = Arc::new(parser);
        let tts = Arc::new(tts);
        let converter = Arc::new(converter);
        let reporter = Arc::new(RecordingReporter::new());

        let processor = Processor::new(
            parser.clone(),
            tts.clone(),
            converter.clone(),
            reporter.clone(),
            dir.path().join("output"),
            "dummy_model.onnx",
        )
        .with_stabilize(fast_policy());

        Fixture {
            parser,
            tts,
            converter,
            reporter,
            processor,
            dir,
        }
    }

    /// Drop a readable stand-in input file into the fixture dir.
    fn input_file(fixture: &Fixture, name: &str) -> PathBuf {
        let path = fixture.dir.path().join(name);
        std::fs::write(&path, b"dummy content").expect("write input");
        path
    }

    #[tokio::test]
    async fn happy_path_generates_audio_and_converts_to_mp3() {
        let f = fixture(
            MockParser::with_pages(&["Page 1", "Page 2"]),
            MockTts::succeeding(),
            MockConverter::succeeding(),
        );
        let pdf = input_file(&f, "test.pdf");

        let state = f.processor.process(&pdf).await;
        assert_eq!(state, DocumentState::Done);

        // synthesis got the buffered pages, the wav destination and the
        // resolved model path
        let tts_calls = f.tts.calls();
        assert_eq!(tts_calls.len(), 1);
        assert_eq!(tts_calls[0].pages, vec!["Page 1", "Page 2"]);
        assert!(tts_calls[0].output.ends_with("test.wav"));
        assert_eq!(tts_calls[0].model, PathBuf::from("dummy_model.onnx"));

        // transcode ran wav → mp3
        let convert_calls = f.converter.calls();
        assert_eq!(convert_calls.len(), 1);
        assert!(convert_calls[0].0.ends_with("test.wav"));
        assert!(convert_calls[0].1.ends_with("test.mp3"));

        // intermediate wav removed, final mp3 retained
        let out = f.dir.path().join("output");
        assert!(!out.join("test.wav").exists());
        assert!(out.join("test.mp3").exists());

        // observer saw the header, the page count, a bounded progress scope
        // and the success panel
        let events = f.reporter.events();
        assert!(events
            .iter()
            .any(|e| matches!(e, RecordedEvent::Header(t) if t.contains("test.pdf"))));
        assert!(events
            .iter()
            .any(|e| matches!(e, RecordedEvent::Log(m) if m.contains("pages"))));
        assert!(events.iter().any(|e| matches!(
            e,
            RecordedEvent::ProgressOpened { max: 2, .. }
        )));
        assert!(events
            .iter()
            .any(|e| matches!(e, RecordedEvent::SuccessPanel(_, m) if m.contains(".mp3"))));
    }

    #[tokio::test]
    async fn missing_file_fails_without_touching_the_parser() {
        let f = fixture(
            MockParser::with_pages(&["never read"]),
            MockTts::succeeding(),
            MockConverter::succeeding(),
        );
        let missing = f.dir.path().join("missing.pdf");

        let state = f.processor.process(&missing).await;

        assert_eq!(state, DocumentState::Failed);
        assert!(f.parser.calls().is_empty());
        assert!(f.reporter.events().iter().any(
            |e| matches!(e, RecordedEvent::Log(m) if m.contains("could not access file"))
        ));
        // not an error, not even a warning — just logged
        assert!(f.reporter.errors().is_empty());
    }

    #[tokio::test]
    async fn extraction_failure_is_caught_and_reported() {
        let f = fixture(
            MockParser::failing(),
            MockTts::succeeding(),
            MockConverter::succeeding(),
        );
        let pdf = input_file(&f, "broken.pdf");

        let state = f.processor.process(&pdf).await;

        assert_eq!(state, DocumentState::Failed);
        assert!(f.tts.calls().is_empty());
        assert_eq!(f.reporter.errors().len(), 1);
    }

    #[tokio::test]
    async fn all_blank_document_reports_empty_output_as_warning() {
        let f = fixture(
            MockParser::with_pages(&["", "   "]),
            MockTts::succeeding_without_output(),
            MockConverter::succeeding(),
        );
        let pdf = input_file(&f, "blank.pdf");

        let state = f.processor.process(&pdf).await;

        assert_eq!(state, DocumentState::Failed);
        // transcoding must never have been attempted
        assert!(f.converter.calls().is_empty());
        // a warning, not an error
        assert!(!f.reporter.warnings().is_empty());
        assert!(f.reporter.errors().is_empty());
    }

    #[tokio::test]
    async fn synthesis_failure_stops_before_transcoding() {
        let f = fixture(
            MockParser::with_pages(&["Page 1"]),
            MockTts::failing(2),
            MockConverter::succeeding(),
        );
        let pdf = input_file(&f, "doc.pdf");

        let state = f.processor.process(&pdf).await;

        assert_eq!(state, DocumentState::Failed);
        assert!(f.converter.calls().is_empty());
        assert!(!f.dir.path().join("output").join("doc.mp3").exists());
        assert_eq!(f.reporter.errors().len(), 1);
    }

    #[tokio::test]
    async fn transcode_failure_retains_the_wav_for_diagnosis() {
        let f = fixture(
            MockParser::with_pages(&["Page 1"]),
            MockTts::succeeding(),
            MockConverter::failing(1),
        );
        let pdf = input_file(&f, "doc.pdf");

        let state = f.processor.process(&pdf).await;

        assert_eq!(state, DocumentState::Failed);
        let out = f.dir.path().join("output");
        assert!(out.join("doc.wav").exists(), "wav must be kept");
        assert!(!out.join("doc.mp3").exists());
    }

    /// Re-processing the same input overwrites the previous MP3 without any
    /// manual cleanup.
    #[tokio::test]
    async fn reprocessing_overwrites_previous_output() {
        let f = fixture(
            MockParser::with_pages(&["Page 1"]),
            MockTts::succeeding(),
            MockConverter::succeeding(),
        );
        let pdf = input_file(&f, "doc.pdf");

        assert_eq!(f.processor.process(&pdf).await, DocumentState::Done);
        assert_eq!(f.processor.process(&pdf).await, DocumentState::Done);

        assert_eq!(f.converter.calls().len(), 2);
        assert!(f.dir.path().join("output").join("doc.mp3").exists());
    }
}
