//! Piper-backed synthesis: one engine process per page, then a lossless
//! concat of the per-page parts.
//!
//! # Page-loop policy
//!
//! Pages are visited strictly in order. A blank page (after trimming)
//! advances progress and produces no file. A speakable page is fed to one
//! `piper` invocation writing `part_NNNN.wav`; a non-zero exit or a missing
//! output file aborts the **whole document** immediately — one bad page
//! fails the document, later pages are never attempted.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::exec::{probe, CommandRunner, CommandSpec, OutputSink, StdinFeed};
use crate::report::{ProgressSink, Reporter};
use crate::tts::engine::{TtsEngine, TtsError};
use crate::tts::parts::{PartArtifact, PartsWorkspace};

// ---------------------------------------------------------------------------
// PiperTts
// ---------------------------------------------------------------------------

/// The primary synthesis engine, driving the external `piper` executable.
pub struct PiperTts {
    piper_path: String,
    ffmpeg_path: String,
    speaker: Option<u32>,
    runner: Arc<dyn CommandRunner>,
    reporter: Arc<dyn Reporter>,
}

impl PiperTts {
    pub fn new(
        piper_path: impl Into<String>,
        ffmpeg_path: impl Into<String>,
        runner: Arc<dyn CommandRunner>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            piper_path: piper_path.into(),
            ffmpeg_path: ffmpeg_path.into(),
            speaker: None,
            runner,
            reporter,
        }
    }

    /// Select a speaker id for multi-speaker voices.
    pub fn with_speaker(mut self, speaker: Option<u32>) -> Self {
        self.speaker = speaker;
        self
    }

    /// Run one `piper` process for a single page, feeding `text` on stdin.
    ///
    /// Returns the exit code; the caller decides what non-zero means.
    async fn synthesize_page(
        &self,
        text: &str,
        model: &Path,
        destination: &Path,
    ) -> Result<i32, TtsError> {
        let mut spec = CommandSpec::new(&self.piper_path)
            .arg("--model")
            .arg(model.display().to_string());
        if let Some(speaker) = self.speaker {
            spec = spec.arg("--speaker").arg(speaker.to_string());
        }
        spec = spec
            .arg("--output_file")
            .arg(destination.display().to_string());

        let reporter = &self.reporter;
        let sink = OutputSink::new()
            .on_stdout(move |line| reporter.log(&format!("[piper] {line}")))
            .on_stderr(move |line| reporter.log(&format!("[piper] {line}")));

        // The runner appends the trailing line terminator piper needs.
        let feed = StdinFeed::new([text.to_string()]);
        let code = self.runner.run(&spec, Some(feed), sink).await?;
        Ok(code)
    }
}

#[async_trait]
impl TtsEngine for PiperTts {
    async fn generate(
        &self,
        pages: &[String],
        output: &Path,
        model: &Path,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<(), TtsError> {
        self.reporter.log(&format!(
            "synthesizing {} pages with piper ({}) into {}",
            pages.len(),
            self.piper_path,
            output.display()
        ));

        let mut workspace = PartsWorkspace::create(output)?;

        for (index, text) in pages.iter().enumerate() {
            let page = index + 1;
            let trimmed = text.trim();

            if trimmed.is_empty() {
                self.reporter.log(&format!("page {page}: blank, skipped"));
                if let Some(sink) = progress {
                    sink.advance(page as u64);
                }
                continue;
            }

            let destination = workspace.part_path(page);
            let code = self.synthesize_page(trimmed, model, &destination).await?;
            if code != 0 {
                return Err(TtsError::PageSynthesis { page, code });
            }
            if !destination.exists() {
                return Err(TtsError::MissingOutput { page });
            }

            workspace.push(PartArtifact {
                page,
                path: destination,
            });
            if let Some(sink) = progress {
                sink.advance(page as u64);
            }
        }

        if workspace.is_empty() {
            self.reporter
                .log("no parts produced (every page was blank); skipping concatenation");
            workspace.remove(self.reporter.as_ref()).await;
            return Ok(());
        }

        self.reporter.log(&format!(
            "concatenating {} parts into {}",
            workspace.parts().len(),
            output.display()
        ));
        workspace
            .concatenate(
                self.runner.as_ref(),
                &self.ffmpeg_path,
                output,
                self.reporter.as_ref(),
            )
            .await
    }
}

// ---------------------------------------------------------------------------
// locate_piper
// ---------------------------------------------------------------------------

/// Pick the piper executable to use: a working `<workdir>/piper/piper`
/// takes precedence over the configured path. Either candidate is probed
/// with `--help` under a 2-second timeout; a dead configured path is only
/// warned about — the fallback engine can still carry the document.
pub async fn locate_piper(
    runner: &dyn CommandRunner,
    workdir: &Path,
    configured: &str,
    reporter: &dyn Reporter,
) -> String {
    let timeout = Duration::from_secs(2);

    let local = workdir.join("piper").join("piper");
    if local.is_file() {
        let spec = CommandSpec::new(local.display().to_string()).arg("--help");
        if probe(runner, &spec, timeout).await {
            reporter.log(&format!("using local piper at {}", local.display()));
            return local.display().to_string();
        }
    }

    let spec = CommandSpec::new(configured).arg("--help");
    if probe(runner, &spec, timeout).await {
        reporter.log(&format!("using system piper: {configured}"));
    } else {
        reporter.warn("piper executable not found or not working; expect fallback synthesis");
    }
    configured.to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::MockRunner;
    use crate::report::{NullReporter, RecordingReporter};
    use tempfile::tempdir;

    fn pages(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    /// A runner faking both piper (creates `--output_file`) and ffmpeg
    /// (creates its last argument).
    fn healthy_runner() -> MockRunner {
        MockRunner::new(|spec, _| {
            if spec.program.contains("ffmpeg") {
                std::fs::write(spec.args.last().unwrap(), b"merged").unwrap();
            } else if let Some(pos) = spec.args.iter().position(|a| a == "--output_file") {
                std::fs::write(&spec.args[pos + 1], b"RIFF").unwrap();
            }
            0
        })
    }

    fn engine(runner: Arc<dyn CommandRunner>, reporter: Arc<dyn Reporter>) -> PiperTts {
        PiperTts::new("piper", "ffmpeg", runner, reporter)
    }

    #[tokio::test]
    async fn two_pages_yield_two_parts_and_one_concat() {
        let dir = tempdir().expect("temp dir");
        let output = dir.path().join("doc.wav");
        let runner = Arc::new(healthy_runner());
        let reporter = Arc::new(RecordingReporter::new());

        let tts = engine(runner.clone(), reporter.clone());
        let sink = reporter.progress("Synthesizing", 2);
        tts.generate(
            &pages(&["Page 1", "Page 2"]),
            &output,
            Path::new("voice.onnx"),
            Some(sink.as_ref()),
        )
        .await
        .expect("generate");

        assert!(output.exists());
        assert_eq!(reporter.advances(), vec![1, 2]);

        let calls = runner.calls();
        assert_eq!(calls.len(), 3, "two piper calls plus one ffmpeg call");
        assert!(calls[0].spec.args.iter().any(|a| a.ends_with("part_0001.wav")));
        assert_eq!(calls[0].stdin, vec!["Page 1"]);
        assert!(calls[1].spec.args.iter().any(|a| a.ends_with("part_0002.wav")));
        assert_eq!(calls[1].stdin, vec!["Page 2"]);
        assert_eq!(calls[2].spec.program, "ffmpeg");

        // workspace cleaned up after a successful concat
        assert!(!dir.path().join("doc_parts").exists());
    }

    #[tokio::test]
    async fn blank_page_is_skipped_but_still_advances_progress() {
        let dir = tempdir().expect("temp dir");
        let output = dir.path().join("doc.wav");
        let runner = Arc::new(healthy_runner());
        let reporter = Arc::new(RecordingReporter::new());

        let tts = engine(runner.clone(), reporter.clone());
        let sink = reporter.progress("Synthesizing", 2);
        tts.generate(
            &pages(&["   ", "Hello"]),
            &output,
            Path::new("voice.onnx"),
            Some(sink.as_ref()),
        )
        .await
        .expect("generate");

        assert_eq!(reporter.advances(), vec![1, 2]);

        let calls = runner.calls();
        // one piper call (page 2) + one ffmpeg call
        assert_eq!(calls.len(), 2);
        assert!(calls[0].spec.args.iter().any(|a| a.ends_with("part_0002.wav")));
        assert_eq!(calls[0].stdin, vec!["Hello"]);
    }

    #[tokio::test]
    async fn all_blank_pages_produce_no_output_and_no_error() {
        let dir = tempdir().expect("temp dir");
        let output = dir.path().join("doc.wav");
        let runner = Arc::new(MockRunner::always(0));

        let tts = engine(runner.clone(), Arc::new(NullReporter));
        tts.generate(
            &pages(&["", "   ", "\n\t"]),
            &output,
            Path::new("voice.onnx"),
            None,
        )
        .await
        .expect("generate");

        assert!(!output.exists());
        assert!(runner.calls().is_empty(), "no process may be spawned");
        assert!(!dir.path().join("doc_parts").exists());
    }

    #[tokio::test]
    async fn first_page_failure_aborts_the_document() {
        let dir = tempdir().expect("temp dir");
        let output = dir.path().join("doc.wav");
        let runner = Arc::new(MockRunner::always(2));

        let tts = engine(runner.clone(), Arc::new(NullReporter));
        let err = tts
            .generate(
                &pages(&["one", "two", "three"]),
                &output,
                Path::new("voice.onnx"),
                None,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TtsError::PageSynthesis { page: 1, code: 2 }));
        // later pages were never attempted, no concat happened
        assert_eq!(runner.calls().len(), 1);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn zero_exit_without_part_file_is_missing_output() {
        let dir = tempdir().expect("temp dir");
        let output = dir.path().join("doc.wav");
        // exits 0 but never writes the part file
        let runner = Arc::new(MockRunner::always(0));

        let tts = engine(runner, Arc::new(NullReporter));
        let err = tts
            .generate(&pages(&["one"]), &output, Path::new("voice.onnx"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, TtsError::MissingOutput { page: 1 }));
    }

    #[tokio::test]
    async fn speaker_id_is_passed_through() {
        let dir = tempdir().expect("temp dir");
        let output = dir.path().join("doc.wav");
        let runner = Arc::new(healthy_runner());

        let tts = engine(runner.clone(), Arc::new(NullReporter)).with_speaker(Some(3));
        tts.generate(&pages(&["text"]), &output, Path::new("voice.onnx"), None)
            .await
            .expect("generate");

        let spec = &runner.calls()[0].spec;
        let pos = spec
            .args
            .iter()
            .position(|a| a == "--speaker")
            .expect("--speaker present");
        assert_eq!(spec.args[pos + 1], "3");
    }

    #[tokio::test]
    async fn page_text_is_trimmed_before_feeding() {
        let dir = tempdir().expect("temp dir");
        let output = dir.path().join("doc.wav");
        let runner = Arc::new(healthy_runner());

        let tts = engine(runner.clone(), Arc::new(NullReporter));
        tts.generate(
            &pages(&["  padded text \n"]),
            &output,
            Path::new("voice.onnx"),
            None,
        )
        .await
        .expect("generate");

        assert_eq!(runner.calls()[0].stdin, vec!["padded text"]);
    }

    // ---- locate_piper ---

    #[tokio::test]
    async fn locate_prefers_working_local_piper() {
        let dir = tempdir().expect("temp dir");
        std::fs::create_dir_all(dir.path().join("piper")).unwrap();
        let local = dir.path().join("piper").join("piper");
        std::fs::write(&local, b"#!/bin/sh\n").unwrap();

        let runner = MockRunner::always(0);
        let chosen = locate_piper(&runner, dir.path(), "piper", &NullReporter).await;
        assert_eq!(chosen, local.display().to_string());
    }

    #[tokio::test]
    async fn locate_falls_back_to_configured_path() {
        let dir = tempdir().expect("temp dir");

        let runner = MockRunner::always(0);
        let chosen = locate_piper(&runner, dir.path(), "/opt/piper/piper", &NullReporter).await;
        assert_eq!(chosen, "/opt/piper/piper");
    }

    #[tokio::test]
    async fn locate_warns_when_nothing_probes_ok() {
        let dir = tempdir().expect("temp dir");
        let reporter = RecordingReporter::new();

        let runner = MockRunner::always(1);
        let chosen = locate_piper(&runner, dir.path(), "piper", &reporter).await;

        assert_eq!(chosen, "piper");
        assert_eq!(reporter.warnings().len(), 1);
    }
}
