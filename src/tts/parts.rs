//! Per-page audio artifacts and their lossless concatenation.
//!
//! A [`PartsWorkspace`] is a scratch directory (`<basename>_parts`, sibling
//! of the final output) holding one `part_NNNN.wav` per speakable page plus
//! the concat manifest `list.txt`. Concatenation uses ffmpeg's concat
//! demuxer with stream copy, so parts of any count and length merge without
//! re-encoding.
//!
//! Ownership of the parts transfers into [`PartsWorkspace::concatenate`],
//! which deletes the manifest and the whole workspace (best effort) once
//! the merged file exists.

use std::path::{Path, PathBuf};

use crate::exec::{CommandRunner, CommandSpec, OutputSink};
use crate::report::Reporter;
use crate::tts::engine::TtsError;

// ---------------------------------------------------------------------------
// PartArtifact
// ---------------------------------------------------------------------------

/// One synthesized audio file for a single page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartArtifact {
    /// 1-based page index the part was synthesized from.
    pub page: usize,
    /// Location of the part file inside the workspace.
    pub path: PathBuf,
}

// ---------------------------------------------------------------------------
// PartsWorkspace
// ---------------------------------------------------------------------------

/// Scratch directory for one synthesis run.
///
/// Parts are appended in page order and never reordered; the manifest is
/// written in exactly that order.
#[derive(Debug)]
pub struct PartsWorkspace {
    dir: PathBuf,
    parts: Vec<PartArtifact>,
}

impl PartsWorkspace {
    /// Create (or reuse) the `<basename>_parts` directory next to `output`.
    pub fn create(output: &Path) -> std::io::Result<Self> {
        let stem = output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let dir = output.with_file_name(format!("{stem}_parts"));
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            parts: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Destination path for the given 1-based page index.
    pub fn part_path(&self, page: usize) -> PathBuf {
        self.dir.join(format!("part_{page:04}.wav"))
    }

    pub fn push(&mut self, part: PartArtifact) {
        self.parts.push(part);
    }

    pub fn parts(&self) -> &[PartArtifact] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The concat-demuxer manifest: one `file '<path>'` line per part, in
    /// part order. Single quotes in paths are escaped as `'\''`.
    fn manifest(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            let quoted = part.path.display().to_string().replace('\'', "'\\''");
            out.push_str("file '");
            out.push_str(&quoted);
            out.push_str("'\n");
        }
        out
    }

    /// Merge all parts into `output` (stream copy, no re-encode), then clean
    /// the workspace up.
    ///
    /// Must not be called with zero parts — the caller short-circuits that
    /// case. Cleanup failures are reported as warnings and never fail the
    /// merge.
    pub async fn concatenate(
        self,
        runner: &dyn CommandRunner,
        ffmpeg: &str,
        output: &Path,
        reporter: &dyn Reporter,
    ) -> Result<(), TtsError> {
        debug_assert!(!self.parts.is_empty());

        let manifest_path = self.dir.join("list.txt");
        tokio::fs::write(&manifest_path, self.manifest()).await?;

        let spec = CommandSpec::new(ffmpeg)
            .args(["-f", "concat", "-safe", "0", "-i"])
            .arg(manifest_path.display().to_string())
            .args(["-c", "copy", "-y"])
            .arg(output.display().to_string());

        let sink =
            OutputSink::new().on_stderr(|line| reporter.log(&format!("[ffmpeg] {line}")));
        let code = runner.run(&spec, None, sink).await?;

        if code != 0 || !output.exists() {
            return Err(TtsError::Concat { code });
        }

        if let Err(e) = tokio::fs::remove_file(&manifest_path).await {
            reporter.warn(&format!(
                "could not remove manifest {}: {e}",
                manifest_path.display()
            ));
        }
        self.remove(reporter).await;
        Ok(())
    }

    /// Recursively delete the workspace, best effort.
    pub async fn remove(self, reporter: &dyn Reporter) {
        if let Err(e) = tokio::fs::remove_dir_all(&self.dir).await {
            reporter.warn(&format!(
                "could not remove parts workspace {}: {e}",
                self.dir.display()
            ));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
