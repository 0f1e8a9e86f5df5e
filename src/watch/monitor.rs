//! Polling directory monitor.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::pipeline::FileProcessor;
use crate::report::Reporter;

// ---------------------------------------------------------------------------
// DirectoryMonitor
// ---------------------------------------------------------------------------

/// Scans an input directory on a fixed interval and processes each `*.pdf`
/// file it has not seen before.
///
/// Files that already exist when monitoring starts are treated as seen —
/// only arrivals are processed, matching create-event semantics. Documents
/// are handled strictly one at a time; a scan found mid-processing waits
/// for the current document to finish.
pub struct DirectoryMonitor {
    input_dir: PathBuf,
    poll: Duration,
    processor: Arc<dyn FileProcessor>,
    reporter: Arc<dyn Reporter>,
}

impl DirectoryMonitor {
    pub fn new(
        input_dir: impl Into<PathBuf>,
        poll: Duration,
        processor: Arc<dyn FileProcessor>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            poll,
            processor,
            reporter,
        }
    }

    /// Run forever (or until the enclosing task is cancelled).
    ///
    /// Errors only when the input directory cannot be created up front;
    /// transient scan failures are warnings and the loop keeps going.
    pub async fn run(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.input_dir).await?;
        self.reporter.log(&format!(
            "monitoring {} for *.pdf files...",
            self.input_dir.display()
        ));

        let mut seen: HashSet<PathBuf> = match Self::scan(&self.input_dir) {
            Ok(existing) => existing.into_iter().collect(),
            Err(_) => HashSet::new(),
        };

        let mut ticker = tokio::time::interval(self.poll);
        loop {
            ticker.tick().await;

            let paths = match Self::scan(&self.input_dir) {
                Ok(paths) => paths,
                Err(e) => {
                    self.reporter
                        .warn(&format!("could not scan {}: {e}", self.input_dir.display()));
                    continue;
                }
            };

            for path in paths {
                if seen.insert(path.clone()) {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    self.reporter.log(&format!("new file detected: {name}"));
                    self.processor.process_file(&path).await;
                }
            }
        }
    }

    /// All `*.pdf` files currently in `dir`, sorted for deterministic order.
    fn scan(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
            })
            .collect();
        paths.sort();
        Ok(paths)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::MockFileProcessor;
    use crate::report::NullReporter;
    use tempfile::tempdir;

    fn monitor(
        dir: &Path,
        processor: Arc<MockFileProcessor>,
    ) -> DirectoryMonitor {
        DirectoryMonitor::new(
            dir,
            Duration::from_millis(10),
            processor,
            Arc::new(NullReporter),
        )
    }

    #[test]
    fn scan_finds_only_pdf_files_sorted() {
        let dir = tempdir().expect("temp dir");
        std::fs::write(dir.path().join("b.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("a.PDF"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("sub.pdf")).unwrap();

        let paths = DirectoryMonitor::scan(dir.path()).expect("scan");
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[tokio::test(start_paused = true)]
    async fn new_arrivals_are_processed_exactly_once() {
        let dir = tempdir().expect("temp dir");
        let processor = Arc::new(MockFileProcessor::new());

        let m = monitor(dir.path(), processor.clone());
        let input = dir.path().to_path_buf();
        let handle = tokio::spawn(async move { m.run().await });

        // let the monitor seed its seen-set on the empty directory
        tokio::time::sleep(Duration::from_millis(50)).await;

        std::fs::write(input.join("new.pdf"), b"x").unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        let processed = processor.processed();
        assert_eq!(processed.len(), 1, "got: {processed:?}");
        assert!(processed[0].ends_with("new.pdf"));

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn pre_existing_files_are_not_reprocessed() {
        let dir = tempdir().expect("temp dir");
        std::fs::write(dir.path().join("old.pdf"), b"x").unwrap();
        let processor = Arc::new(MockFileProcessor::new());

        let m = monitor(dir.path(), processor.clone());
        let handle = tokio::spawn(async move { m.run().await });

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(processor.processed().is_empty());
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn missing_input_dir_is_created_on_start() {
        let dir = tempdir().expect("temp dir");
        let input = dir.path().join("inbox");
        let processor = Arc::new(MockFileProcessor::new());

        let m = monitor(&input, processor);
        let input_clone = input.clone();
        let handle = tokio::spawn(async move { m.run().await });

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(input_clone.is_dir());
        handle.abort();
    }
}
