//! Resolution of a configured model name to a local `.onnx` path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::model::VoiceCatalog;
use crate::report::Reporter;

// ---------------------------------------------------------------------------
// ResolveError
// ---------------------------------------------------------------------------

/// Failures while fetching a voice model.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The HTTP request itself failed (connection, TLS, timeout).
    #[error("download of {url} failed: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("download of {url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Writing the downloaded file failed.
    #[error("i/o error while storing model file: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// ModelResolver
// ---------------------------------------------------------------------------

/// Turns a configured model name into a local `.onnx` path.
///
/// Resolution order:
///
/// 1. a catalog alias — the `.onnx`/`.onnx.json` pair is downloaded into the
///    models directory on first use;
/// 2. a file name that already exists under the models directory;
/// 3. a direct filesystem path.
///
/// `Ok(None)` means the name matched nothing; the caller is expected to
/// treat that as a startup precondition failure, before any document runs.
pub struct ModelResolver {
    models_dir: PathBuf,
    catalog: VoiceCatalog,
    client: reqwest::Client,
    reporter: Arc<dyn Reporter>,
}

impl ModelResolver {
    pub fn new(
        models_dir: impl Into<PathBuf>,
        catalog: VoiceCatalog,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            models_dir: models_dir.into(),
            catalog,
            client: reqwest::Client::new(),
            reporter,
        }
    }

    /// Resolve `name` to a local model path, downloading when needed.
    pub async fn resolve(&self, name: &str) -> Result<Option<PathBuf>, ResolveError> {
        if let Some(base_url) = self.catalog.base_url(name) {
            let path = self.ensure_downloaded(name, base_url).await?;
            return Ok(Some(path));
        }

        let local = self.models_dir.join(name);
        if local.exists() {
            return Ok(Some(local));
        }

        let direct = Path::new(name);
        if direct.exists() {
            return Ok(Some(direct.to_path_buf()));
        }

        let known: Vec<&str> = self.catalog.names().collect();
        self.reporter.error(
            &format!(
                "unknown voice model '{name}'; available catalog voices: {}",
                known.join(", ")
            ),
            None,
        );
        Ok(None)
    }

    /// Make sure both files of the voice pair exist locally; download any
    /// that are missing.
    async fn ensure_downloaded(&self, name: &str, base_url: &str) -> Result<PathBuf, ResolveError> {
        let onnx_path = self.models_dir.join(format!("{name}.onnx"));
        let json_path = self.models_dir.join(format!("{name}.onnx.json"));

        if onnx_path.exists() && json_path.exists() {
            return Ok(onnx_path);
        }

        self.reporter
            .log(&format!("downloading voice model '{name}'..."));
        tokio::fs::create_dir_all(&self.models_dir).await?;

        self.download(&format!("{base_url}.onnx"), &onnx_path).await?;
        self.download(&format!("{base_url}.onnx.json"), &json_path)
            .await?;

        self.reporter
            .success(&format!("voice model '{name}' downloaded"));
        Ok(onnx_path)
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<(), ResolveError> {
        self.reporter.log(&format!("fetching {url}"));

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ResolveError::Download {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status {
                url: url.to_string(),
                status,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| ResolveError::Download {
                url: url.to_string(),
                source,
            })?;
        tokio::fs::write(dest, &bytes).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
