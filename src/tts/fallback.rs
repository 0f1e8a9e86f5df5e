//! Primary/fallback synthesis coordination.
//!
//! [`FallbackTts`] wraps two interchangeable engines behind the common
//! [`TtsEngine`] contract. The primary runs the whole document end-to-end;
//! if it fails for any reason, the failure is logged and the document is
//! re-synthesized once from scratch with the fallback engine — the buffered
//! page list makes the retry possible, and nothing resumes mid-document.
//! A fallback failure is surfaced as-is.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::report::{ProgressSink, Reporter};
use crate::tts::engine::{TtsEngine, TtsError};

// ---------------------------------------------------------------------------
// FallbackTts
// ---------------------------------------------------------------------------

/// Coordinator selecting between a primary and a fallback engine.
pub struct FallbackTts {
    primary: Arc<dyn TtsEngine>,
    fallback: Arc<dyn TtsEngine>,
    reporter: Arc<dyn Reporter>,
}

impl FallbackTts {
    pub fn new(
        primary: Arc<dyn TtsEngine>,
        fallback: Arc<dyn TtsEngine>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            primary,
            fallback,
            reporter,
        }
    }
}

#[async_trait]
impl TtsEngine for FallbackTts {
    async fn generate(
        &self,
        pages: &[String],
        output: &Path,
        model: &Path,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<(), TtsError> {
        match self.primary.generate(pages, output, model, progress).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.reporter.error(
                    "primary synthesis engine failed; retrying with fallback",
                    Some(&err),
                );
                self.fallback.generate(pages, output, model, progress).await
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
